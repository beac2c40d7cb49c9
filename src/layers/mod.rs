pub mod icon;
pub mod marker;
pub mod registry;
