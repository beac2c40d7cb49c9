pub mod analytics;
pub mod entity;
pub mod normalize;
pub mod position;
