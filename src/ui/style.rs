//! Colors and the fixed marker palette

use crate::{MapError, Result};
use std::fmt;

/// An opaque 24-bit color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (the leading `#` is optional)
    pub fn parse(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(MapError::Style(format!("invalid hex color '{}'", hex)));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| MapError::Style(format!("invalid hex color '{}'", hex)))
        };
        Ok(Self::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Adds `delta` to every channel, saturating at 255
    pub fn brighten(self, delta: u8) -> Self {
        Self::from_rgb(
            self.r.saturating_add(delta),
            self.g.saturating_add(delta),
            self.b.saturating_add(delta),
        )
    }

    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(feature = "egui")]
impl From<HexColor> for egui::Color32 {
    fn from(color: HexColor) -> Self {
        egui::Color32::from_rgb(color.r, color.g, color.b)
    }
}

/// Fixed marker palette
pub mod palette {
    use super::HexColor;

    pub const WORKER: HexColor = HexColor::from_rgb(0x10, 0xb9, 0x81);
    pub const CHECK_IN: HexColor = HexColor::from_rgb(0x22, 0xc5, 0x5e);
    pub const SHIFT_START: HexColor = HexColor::from_rgb(0x84, 0xcc, 0x16);
    pub const SHIFT_END: HexColor = HexColor::from_rgb(0xf9, 0x73, 0x16);
    pub const BREAK_START: HexColor = HexColor::from_rgb(0xf5, 0x9e, 0x0b);
    pub const BREAK_END: HexColor = HexColor::from_rgb(0xea, 0xb3, 0x08);
    pub const TASK: HexColor = HexColor::from_rgb(0x8b, 0x5c, 0xf6);
    pub const JOURNAL: HexColor = HexColor::from_rgb(0x63, 0x66, 0xf1);
    pub const LEAD: HexColor = HexColor::from_rgb(0xec, 0x48, 0x99);

    pub const CLIENT_ACTIVE: HexColor = HexColor::from_rgb(0x06, 0xb6, 0xd4);
    pub const CLIENT_INACTIVE: HexColor = HexColor::from_rgb(0x64, 0x74, 0x8b);
    pub const CLIENT_POTENTIAL: HexColor = HexColor::from_rgb(0x67, 0xe8, 0xf9);
    pub const CLIENT_PREMIUM: HexColor = HexColor::from_rgb(0x3b, 0x82, 0xf6);
    pub const CLIENT_STANDARD: HexColor = HexColor::from_rgb(0x06, 0xb6, 0xd4);
    pub const CLIENT_BASIC: HexColor = HexColor::from_rgb(0x08, 0x91, 0xb2);
    pub const CLIENT_DEFAULT: HexColor = CLIENT_ACTIVE;

    pub const COMPETITOR: HexColor = HexColor::from_rgb(0xef, 0x44, 0x44);
    pub const QUOTATION: HexColor = HexColor::from_rgb(0xa8, 0x55, 0xf7);
    pub const NEUTRAL: HexColor = HexColor::from_rgb(0x6b, 0x72, 0x80);

    pub const BORDER: HexColor = HexColor::from_rgb(0xff, 0xff, 0xff);
}

/// Badge colors used by popup status chips
pub fn status_color(status: &str) -> HexColor {
    match status.trim().to_ascii_lowercase().as_str() {
        "active" | "approved" | "accepted" | "completed" | "on duty" | "working" => {
            HexColor::from_rgb(0x16, 0xa3, 0x4a)
        }
        "pending" | "draft" | "sent" | "on break" | "in progress" | "potential" => {
            HexColor::from_rgb(0xd9, 0x77, 0x06)
        }
        "inactive" | "rejected" | "expired" | "cancelled" | "off duty" | "high" => {
            HexColor::from_rgb(0xdc, 0x26, 0x26)
        }
        _ => palette::NEUTRAL,
    }
}
