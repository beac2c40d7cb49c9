//! Marker icon factory
//!
//! Maps a marker kind, its type-specific metadata and the highlight flag to an
//! icon description. The palette is fixed; highlighting produces a brightened copy
//! and never alters it. Unknown kinds get the neutral fallback.

use crate::core::config::MarkerStyleConfig;
use crate::data::entity::{EntityDetails, MarkerEntity, MarkerKind, WorkerKind};
use crate::ui::style::{palette, HexColor};
use once_cell::sync::OnceCell;

/// Symbol drawn inside a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    User,
    LogIn,
    Play,
    Square,
    Coffee,
    Timer,
    ClipboardCheck,
    Book,
    Star,
    Building,
    Target,
    FileText,
    Dot,
}

impl Glyph {
    /// Short id used by surfaces that look glyphs up by name
    pub fn id(&self) -> &'static str {
        match self {
            Glyph::User => "user",
            Glyph::LogIn => "log-in",
            Glyph::Play => "play",
            Glyph::Square => "square",
            Glyph::Coffee => "coffee",
            Glyph::Timer => "timer",
            Glyph::ClipboardCheck => "clipboard-check",
            Glyph::Book => "book",
            Glyph::Star => "star",
            Glyph::Building => "building",
            Glyph::Target => "target",
            Glyph::FileText => "file-text",
            Glyph::Dot => "dot",
        }
    }

    /// Single character fallback for text-only surfaces
    pub fn symbol(&self) -> char {
        match self {
            Glyph::User => 'W',
            Glyph::LogIn => 'I',
            Glyph::Play => '▶',
            Glyph::Square => '■',
            Glyph::Coffee => 'B',
            Glyph::Timer => 'b',
            Glyph::ClipboardCheck => 'T',
            Glyph::Book => 'J',
            Glyph::Star => '★',
            Glyph::Building => 'C',
            Glyph::Target => '!',
            Glyph::FileText => 'Q',
            Glyph::Dot => '•',
        }
    }
}

/// Resolved look of one marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconSpec {
    pub color: HexColor,
    pub border_color: HexColor,
    pub glyph: Glyph,
    pub size_px: u32,
    pub border_width_px: u32,
}

/// Type-specific fields that influence the icon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IconMeta<'a> {
    pub status: Option<&'a str>,
    pub price_tier: Option<&'a str>,
}

impl<'a> IconMeta<'a> {
    pub fn from_entity(entity: &'a MarkerEntity) -> Self {
        match &entity.details {
            EntityDetails::Client(client) => Self {
                status: client.status.as_deref(),
                price_tier: client.price_tier.as_deref(),
            },
            _ => Self::default(),
        }
    }
}

/// Sizing rules plus the fallback used for unknown kinds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconTheme {
    pub style: MarkerStyleConfig,
    pub fallback_color: HexColor,
    pub fallback_glyph: Glyph,
}

impl Default for IconTheme {
    fn default() -> Self {
        Self {
            style: MarkerStyleConfig::default(),
            fallback_color: palette::NEUTRAL,
            fallback_glyph: Glyph::Dot,
        }
    }
}

static ICON_THEME: OnceCell<IconTheme> = OnceCell::new();

/// One-time icon setup done by the hosting application.
///
/// Returns `false` when a theme was already installed; the first one stays.
pub fn init_default_icons(theme: IconTheme) -> bool {
    let installed = ICON_THEME.set(theme).is_ok();
    if !installed {
        #[cfg(feature = "debug")]
        log::warn!("icon theme already initialised, ignoring second init");
    }
    installed
}

/// The installed theme, or the built-in default when none was installed
pub fn icon_theme() -> IconTheme {
    ICON_THEME.get().copied().unwrap_or_default()
}

/// Base color and glyph for a kind, before highlighting
pub fn base_style(kind: &MarkerKind, meta: &IconMeta<'_>, theme: &IconTheme) -> (HexColor, Glyph) {
    match kind {
        MarkerKind::Worker(worker) => match worker {
            WorkerKind::Worker => (palette::WORKER, Glyph::User),
            WorkerKind::CheckIn => (palette::CHECK_IN, Glyph::LogIn),
            WorkerKind::ShiftStart => (palette::SHIFT_START, Glyph::Play),
            WorkerKind::ShiftEnd => (palette::SHIFT_END, Glyph::Square),
            WorkerKind::BreakStart => (palette::BREAK_START, Glyph::Coffee),
            WorkerKind::BreakEnd => (palette::BREAK_END, Glyph::Timer),
            WorkerKind::Task => (palette::TASK, Glyph::ClipboardCheck),
            WorkerKind::Journal => (palette::JOURNAL, Glyph::Book),
            WorkerKind::Lead => (palette::LEAD, Glyph::Star),
        },
        MarkerKind::Client => (client_color(meta), Glyph::Building),
        MarkerKind::Competitor => (palette::COMPETITOR, Glyph::Target),
        MarkerKind::Quotation => (palette::QUOTATION, Glyph::FileText),
        MarkerKind::Other(_) => (theme.fallback_color, theme.fallback_glyph),
    }
}

/// Client color: status first, then price tier, then default cyan
pub fn client_color(meta: &IconMeta<'_>) -> HexColor {
    let status = meta.status.map(|s| s.trim().to_ascii_lowercase());
    match status.as_deref() {
        Some("active") => return palette::CLIENT_ACTIVE,
        Some("inactive") => return palette::CLIENT_INACTIVE,
        Some("potential") => return palette::CLIENT_POTENTIAL,
        _ => {}
    }

    let tier = meta.price_tier.map(|t| t.trim().to_ascii_lowercase());
    match tier.as_deref() {
        Some("premium") => palette::CLIENT_PREMIUM,
        Some("standard") => palette::CLIENT_STANDARD,
        Some("basic") => palette::CLIENT_BASIC,
        _ => palette::CLIENT_DEFAULT,
    }
}

/// Builds the icon for a kind using an explicit theme
pub fn marker_icon_with(
    theme: &IconTheme,
    kind: &MarkerKind,
    highlighted: bool,
    meta: &IconMeta<'_>,
) -> IconSpec {
    let (color, glyph) = base_style(kind, meta, theme);
    let style = &theme.style;

    if highlighted {
        IconSpec {
            color: color.brighten(style.brighten_delta),
            border_color: palette::BORDER,
            glyph,
            size_px: style.highlighted_size_px,
            border_width_px: style.highlighted_border_px,
        }
    } else {
        IconSpec {
            color,
            border_color: palette::BORDER,
            glyph,
            size_px: style.size_px,
            border_width_px: style.border_px,
        }
    }
}

/// Builds the icon for a kind using the installed theme
pub fn marker_icon(kind: &MarkerKind, highlighted: bool, meta: &IconMeta<'_>) -> IconSpec {
    marker_icon_with(&icon_theme(), kind, highlighted, meta)
}

/// Convenience wrapper reading kind and metadata from an entity
pub fn icon_for(entity: &MarkerEntity, highlighted: bool) -> IconSpec {
    marker_icon(&entity.kind(), highlighted, &IconMeta::from_entity(entity))
}

/// One legend row per documented kind
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub kind: MarkerKind,
    pub label: &'static str,
    pub color: HexColor,
    pub glyph: Glyph,
}

pub fn legend() -> Vec<LegendEntry> {
    let theme = icon_theme();
    MarkerKind::documented()
        .into_iter()
        .map(|kind| {
            let (color, glyph) = base_style(&kind, &IconMeta::default(), &theme);
            let label = match &kind {
                MarkerKind::Worker(worker) => worker.label(),
                MarkerKind::Client => "Client",
                MarkerKind::Competitor => "Competitor",
                MarkerKind::Quotation => "Quotation",
                MarkerKind::Other(_) => "Other",
            };
            LegendEntry {
                kind,
                label,
                color,
                glyph,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::entity::MarkerEntity;
    use serde_json::json;

    fn all_kinds() -> Vec<MarkerKind> {
        let mut kinds = MarkerKind::documented();
        kinds.push(MarkerKind::Other("warehouse".to_string()));
        kinds
    }

    #[test]
    fn test_highlight_grows_every_kind() {
        let theme = IconTheme::default();
        for kind in all_kinds() {
            let meta = IconMeta::default();
            let normal = marker_icon_with(&theme, &kind, false, &meta);
            let highlighted = marker_icon_with(&theme, &kind, true, &meta);

            assert!(highlighted.size_px > normal.size_px, "{kind}");
            assert!(highlighted.border_width_px > normal.border_width_px, "{kind}");
            assert_eq!(normal.size_px, 34);
            assert_eq!(highlighted.size_px, 42);
            assert_eq!(normal.border_width_px, 2);
            assert_eq!(highlighted.border_width_px, 3);

            let (base, bright) = (normal.color, highlighted.color);
            assert!(bright.r >= base.r && bright.g >= base.g && bright.b >= base.b);
            assert_eq!(highlighted.glyph, normal.glyph);
        }
    }

    #[test]
    fn test_competitor_highlight_scenario() {
        let entity = MarkerEntity::from_value(
            &json!({"id": 7, "markerType": "competitor", "position": [-25.0, 27.0]}),
            None,
        )
        .unwrap();
        let icon = marker_icon_with(
            &IconTheme::default(),
            &entity.kind(),
            true,
            &IconMeta::from_entity(&entity),
        );

        assert_eq!(icon.color, HexColor::from_rgb(0xff, 0x62, 0x62));
        assert_eq!(icon.size_px, 42);
        assert_eq!(icon.border_width_px, 3);
        // palette untouched
        assert_eq!(palette::COMPETITOR.to_hex(), "#ef4444");
    }

    #[test]
    fn test_client_color_rules() {
        let meta = |status, price_tier| IconMeta { status, price_tier };

        assert_eq!(client_color(&meta(Some("active"), None)).to_hex(), "#06b6d4");
        assert_eq!(
            client_color(&meta(Some("inactive"), Some("premium"))),
            palette::CLIENT_INACTIVE
        );
        assert_eq!(client_color(&meta(Some("potential"), None)), palette::CLIENT_POTENTIAL);
        assert_eq!(client_color(&meta(None, Some("premium"))).to_hex(), "#3b82f6");
        assert_eq!(client_color(&meta(None, Some("basic"))), palette::CLIENT_BASIC);
        assert_eq!(
            client_color(&meta(Some("archived"), Some("standard"))),
            palette::CLIENT_STANDARD
        );
        assert_eq!(client_color(&meta(None, None)).to_hex(), "#06b6d4");
    }

    #[test]
    fn test_unknown_kind_uses_fallback() {
        let theme = IconTheme::default();
        let icon = marker_icon_with(
            &theme,
            &MarkerKind::Other("depot".to_string()),
            false,
            &IconMeta::default(),
        );
        assert_eq!(icon.color, palette::NEUTRAL);
        assert_eq!(icon.glyph, Glyph::Dot);
    }

    #[test]
    fn test_legend_covers_documented_kinds() {
        let legend = legend();
        assert_eq!(legend.len(), MarkerKind::documented().len());
        assert!(legend
            .iter()
            .all(|entry| !matches!(entry.kind, MarkerKind::Other(_))));
        assert!(legend.iter().all(|entry| entry.glyph != Glyph::Dot));
    }
}
