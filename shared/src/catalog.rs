use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Catalog entries. Each maps to one compiled-in SVG icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IconKey {
    Blue,
    Dolphin,
    Fin,
    Gray,
    Humpback,
    Orca,
    Sperm,
    Resident,
}

impl IconKey {
    pub const ALL: [IconKey; 8] = [
        IconKey::Blue,
        IconKey::Dolphin,
        IconKey::Fin,
        IconKey::Gray,
        IconKey::Humpback,
        IconKey::Orca,
        IconKey::Sperm,
        IconKey::Resident,
    ];

    /// Fallback for species labels outside the alias table.
    pub const DEFAULT: IconKey = IconKey::Blue;

    pub fn name(self) -> &'static str {
        match self {
            IconKey::Blue => "blue",
            IconKey::Dolphin => "dolphin",
            IconKey::Fin => "fin",
            IconKey::Gray => "gray",
            IconKey::Humpback => "humpback",
            IconKey::Orca => "orca",
            IconKey::Sperm => "sperm",
            IconKey::Resident => "resident",
        }
    }

    pub fn svg(self) -> &'static str {
        match self {
            IconKey::Blue => include_str!("../icons/blue.svg"),
            IconKey::Dolphin => include_str!("../icons/dolphin.svg"),
            IconKey::Fin => include_str!("../icons/fin.svg"),
            IconKey::Gray => include_str!("../icons/gray.svg"),
            IconKey::Humpback => include_str!("../icons/humpback.svg"),
            IconKey::Orca => include_str!("../icons/orca.svg"),
            IconKey::Sperm => include_str!("../icons/sperm.svg"),
            IconKey::Resident => include_str!("../icons/resident.svg"),
        }
    }

    /// Self-contained image source, so the widget needs no asset server.
    pub fn data_url(self) -> String {
        format!("data:image/svg+xml;base64,{}", STANDARD.encode(self.svg()))
    }

    /// Fill used when the icon image is not decoded yet.
    pub fn fallback_rgb(self) -> (u8, u8, u8) {
        match self {
            IconKey::Blue => (52, 112, 200),
            IconKey::Dolphin => (96, 160, 190),
            IconKey::Fin => (70, 90, 130),
            IconKey::Gray => (128, 128, 136),
            IconKey::Humpback => (40, 60, 90),
            IconKey::Orca => (20, 20, 24),
            IconKey::Sperm => (90, 80, 100),
            IconKey::Resident => (180, 40, 60),
        }
    }
}

/// Species label (exact, case-sensitive) to catalog entry.
pub const SPECIES_ALIASES: &[(&str, IconKey)] = &[
    ("Southern Resident Killer Whale", IconKey::Resident),
    ("Killer Whale (Orca)", IconKey::Orca),
    ("Orca", IconKey::Orca),
    ("Grey", IconKey::Gray),
    ("Gray Whale", IconKey::Gray),
    ("Humpback", IconKey::Humpback),
];

/// Catalog entry for a label listed in [`SPECIES_ALIASES`].
pub fn lookup_icon(label: &str) -> Option<IconKey> {
    SPECIES_ALIASES
        .iter()
        .find(|(alias, _)| *alias == label)
        .map(|&(_, key)| key)
}

pub fn resolve_icon(label: &str) -> IconKey {
    lookup_icon(label).unwrap_or(IconKey::DEFAULT)
}

/// Screen geometry of a marker icon relative to the sighting's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconStyle {
    /// Horizontal anchor as a fraction of the icon width.
    pub anchor_x_fraction: f64,
    /// Vertical anchor in source-image pixels from the top.
    pub anchor_y_px: f64,
    pub scale: f64,
    pub source_size_px: f64,
}

pub const ICON_STYLE: IconStyle = IconStyle {
    anchor_x_fraction: 0.01,
    anchor_y_px: 2.0,
    scale: 0.4,
    source_size_px: 64.0,
};

impl IconStyle {
    pub fn drawn_size(&self) -> f64 {
        self.source_size_px * self.scale
    }

    /// Icon rectangle `(left, top, right, bottom)` in screen pixels, relative to the anchor point.
    pub fn screen_rect(&self) -> (f64, f64, f64, f64) {
        let size = self.drawn_size();
        let left = -self.anchor_x_fraction * size;
        let top = -self.anchor_y_px * self.scale;
        (left, top, left + size, top + size)
    }

    pub fn contains(&self, anchor_x: f64, anchor_y: f64, x: f64, y: f64) -> bool {
        let (l, t, r, b) = self.screen_rect();
        x >= anchor_x + l && x <= anchor_x + r && y >= anchor_y + t && y <= anchor_y + b
    }
}
