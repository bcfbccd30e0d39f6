/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

pub const MAP_BACKGROUND: &str = "#aad3df";
pub const MARKER_OUTLINE: &str = "rgba(255,255,255,0.9)";
pub const STATUS_ERROR: &str = "#b3261e";
pub const STATUS_INFO: &str = "#1f2937";
