use crate::projection::MapView;

pub const SIGHTINGS_URL: &str = "https://acartia.io/api/v1/sightings/current";
pub const TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "\u{00A9} OpenStreetMap contributors";

/// Mount element attributes that may override the compiled-in URLs.
pub const SIGHTINGS_URL_ATTR: &str = "data-sightings-url";
pub const TILE_URL_ATTR: &str = "data-tile-url";

pub const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 19.0;

/// World view shown while sightings are loading.
pub const INITIAL_VIEW: MapView = MapView {
    center_lon: 0.0,
    center_lat: 0.0,
    zoom: 2.0,
};

/// Salish Sea view applied once sightings have loaded.
pub const REGIONAL_VIEW: MapView = MapView {
    center_lon: -122.26878,
    center_lat: 47.9948,
    zoom: 7.0,
};

pub const TILE_CONCURRENCY: usize = 6;
pub const MAX_CACHED_TILES: usize = 384;

/// Pick an override value when it is present and non-blank.
pub fn resolve_url(override_value: Option<String>, default: &str) -> String {
    override_value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}
