pub mod catalog;
pub mod config;
pub mod error;
pub mod load;
pub mod marker;
pub mod popup;
pub mod projection;
pub mod sighting;
pub mod tiles;

pub use catalog::{ICON_STYLE, IconKey, IconStyle, lookup_icon, resolve_icon};
pub use error::LoadError;
pub use load::{LoadState, apply_load};
pub use marker::{Marker, MarkerIndex, build_markers};
pub use popup::{PopupContent, PopupState};
pub use projection::{MapView, Viewport};
pub use sighting::{Sighting, SightingDate, parse_sightings};
pub use tiles::{TileCoord, TilePlacement, tile_url, visible_tiles};
