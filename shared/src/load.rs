use crate::config::REGIONAL_VIEW;
use crate::error::LoadError;
use crate::marker::{Marker, build_markers};
use crate::projection::Viewport;
use crate::sighting::Sighting;

/// Outcome of the one-shot sightings fetch, as shown to the user.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded {
        count: usize,
    },
    Failed(LoadError),
}

impl LoadState {
    pub fn from_result<T>(result: &Result<Vec<T>, LoadError>) -> Self {
        match result {
            Ok(items) => LoadState::Loaded { count: items.len() },
            Err(err) => LoadState::Failed(err.clone()),
        }
    }

    /// Status line for the overlay; `None` once there is something on the map.
    pub fn status_text(&self) -> Option<String> {
        match self {
            LoadState::Loading => Some("Loading sightings\u{2026}".to_string()),
            LoadState::Loaded { count: 0 } => Some("No current sightings".to_string()),
            LoadState::Loaded { .. } => None,
            LoadState::Failed(err) => Some(format!("Sightings unavailable ({err})")),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }
}

/// Fold a finished fetch into the map. Success replaces the markers and moves
/// to the regional view; failure leaves both untouched.
pub fn apply_load(
    result: &Result<Vec<Sighting>, LoadError>,
    markers: &mut Vec<Marker>,
    viewport: &mut Viewport,
) -> LoadState {
    if let Ok(sightings) = result {
        *markers = build_markers(sightings);
        viewport.set_view(REGIONAL_VIEW);
    }
    LoadState::from_result(result)
}
