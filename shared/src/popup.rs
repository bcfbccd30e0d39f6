use crate::marker::Marker;

/// Attributes shown for the clicked marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub species: String,
    pub comments: String,
    pub date: String,
    pub count: Option<u32>,
    pub source: String,
    pub lon: f64,
    pub lat: f64,
}

impl PopupContent {
    pub fn from_marker(marker: &Marker) -> Self {
        Self {
            species: marker.species.clone(),
            comments: marker.comments.clone(),
            date: marker.date.to_string(),
            count: marker.count,
            source: marker.source.clone(),
            lon: marker.lon,
            lat: marker.lat,
        }
    }

    pub fn count_label(&self) -> String {
        self.count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn lines(&self) -> [String; 5] {
        [
            format!("Type: {}", self.species),
            format!("Comments: {}", self.comments),
            format!("Date: {}", self.date),
            format!("No. Sighted: {}", self.count_label()),
            format!("Source: {}", self.source),
        ]
    }
}

/// Popup visibility. Once shown it stays shown; each hit replaces the content.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PopupState {
    #[default]
    Hidden,
    Shown {
        marker: usize,
        content: PopupContent,
    },
}

impl PopupState {
    /// Apply a map click. A miss leaves the popup as it was.
    pub fn on_click(&mut self, hit: Option<(usize, &Marker)>) {
        let Some((index, marker)) = hit else {
            return;
        };
        *self = PopupState::Shown {
            marker: index,
            content: PopupContent::from_marker(marker),
        };
    }

    pub fn content(&self) -> Option<&PopupContent> {
        match self {
            PopupState::Hidden => None,
            PopupState::Shown { content, .. } => Some(content),
        }
    }

    pub fn is_shown(&self) -> bool {
        matches!(self, PopupState::Shown { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REGIONAL_VIEW;
    use crate::marker::{MarkerIndex, build_markers};
    use crate::projection::Viewport;
    use crate::sighting::parse_sightings;

    const PAYLOAD: &str = r#"[
        {"type":"Orca","longitude":-122.3,"latitude":47.6,"data_source_name":"WhaleWatch",
         "no_sighted":3,"data_source_comments":"pod of three","ssemmi_date_added":"2023-05-01"},
        {"type":"Humpback","longitude":-123.4,"latitude":48.5,"data_source_name":"Ferry",
         "no_sighted":null,"data_source_comments":"breaching","ssemmi_date_added":"not a date"}
    ]"#;

    fn click(
        state: &mut PopupState,
        markers: &[Marker],
        index: &MarkerIndex,
        vp: &Viewport,
        x: f64,
        y: f64,
    ) {
        let hit = index.find_at(vp, x, y).map(|i| (i, &markers[i]));
        state.on_click(hit);
    }

    #[test]
    fn clicking_reference_marker_fills_popup() {
        let markers = build_markers(&parse_sightings(PAYLOAD).expect("payload"));
        let index = MarkerIndex::build(&markers);
        let vp = Viewport::new(REGIONAL_VIEW, 500.0, 500.0);
        let (ax, ay) = vp.lonlat_to_screen(-122.3, 47.6);

        let mut state = PopupState::default();
        click(&mut state, &markers, &index, &vp, ax + 8.0, ay + 8.0);

        let content = state.content().expect("popup shown");
        let lines = content.lines();
        assert_eq!(lines[0], "Type: Orca");
        assert_eq!(lines[1], "Comments: pod of three");
        assert_eq!(lines[2], "Date: Mon May 01 2023 00:00:00 UTC");
        assert_eq!(lines[3], "No. Sighted: 3");
        assert_eq!(lines[4], "Source: WhaleWatch");
        assert_eq!((content.lon, content.lat), (-122.3, 47.6));
        assert!(matches!(state, PopupState::Shown { marker: 0, .. }));
    }

    #[test]
    fn miss_before_any_hit_keeps_popup_hidden() {
        let markers = build_markers(&parse_sightings(PAYLOAD).expect("payload"));
        let index = MarkerIndex::build(&markers);
        let vp = Viewport::new(REGIONAL_VIEW, 500.0, 500.0);

        let mut state = PopupState::default();
        click(&mut state, &markers, &index, &vp, 1.0, 1.0);
        assert_eq!(state, PopupState::Hidden);
    }

    #[test]
    fn later_hit_overwrites_and_miss_is_noop() {
        let markers = build_markers(&parse_sightings(PAYLOAD).expect("payload"));
        let index = MarkerIndex::build(&markers);
        let vp = Viewport::new(REGIONAL_VIEW, 500.0, 500.0);
        let (ox, oy) = vp.lonlat_to_screen(-122.3, 47.6);
        let (hx, hy) = vp.lonlat_to_screen(-123.4, 48.5);

        let mut state = PopupState::default();
        click(&mut state, &markers, &index, &vp, ox + 5.0, oy + 5.0);
        click(&mut state, &markers, &index, &vp, hx + 5.0, hy + 5.0);
        let shown = state.clone();
        let content = shown.content().expect("popup shown");
        assert_eq!(content.species, "Humpback");
        assert_eq!(content.lines()[2], "Date: not a date");
        assert_eq!(content.lines()[3], "No. Sighted: Unknown");

        click(&mut state, &markers, &index, &vp, 1.0, 1.0);
        assert_eq!(state, shown);
    }
}
