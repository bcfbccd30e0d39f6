use crate::catalog::{ICON_STYLE, IconKey, IconStyle, resolve_icon};
use crate::projection::{Viewport, lonlat_to_world};
use crate::sighting::{Sighting, SightingDate};

const GRID_COLS: usize = 64;
const GRID_ROWS: usize = 64;

/// Map point for one sighting, carrying its display attributes and icon.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub lon: f64,
    pub lat: f64,
    pub world_x: f64,
    pub world_y: f64,
    pub species: String,
    pub source: String,
    pub comments: String,
    pub count: Option<u32>,
    pub date: SightingDate,
    pub icon: IconKey,
}

impl Marker {
    pub fn from_sighting(sighting: &Sighting) -> Self {
        let (world_x, world_y) = lonlat_to_world(sighting.longitude, sighting.latitude);
        Self {
            lon: sighting.longitude,
            lat: sighting.latitude,
            world_x,
            world_y,
            species: sighting.species.clone(),
            source: sighting.data_source_name.clone(),
            comments: sighting.data_source_comments.clone(),
            count: sighting.no_sighted,
            date: sighting.date_added(),
            icon: resolve_icon(&sighting.species),
        }
    }
}

/// One marker per sighting, in fetch order (which is also draw order).
pub fn build_markers(sightings: &[Sighting]) -> Vec<Marker> {
    sightings.iter().map(Marker::from_sighting).collect()
}

/// Uniform grid over the markers' world bounds for click hit-testing.
/// Built once per marker set; queries account for the icon footprint at the current zoom.
pub struct MarkerIndex {
    cells: Vec<Vec<usize>>,
    xs: Vec<f64>,
    ys: Vec<f64>,
    min_x: f64,
    min_y: f64,
    cell_w: f64,
    cell_h: f64,
    style: IconStyle,
}

impl MarkerIndex {
    pub fn build(markers: &[Marker]) -> Self {
        Self::build_with_style(markers, ICON_STYLE)
    }

    pub fn build_with_style(markers: &[Marker], style: IconStyle) -> Self {
        if markers.is_empty() {
            return Self {
                cells: Vec::new(),
                xs: Vec::new(),
                ys: Vec::new(),
                min_x: 0.0,
                min_y: 0.0,
                cell_w: 1.0,
                cell_h: 1.0,
                style,
            };
        }

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for m in markers {
            min_x = min_x.min(m.world_x);
            min_y = min_y.min(m.world_y);
            max_x = max_x.max(m.world_x);
            max_y = max_y.max(m.world_y);
        }

        // Pad so a single marker (or a line of them) still spans a non-zero area
        let pad = 1e-6;
        min_x -= pad;
        min_y -= pad;
        max_x += pad;
        max_y += pad;

        let cell_w = (max_x - min_x) / GRID_COLS as f64;
        let cell_h = (max_y - min_y) / GRID_ROWS as f64;

        let mut cells = vec![Vec::new(); GRID_COLS * GRID_ROWS];
        let mut xs = Vec::with_capacity(markers.len());
        let mut ys = Vec::with_capacity(markers.len());
        for (idx, m) in markers.iter().enumerate() {
            xs.push(m.world_x);
            ys.push(m.world_y);
            let col = (((m.world_x - min_x) / cell_w) as usize).min(GRID_COLS - 1);
            let row = (((m.world_y - min_y) / cell_h) as usize).min(GRID_ROWS - 1);
            cells[row * GRID_COLS + col].push(idx);
        }

        Self {
            cells,
            xs,
            ys,
            min_x,
            min_y,
            cell_w,
            cell_h,
            style,
        }
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Topmost marker whose icon covers the screen point, or `None` for empty map.
    /// Every world copy on screen is searched, so wrapped copies hit too.
    pub fn find_at(&self, vp: &Viewport, screen_x: f64, screen_y: f64) -> Option<usize> {
        if self.cells.is_empty() {
            return None;
        }
        let mut best: Option<usize> = None;
        for copy in vp.world_copies() {
            self.search_copy(vp, copy as f64, screen_x, screen_y, &mut best);
        }
        best
    }

    fn search_copy(
        &self,
        vp: &Viewport,
        shift: f64,
        screen_x: f64,
        screen_y: f64,
        best: &mut Option<usize>,
    ) {
        // A marker at p is hit when the click lies in p + icon rect, so
        // candidates lie in click - icon rect.
        let (l, t, r, b) = self.style.screen_rect();
        let (qx0, qy0) = vp.screen_to_world(screen_x - r, screen_y - b);
        let (qx1, qy1) = vp.screen_to_world(screen_x - l, screen_y - t);
        let (qx0, qx1) = (qx0 - shift, qx1 - shift);

        let col_start = ((qx0 - self.min_x) / self.cell_w).floor().max(0.0);
        let col_end = ((qx1 - self.min_x) / self.cell_w).floor().min(GRID_COLS as f64 - 1.0);
        let row_start = ((qy0 - self.min_y) / self.cell_h).floor().max(0.0);
        let row_end = ((qy1 - self.min_y) / self.cell_h).floor().min(GRID_ROWS as f64 - 1.0);
        if col_start > col_end || row_start > row_end {
            return;
        }

        for row in row_start as usize..=row_end as usize {
            for col in col_start as usize..=col_end as usize {
                for &idx in &self.cells[row * GRID_COLS + col] {
                    if best.is_some_and(|b| b >= idx) {
                        continue;
                    }
                    let (ax, ay) = vp.world_to_screen(self.xs[idx] + shift, self.ys[idx]);
                    if self.style.contains(ax, ay, screen_x, screen_y) {
                        *best = Some(idx);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REGIONAL_VIEW;

    fn sighting(species: &str, lon: f64, lat: f64) -> Sighting {
        Sighting {
            species: species.to_string(),
            longitude: lon,
            latitude: lat,
            data_source_name: "WhaleWatch".into(),
            data_source_comments: "pod of three".into(),
            no_sighted: Some(3),
            ssemmi_date_added: "2023-05-01".into(),
        }
    }

    fn regional() -> Viewport {
        Viewport::new(REGIONAL_VIEW, 500.0, 500.0)
    }

    #[test]
    fn one_marker_per_sighting_in_order() {
        let sightings = vec![
            sighting("Orca", -122.3, 47.6),
            sighting("Humpback", -123.0, 48.2),
            sighting("Minke", -122.9, 48.0),
            sighting("Orca", -122.3, 47.6),
        ];
        let markers = build_markers(&sightings);
        assert_eq!(markers.len(), sightings.len());
        assert_eq!(markers[0].icon, IconKey::Orca);
        assert_eq!(markers[1].icon, IconKey::Humpback);
        assert_eq!(markers[2].icon, IconKey::Blue);
        assert_eq!(markers[2].species, "Minke");
        assert_eq!(MarkerIndex::build(&markers).len(), 4);
    }

    #[test]
    fn marker_copies_display_attributes() {
        let m = Marker::from_sighting(&sighting("Orca", -122.3, 47.6));
        assert_eq!(m.species, "Orca");
        assert_eq!(m.source, "WhaleWatch");
        assert_eq!(m.comments, "pod of three");
        assert_eq!(m.count, Some(3));
        assert!(matches!(m.date, SightingDate::Parsed(_)));
        assert_eq!((m.lon, m.lat), (-122.3, 47.6));
    }

    #[test]
    fn click_on_icon_hits_marker() {
        let markers = build_markers(&[
            sighting("Orca", -122.3, 47.6),
            sighting("Humpback", -124.0, 49.0),
        ]);
        let index = MarkerIndex::build(&markers);
        let vp = regional();
        let (ax, ay) = vp.lonlat_to_screen(-122.3, 47.6);
        // Icon hangs below-right of its anchor
        assert_eq!(index.find_at(&vp, ax + 10.0, ay + 10.0), Some(0));
        assert_eq!(index.find_at(&vp, ax + 1.0, ay), Some(0));
    }

    #[test]
    fn click_on_empty_map_misses() {
        let markers = build_markers(&[sighting("Orca", -122.3, 47.6)]);
        let index = MarkerIndex::build(&markers);
        let vp = regional();
        let (ax, ay) = vp.lonlat_to_screen(-122.3, 47.6);
        assert_eq!(index.find_at(&vp, ax - 15.0, ay + 10.0), None);
        assert_eq!(index.find_at(&vp, ax + 10.0, ay + 40.0), None);
        assert_eq!(index.find_at(&vp, 5.0, 5.0), None);
    }

    #[test]
    fn empty_index_never_hits() {
        let index = MarkerIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.find_at(&regional(), 250.0, 250.0), None);
    }

    #[test]
    fn overlapping_markers_resolve_to_topmost() {
        let markers = build_markers(&[
            sighting("Humpback", -122.3, 47.6),
            sighting("Orca", -122.3, 47.6),
            sighting("Grey", -122.31, 47.6),
        ]);
        let index = MarkerIndex::build(&markers);
        let vp = regional();
        let (ax, ay) = vp.lonlat_to_screen(-122.3, 47.6);
        assert_eq!(index.find_at(&vp, ax + 12.0, ay + 12.0), Some(2));
        assert_eq!(index.find_at(&vp, ax + 25.0, ay + 12.0), Some(1));
    }

    #[test]
    fn hit_testing_follows_zoom_and_pan() {
        let markers = build_markers(&[
            sighting("Orca", -122.3, 47.6),
            sighting("Orca", -123.5, 48.9),
            sighting("Orca", -121.0, 46.0),
        ]);
        let index = MarkerIndex::build(&markers);
        let mut vp = regional();
        vp.zoom_at(-400.0, 100.0, 100.0);
        vp.pan(-37.0, 12.0);
        for (idx, m) in markers.iter().enumerate() {
            let (ax, ay) = vp.world_to_screen(m.world_x, m.world_y);
            assert_eq!(index.find_at(&vp, ax + 5.0, ay + 5.0), Some(idx));
        }
    }

    #[test]
    fn marker_still_hits_after_panning_a_world_width() {
        let markers = build_markers(&[sighting("Orca", -122.3, 47.6)]);
        let index = MarkerIndex::build(&markers);
        let mut vp = regional();
        let (ax, ay) = vp.lonlat_to_screen(-122.3, 47.6);
        vp.pan(vp.world_size_px(), 0.0);
        assert_eq!(index.find_at(&vp, ax + 10.0, ay + 10.0), Some(0));
    }

    #[test]
    fn every_world_copy_is_clickable_at_low_zoom() {
        let markers = build_markers(&[sighting("Orca", -122.3, 47.6)]);
        let index = MarkerIndex::build(&markers);
        let mut vp = Viewport::new(crate::config::INITIAL_VIEW, 500.0, 500.0);
        vp.zoom = 0.0;
        // A 256 px world repeats across the 500 px canvas
        let (ax, ay) = vp.world_to_screen(markers[0].world_x, markers[0].world_y);
        let step = vp.world_size_px();
        assert!(ax + step < 500.0);
        assert_eq!(index.find_at(&vp, ax + 10.0, ay + 10.0), Some(0));
        assert_eq!(index.find_at(&vp, ax + step + 10.0, ay + 10.0), Some(0));
        assert_eq!(index.find_at(&vp, ax + step / 2.0, ay + 10.0), None);
    }
}
