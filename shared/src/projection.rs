//! Web Mercator projection and the pan/zoom viewport.
//!
//! World coordinates are normalised to `[0, 1]` on both axes: x grows east from
//! the antimeridian, y grows south from the top of the Mercator square.

use std::f64::consts::PI;
use std::ops::RangeInclusive;

use crate::config::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE};

pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

const ZOOM_SENSITIVITY: f64 = 0.002;

/// Project longitude/latitude (degrees) to world coordinates.
pub fn lonlat_to_world(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = (lon + 180.0) / 360.0;
    let sin = (lat * PI / 180.0).sin();
    let y = 0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI);
    (x, y)
}

/// Inverse of [`lonlat_to_world`].
#[cfg(test)]
pub fn world_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = x * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y;
    let lat = (0.5 * (n.exp() - (-n).exp())).atan() * 180.0 / PI;
    (lon, lat)
}

/// A center/zoom pair, in geographic terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: f64,
}

/// Transformation between world coordinates and canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(crate::config::INITIAL_VIEW, 500.0, 500.0)
    }
}

impl Viewport {
    pub fn new(view: MapView, width: f64, height: f64) -> Self {
        let mut vp = Self {
            center_x: 0.5,
            center_y: 0.5,
            zoom: MIN_ZOOM,
            width,
            height,
        };
        vp.set_view(view);
        vp
    }

    pub fn set_view(&mut self, view: MapView) {
        let (x, y) = lonlat_to_world(view.center_lon, view.center_lat);
        self.center_x = x;
        self.center_y = y;
        self.zoom = view.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    #[cfg(test)]
    pub fn view(&self) -> MapView {
        let (center_lon, center_lat) = world_to_lonlat(self.center_x, self.center_y);
        MapView {
            center_lon,
            center_lat,
            zoom: self.zoom,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Pixels spanned by the whole world at the current zoom.
    pub fn world_size_px(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        let size = self.world_size_px();
        (
            (wx - self.center_x) * size + self.width / 2.0,
            (wy - self.center_y) * size + self.height / 2.0,
        )
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        let size = self.world_size_px();
        (
            (sx - self.width / 2.0) / size + self.center_x,
            (sy - self.height / 2.0) / size + self.center_y,
        )
    }

    /// Screen position of the world copy of `(lon, lat)` nearest the canvas center.
    pub fn lonlat_to_screen(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (wx, wy) = lonlat_to_world(lon, lat);
        let shift = (self.center_x - wx).round();
        self.world_to_screen(wx + shift, wy)
    }

    /// Whole-world x offsets whose copies overlap the canvas, padded by one copy
    /// on each side so icons hanging over an edge are included.
    pub fn world_copies(&self) -> RangeInclusive<i64> {
        let (left, _) = self.screen_to_world(0.0, 0.0);
        let (right, _) = self.screen_to_world(self.width, 0.0);
        (left.floor() as i64 - 1)..=(right.floor() as i64 + 1)
    }

    /// Pan by a screen-space delta (content follows the pointer).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let size = self.world_size_px();
        self.center_x = (self.center_x - dx / size).rem_euclid(1.0);
        self.center_y = (self.center_y - dy / size).clamp(0.0, 1.0);
    }

    /// Zoom toward a focus point (screen coordinates). Positive delta zooms out,
    /// matching `WheelEvent::delta_y`.
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let new_zoom = (self.zoom - delta * ZOOM_SENSITIVITY).clamp(MIN_ZOOM, MAX_ZOOM);
        if new_zoom == self.zoom {
            return;
        }
        let (fx, fy) = self.screen_to_world(screen_x, screen_y);
        self.zoom = new_zoom;
        // Keep the world point under the cursor fixed
        let (sx, sy) = self.world_to_screen(fx, fy);
        let size = self.world_size_px();
        self.center_x = (self.center_x + (sx - screen_x) / size).rem_euclid(1.0);
        self.center_y = (self.center_y + (sy - screen_y) / size).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{INITIAL_VIEW, REGIONAL_VIEW};

    fn assert_close(actual: f64, expected: f64, eps: f64) {
        assert!(
            (actual - expected).abs() < eps,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn origin_projects_to_world_center() {
        let (x, y) = lonlat_to_world(0.0, 0.0);
        assert_close(x, 0.5, 1e-12);
        assert_close(y, 0.5, 1e-12);
    }

    #[test]
    fn projection_round_trips() {
        for &(lon, lat) in &[(-122.3, 47.6), (151.2, -33.9), (0.0, 80.0)] {
            let (x, y) = lonlat_to_world(lon, lat);
            let (lon2, lat2) = world_to_lonlat(x, y);
            assert_close(lon2, lon, 1e-9);
            assert_close(lat2, lat, 1e-9);
        }
    }

    #[test]
    fn latitude_is_clamped_to_mercator_square() {
        let (_, top) = lonlat_to_world(0.0, 90.0);
        let (_, bottom) = lonlat_to_world(0.0, -90.0);
        assert_close(top, 0.0, 1e-9);
        assert_close(bottom, 1.0, 1e-9);
    }

    #[test]
    fn view_center_is_canvas_center() {
        let vp = Viewport::new(REGIONAL_VIEW, 500.0, 400.0);
        let (sx, sy) = vp.lonlat_to_screen(REGIONAL_VIEW.center_lon, REGIONAL_VIEW.center_lat);
        assert_close(sx, 250.0, 1e-6);
        assert_close(sy, 200.0, 1e-6);
        let view = vp.view();
        assert_close(view.center_lon, REGIONAL_VIEW.center_lon, 1e-9);
        assert_close(view.center_lat, REGIONAL_VIEW.center_lat, 1e-9);
    }

    #[test]
    fn initial_view_shows_whole_world_width() {
        let vp = Viewport::new(INITIAL_VIEW, 500.0, 500.0);
        assert_close(vp.world_size_px(), 1024.0, 1e-9);
    }

    #[test]
    fn pan_moves_content_with_pointer() {
        let mut vp = Viewport::new(REGIONAL_VIEW, 500.0, 500.0);
        let before = vp.lonlat_to_screen(-122.3, 47.6);
        vp.pan(30.0, -20.0);
        let after = vp.lonlat_to_screen(-122.3, 47.6);
        assert_close(after.0 - before.0, 30.0, 1e-6);
        assert_close(after.1 - before.1, -20.0, 1e-6);
    }

    #[test]
    fn zoom_keeps_focus_point_fixed() {
        let mut vp = Viewport::new(REGIONAL_VIEW, 500.0, 500.0);
        let focus = (120.0, 340.0);
        let world_before = vp.screen_to_world(focus.0, focus.1);
        vp.zoom_at(-250.0, focus.0, focus.1);
        assert!(vp.zoom > REGIONAL_VIEW.zoom);
        let (sx, sy) = vp.world_to_screen(world_before.0, world_before.1);
        assert_close(sx, focus.0, 1e-6);
        assert_close(sy, focus.1, 1e-6);
    }

    #[test]
    fn pan_by_a_world_width_returns_to_same_center() {
        let mut vp = Viewport::new(REGIONAL_VIEW, 500.0, 500.0);
        let before = vp.lonlat_to_screen(-122.3, 47.6);
        vp.pan(vp.world_size_px(), 0.0);
        assert!((0.0..1.0).contains(&vp.center_x));
        let after = vp.lonlat_to_screen(-122.3, 47.6);
        assert_close(after.0, before.0, 1e-6);
        assert_close(after.1, before.1, 1e-6);
    }

    #[test]
    fn pan_across_antimeridian_wraps_center() {
        let mut vp = Viewport::new(INITIAL_VIEW, 500.0, 500.0);
        vp.set_view(MapView {
            center_lon: 179.0,
            center_lat: 0.0,
            zoom: 4.0,
        });
        // Points just east of the antimeridian sit right of center, not a world away
        let (before, _) = vp.lonlat_to_screen(-179.0, 0.0);
        assert!(before > 250.0 && before < 500.0, "got {before}");
        vp.pan(-200.0, 0.0);
        assert!(vp.center_x < 0.1);
        let (after, _) = vp.lonlat_to_screen(-179.0, 0.0);
        assert_close(after, before - 200.0, 1e-6);
    }

    #[test]
    fn zoom_out_near_pole_stays_in_mercator_square() {
        let mut vp = Viewport::new(INITIAL_VIEW, 500.0, 500.0);
        vp.set_view(MapView {
            center_lon: 0.0,
            center_lat: 84.0,
            zoom: 6.0,
        });
        vp.zoom_at(2000.0, 250.0, 500.0);
        assert!((0.0..=1.0).contains(&vp.center_y), "got {}", vp.center_y);
    }

    #[test]
    fn world_copies_cover_repeated_world_at_low_zoom() {
        let vp = Viewport::new(
            MapView {
                center_lon: 0.0,
                center_lat: 0.0,
                zoom: 0.0,
            },
            500.0,
            500.0,
        );
        // 256 px world on a 500 px canvas shows parts of three copies
        let copies = vp.world_copies();
        assert!(copies.contains(&-1) && copies.contains(&0) && copies.contains(&1));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = Viewport::new(INITIAL_VIEW, 500.0, 500.0);
        vp.zoom_at(1e6, 10.0, 10.0);
        assert_eq!(vp.zoom, MIN_ZOOM);
        vp.zoom_at(-1e6, 10.0, 10.0);
        assert_eq!(vp.zoom, MAX_ZOOM);
    }
}
