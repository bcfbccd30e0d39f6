use crate::config::{MAX_ZOOM, TILE_SIZE};
use crate::projection::Viewport;

/// XYZ slippy-map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// A tile to draw, with its screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub coord: TileCoord,
    pub screen_x: f64,
    pub screen_y: f64,
    pub size: f64,
}

pub fn tile_url(template: &str, coord: TileCoord) -> String {
    template
        .replace("{z}", &coord.z.to_string())
        .replace("{x}", &coord.x.to_string())
        .replace("{y}", &coord.y.to_string())
}

/// Tiles covering the viewport at `floor(zoom)`, nearest to the centre first.
///
/// Columns wrap around the antimeridian; rows outside the Mercator square are skipped.
pub fn visible_tiles(vp: &Viewport) -> Vec<TilePlacement> {
    if vp.width <= 0.0 || vp.height <= 0.0 {
        return Vec::new();
    }
    let z = vp.zoom.floor().clamp(0.0, MAX_ZOOM) as u8;
    let tiles_per_axis = 1i64 << z;
    // Tiles at level z are stretched by the fractional part of the zoom
    let size = TILE_SIZE * 2f64.powf(vp.zoom - z as f64);

    let (wx0, wy0) = vp.screen_to_world(0.0, 0.0);
    let (wx1, wy1) = vp.screen_to_world(vp.width, vp.height);
    let n = tiles_per_axis as f64;
    let min_col = (wx0 * n).floor() as i64;
    let max_col = (wx1 * n).ceil() as i64 - 1;
    let min_row = ((wy0 * n).floor() as i64).max(0);
    let max_row = ((wy1 * n).ceil() as i64 - 1).min(tiles_per_axis - 1);

    let mut out = Vec::new();
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            let (sx, sy) = vp.world_to_screen(col as f64 / n, row as f64 / n);
            out.push(TilePlacement {
                coord: TileCoord {
                    z,
                    x: col.rem_euclid(tiles_per_axis) as u32,
                    y: row as u32,
                },
                screen_x: sx,
                screen_y: sy,
                size,
            });
        }
    }

    let (cx, cy) = (vp.width / 2.0, vp.height / 2.0);
    out.sort_by(|a, b| {
        distance_sq(a, cx, cy)
            .total_cmp(&distance_sq(b, cx, cy))
            .then_with(|| a.coord.cmp(&b.coord))
    });
    out
}

fn distance_sq(tile: &TilePlacement, cx: f64, cy: f64) -> f64 {
    let dx = tile.screen_x + tile.size / 2.0 - cx;
    let dy = tile.screen_y + tile.size / 2.0 - cy;
    dx * dx + dy * dy
}
