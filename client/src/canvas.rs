use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, PointerEvent, WheelEvent};

use orcamap_shared::{
    ICON_STYLE, Marker, MarkerIndex, PopupState, TilePlacement, Viewport, visible_tiles,
};

use crate::app::MapConfig;
use crate::colors::{MAP_BACKGROUND, MARKER_OUTLINE, rgba_css};
use crate::icons::IconImages;
use crate::render_loop::RenderScheduler;
use crate::tiles::{SharedTileCache, TileCache, request_tiles};

/// Pointer travel (CSS px) below which a press/release counts as a click, not a drag.
const CLICK_SLOP_PX: f64 = 5.0;

pub(crate) fn is_click(dx: f64, dy: f64) -> bool {
    dx.abs() < CLICK_SLOP_PX && dy.abs() < CLICK_SLOP_PX
}

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .max(1.0)
}

/// Pointer position relative to the canvas' top-left corner.
fn local_point(canvas: Option<HtmlCanvasElement>, client_x: f64, client_y: f64) -> (f64, f64) {
    match canvas {
        Some(el) => {
            let rect = el.get_bounding_client_rect();
            (client_x - rect.left(), client_y - rect.top())
        }
        None => (client_x, client_y),
    }
}

/// Map surface: raster tiles plus one icon per sighting, with pan/zoom and click-to-popup.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let markers: RwSignal<Vec<Marker>> = expect_context();
    let popup: RwSignal<PopupState> = expect_context();
    let icons: RwSignal<IconImages> = expect_context();
    let config: MapConfig = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let is_dragging = Rc::new(Cell::new(false));
    let drag_start = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let last_pos = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let over_marker = Rc::new(Cell::new(false));

    // Hit-test index, rebuilt when the marker set changes
    let index: Rc<RefCell<MarkerIndex>> = Rc::new(RefCell::new(MarkerIndex::build(&[])));
    Effect::new({
        let index = index.clone();
        move || {
            markers.with(|m| {
                *index.borrow_mut() = MarkerIndex::build(m);
            });
        }
    });

    // Bumped whenever a tile finishes decoding
    let tile_generation: RwSignal<u64> = RwSignal::new(0);
    let tile_cache: SharedTileCache = TileCache::new(
        config.tile_url_template.clone(),
        Rc::new(move || tile_generation.update(|g| *g = g.wrapping_add(1))),
    );

    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let scheduler = Rc::new(RenderScheduler::new({
        let tile_cache = tile_cache.clone();
        let cached_ctx = cached_ctx.clone();
        move || {
            let Some(canvas) = canvas_ref.get_untracked() else {
                return false;
            };
            let canvas: &HtmlCanvasElement = &canvas;
            let Some(parent) = canvas.parent_element() else {
                return false;
            };
            let w = parent.client_width() as f64;
            let h = parent.client_height() as f64;
            if w <= 0.0 || h <= 0.0 {
                // Not laid out yet; try again next frame
                return true;
            }

            let dpr = device_pixel_ratio();
            let pw = (w * dpr).round().max(1.0) as u32;
            let ph = (h * dpr).round().max(1.0) as u32;
            if canvas.width() != pw || canvas.height() != ph {
                canvas.set_width(pw);
                canvas.set_height(ph);
                // Resizing resets the 2D context state
                *cached_ctx.borrow_mut() = None;
            }
            if viewport.with_untracked(|vp| vp.width != w || vp.height != h) {
                viewport.update(|vp| vp.resize(w, h));
            }

            let ctx = {
                let mut slot = cached_ctx.borrow_mut();
                if slot.is_none() {
                    let Some(ctx) = canvas
                        .get_context("2d")
                        .ok()
                        .flatten()
                        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
                    else {
                        return false;
                    };
                    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
                    *slot = Some(ctx);
                }
                let Some(ctx) = slot.clone() else {
                    return false;
                };
                ctx
            };

            let vp = viewport.get_untracked();
            let placements = visible_tiles(&vp);
            request_tiles(&tile_cache, &placements);

            markers.with_untracked(|markers| {
                icons.with_untracked(|icons| {
                    draw_map(DrawInput {
                        ctx: &ctx,
                        vp: &vp,
                        tiles: &tile_cache,
                        placements: &placements,
                        markers,
                        icons,
                    });
                });
            });
            false
        }
    }));

    // Repaint on anything that changes what is drawn
    let sched = scheduler.clone();
    Effect::new(move || {
        viewport.track();
        markers.track();
        icons.track();
        tile_generation.track();
        sched.mark_dirty();
    });

    // --- Input handlers ---

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let (x, y) = local_point(
            canvas_ref.get_untracked(),
            e.client_x() as f64,
            e.client_y() as f64,
        );
        let delta = e.delta_y();
        viewport.update(|vp| vp.zoom_at(delta, x, y));
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let drag_start = drag_start.clone();
        let last_pos = last_pos.clone();
        move |e: PointerEvent| {
            let pos = (e.client_x() as f64, e.client_y() as f64);
            is_dragging.set(true);
            drag_start.set(pos);
            last_pos.set(pos);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_pos = last_pos.clone();
        let over_marker = over_marker.clone();
        let index = index.clone();
        move |e: PointerEvent| {
            let pos = (e.client_x() as f64, e.client_y() as f64);
            if is_dragging.get() {
                let (lx, ly) = last_pos.get();
                last_pos.set(pos);
                viewport.update(|vp| vp.pan(pos.0 - lx, pos.1 - ly));
                return;
            }

            let canvas = canvas_ref.get_untracked();
            let (x, y) = local_point(canvas.clone(), pos.0, pos.1);
            let hit = viewport.with_untracked(|vp| index.borrow().find_at(vp, x, y));
            if hit.is_some() != over_marker.get() {
                over_marker.set(hit.is_some());
                if let Some(el) = canvas {
                    let cursor = if hit.is_some() { "pointer" } else { "grab" };
                    web_sys::HtmlElement::style(&el).set_property("cursor", cursor).ok();
                }
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        let over_marker = over_marker.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                let cursor = if over_marker.get() { "pointer" } else { "grab" };
                el.style().set_property("cursor", cursor).ok();
            }
        }
    };

    let on_click = {
        let drag_start = drag_start.clone();
        let index = index.clone();
        move |e: MouseEvent| {
            let (sx, sy) = drag_start.get();
            let pos = (e.client_x() as f64, e.client_y() as f64);
            if !is_click(pos.0 - sx, pos.1 - sy) {
                return;
            }
            let (x, y) = local_point(canvas_ref.get_untracked(), pos.0, pos.1);
            let hit = viewport.with_untracked(|vp| index.borrow().find_at(vp, x, y));
            let Some(hit) = hit else {
                return;
            };
            markers.with_untracked(|m| {
                if let Some(marker) = m.get(hit) {
                    popup.update(|state| state.on_click(Some((hit, marker))));
                }
            });
        }
    };

    view! {
        <canvas
            node_ref=canvas_ref
            style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:click=on_click
        />
    }
}

struct DrawInput<'a> {
    ctx: &'a CanvasRenderingContext2d,
    vp: &'a Viewport,
    tiles: &'a SharedTileCache,
    placements: &'a [TilePlacement],
    markers: &'a [Marker],
    icons: &'a IconImages,
}

fn draw_map(input: DrawInput<'_>) {
    let DrawInput {
        ctx,
        vp,
        tiles,
        placements,
        markers,
        icons,
    } = input;
    let (w, h) = (vp.width, vp.height);

    ctx.set_fill_style_str(MAP_BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);

    {
        let cache = tiles.borrow();
        for p in placements {
            let Some(img) = cache.image(&p.coord) else {
                continue;
            };
            // Snap to the pixel grid so neighbouring tiles overlap instead of leaving seams
            let sx = p.screen_x.floor();
            let sy = p.screen_y.floor();
            let size_x = (p.screen_x + p.size).ceil() - sx;
            let size_y = (p.screen_y + p.size).ceil() - sy;
            ctx.draw_image_with_html_image_element_and_dw_and_dh(img, sx, sy, size_x, size_y)
                .ok();
        }
    }

    let (l, t, r, b) = ICON_STYLE.screen_rect();
    let size = ICON_STYLE.drawn_size();
    // Markers repeat with the tiles on every world copy in view
    for copy in vp.world_copies() {
        let shift = copy as f64;
        for marker in markers {
            let (ax, ay) = vp.world_to_screen(marker.world_x + shift, marker.world_y);
            if ax + r < 0.0 || ay + b < 0.0 || ax + l > w || ay + t > h {
                continue;
            }
            draw_marker(ctx, icons, marker, ax + l, ay + t, size);
        }
    }
}

fn draw_marker(
    ctx: &CanvasRenderingContext2d,
    icons: &IconImages,
    marker: &Marker,
    x: f64,
    y: f64,
    size: f64,
) {
    match icons.get(marker.icon) {
        Some(img) => {
            ctx.draw_image_with_html_image_element_and_dw_and_dh(img, x, y, size, size)
                .ok();
        }
        None => {
            let (cr, cg, cb) = marker.icon.fallback_rgb();
            ctx.begin_path();
            ctx.arc(x + size / 2.0, y + size / 2.0, size * 0.3, 0.0, TAU).ok();
            ctx.set_fill_style_str(&rgba_css(cr, cg, cb, 0.9));
            ctx.fill();
            ctx.set_line_width(1.5);
            ctx.set_stroke_style_str(MARKER_OUTLINE);
            ctx.stroke();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_click;

    #[test]
    fn small_movement_is_click() {
        assert!(is_click(0.0, 0.0));
        assert!(is_click(4.9, -4.9));
    }

    #[test]
    fn drag_is_not_click() {
        assert!(!is_click(5.0, 0.0));
        assert!(!is_click(0.0, -12.0));
    }
}
