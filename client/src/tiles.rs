#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

use orcamap_shared::config::{MAX_CACHED_TILES, TILE_CONCURRENCY};
use orcamap_shared::{TileCoord, TilePlacement, tile_url};

const ONLOAD_HANDLE_KEY: &str = "__orcamapTileOnload";
const ONERROR_HANDLE_KEY: &str = "__orcamapTileOnerror";

type ReadyCallback = Rc<dyn Fn()>;

pub enum TileSlot {
    Loading,
    Ready(HtmlImageElement),
    Failed,
}

/// Raster base layer: image cache keyed by tile address plus a bounded load queue.
pub struct TileCache {
    template: String,
    slots: HashMap<TileCoord, TileSlot>,
    queue: VecDeque<TileCoord>,
    wanted: HashSet<TileCoord>,
    in_flight: usize,
    on_ready: ReadyCallback,
}

pub type SharedTileCache = Rc<RefCell<TileCache>>;

impl TileCache {
    pub fn new(template: String, on_ready: ReadyCallback) -> SharedTileCache {
        Rc::new(RefCell::new(Self {
            template,
            slots: HashMap::new(),
            queue: VecDeque::new(),
            wanted: HashSet::new(),
            in_flight: 0,
            on_ready,
        }))
    }

    pub fn image(&self, coord: &TileCoord) -> Option<&HtmlImageElement> {
        match self.slots.get(coord) {
            Some(TileSlot::Ready(img)) => Some(img),
            _ => None,
        }
    }

    /// Record the tiles the current frame needs and queue the missing ones.
    /// Returns true when new loads should be started.
    fn want(&mut self, placements: &[TilePlacement]) -> bool {
        self.wanted = placements.iter().map(|p| p.coord).collect();
        // Tiles dropped from view before their turn never start loading
        let wanted = &self.wanted;
        let slots = &mut self.slots;
        self.queue.retain(|coord| {
            let keep = wanted.contains(coord);
            if !keep {
                slots.remove(coord);
            }
            keep
        });

        for p in placements {
            if !self.slots.contains_key(&p.coord) {
                self.slots.insert(p.coord, TileSlot::Loading);
                self.queue.push_back(p.coord);
            }
        }

        prune_to_limit(&mut self.slots, &self.wanted, MAX_CACHED_TILES);
        !self.queue.is_empty() && self.in_flight < TILE_CONCURRENCY
    }

    fn finish(&mut self, coord: TileCoord, slot: TileSlot) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.slots.insert(coord, slot);
    }
}

/// Request the visible tiles; newly decoded tiles trigger the ready callback.
pub fn request_tiles(cache: &SharedTileCache, placements: &[TilePlacement]) {
    let start = cache.borrow_mut().want(placements);
    if start {
        pump_queue(cache.clone());
    }
}

fn pump_queue(cache: SharedTileCache) {
    loop {
        let (coord, src) = {
            let mut c = cache.borrow_mut();
            if c.in_flight >= TILE_CONCURRENCY {
                return;
            }
            let Some(coord) = c.queue.pop_front() else {
                return;
            };
            c.in_flight += 1;
            (coord, tile_url(&c.template, coord))
        };
        load_tile(cache.clone(), coord, src);
    }
}

fn complete(cache: &SharedTileCache, coord: TileCoord, slot: TileSlot) {
    let on_ready = {
        let mut c = cache.borrow_mut();
        let ready = matches!(slot, TileSlot::Ready(_));
        c.finish(coord, slot);
        ready.then(|| c.on_ready.clone())
    };
    pump_queue(cache.clone());
    if let Some(cb) = on_ready {
        cb();
    }
}

fn load_tile(cache: SharedTileCache, coord: TileCoord, src: String) {
    let img = match HtmlImageElement::new() {
        Ok(img) => img,
        Err(_) => {
            complete(&cache, coord, TileSlot::Failed);
            return;
        }
    };

    let img_for_load = img.clone();
    let cache_load = cache.clone();
    let onload = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_load);

        let img_for_decode = img_for_load.clone();
        let cache_load = cache_load.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let _ = JsFuture::from(img_for_decode.decode()).await;
            complete(&cache_load, coord, TileSlot::Ready(img_for_decode));
        });
    });

    let img_for_error = img.clone();
    let cache_error = cache.clone();
    let onerror = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_error);
        complete(&cache_error, coord, TileSlot::Failed);
    });

    let onload_js = onload.into_js_value();
    let onerror_js = onerror.into_js_value();
    img.set_onload(Some(onload_js.unchecked_ref()));
    img.set_onerror(Some(onerror_js.unchecked_ref()));
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONLOAD_HANDLE_KEY),
        &onload_js,
    );
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONERROR_HANDLE_KEY),
        &onerror_js,
    );
    img.set_src(&src);
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}

/// Once the cache exceeds `limit`, drop everything the current view does not need.
fn prune_to_limit<K: Eq + Hash, V>(slots: &mut HashMap<K, V>, keep: &HashSet<K>, limit: usize) {
    if slots.len() > limit {
        slots.retain(|key, _| keep.contains(key));
    }
}

#[cfg(test)]
mod tests {
    use super::prune_to_limit;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn prune_keeps_small_cache_intact() {
        let mut slots: HashMap<u32, &str> = (0..4).map(|k| (k, "tile")).collect();
        let keep: HashSet<u32> = [1].into_iter().collect();
        prune_to_limit(&mut slots, &keep, 8);
        assert_eq!(slots.len(), 4);
    }

    #[test]
    fn prune_drops_offscreen_tiles_over_limit() {
        let mut slots: HashMap<u32, &str> = (0..10).map(|k| (k, "tile")).collect();
        let keep: HashSet<u32> = [2, 3, 42].into_iter().collect();
        prune_to_limit(&mut slots, &keep, 8);
        let mut left: Vec<u32> = slots.into_keys().collect();
        left.sort();
        assert_eq!(left, vec![2, 3]);
    }
}
