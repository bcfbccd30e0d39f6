use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use web_sys::HtmlImageElement;

use orcamap_shared::{IconKey, Marker, lookup_icon};

/// Decoded catalog icons, filled in as each image finishes decoding.
#[derive(Clone, Default)]
pub struct IconImages(pub HashMap<IconKey, HtmlImageElement>);

impl IconImages {
    pub fn get(&self, key: IconKey) -> Option<&HtmlImageElement> {
        self.0.get(&key)
    }
}

static DECODE_WARNED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static REPORTED_LABELS: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

fn warn_decode_once(message: &str) {
    if DECODE_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        web_sys::console::warn_1(&message.into());
    }
}

pub fn load_icons(signal: RwSignal<IconImages>) {
    for key in IconKey::ALL {
        wasm_bindgen_futures::spawn_local(async move {
            let Ok(image) = HtmlImageElement::new() else {
                warn_decode_once("orcamap: failed to create icon image element");
                return;
            };
            image.set_src(&key.data_url());
            match wasm_bindgen_futures::JsFuture::from(image.decode()).await {
                Ok(_) => signal.update(|icons| {
                    icons.0.insert(key, image);
                }),
                Err(err) => warn_decode_once(&format!(
                    "orcamap: failed to decode icon {}: {:?}",
                    key.name(),
                    err
                )),
            }
        });
    }
}

/// Species labels that fell back to the default icon.
pub fn unknown_species(markers: &[Marker]) -> BTreeSet<&str> {
    markers
        .iter()
        .map(|m| m.species.as_str())
        .filter(|label| lookup_icon(label).is_none())
        .collect()
}

/// Log each unmatched species label once per page load.
pub fn report_unknown_species(markers: &[Marker]) {
    for label in unknown_species(markers) {
        let first = REPORTED_LABELS.with(|seen| seen.borrow_mut().insert(label.to_string()));
        if first {
            web_sys::console::info_1(
                &format!("orcamap: no icon for species {label:?}, using default").into(),
            );
        }
    }
}
