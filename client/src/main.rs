mod api;
mod app;
mod canvas;
mod colors;
mod icons;
mod popup;
mod render_loop;
mod tiles;

use leptos::mount::mount_to;
use leptos::prelude::*;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

use app::{App, MapConfig};

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let mount_target = document
        .get_element_by_id("orcamap")
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .or_else(|| document.body());
    let Some(target) = mount_target else {
        return;
    };
    let config = MapConfig::from_element(&target);

    APP_MOUNT_HANDLE.with(move |slot| {
        // Drop any earlier mount so its effects stop touching shared state
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, move || view! { <App config=config.clone() /> });
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
