use leptos::prelude::*;

use orcamap_shared::config::{
    INITIAL_VIEW, SIGHTINGS_URL, SIGHTINGS_URL_ATTR, TILE_ATTRIBUTION,
    TILE_URL_ATTR, TILE_URL_TEMPLATE, resolve_url,
};
use orcamap_shared::{LoadState, Marker, PopupState, Viewport, apply_load};

use crate::api::fetch_sightings;
use crate::canvas::MapCanvas;
use crate::colors::{STATUS_ERROR, STATUS_INFO};
use crate::icons::{IconImages, load_icons, report_unknown_species};
use crate::popup::Popup;

/// Widget edge length in CSS px.
pub(crate) const MAP_SIZE_PX: f64 = 500.0;

/// Endpoints the widget talks to. Read once from the mount element.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MapConfig {
    pub sightings_url: String,
    pub tile_url_template: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::from_attributes(None, None)
    }
}

impl MapConfig {
    pub fn from_attributes(sightings_url: Option<String>, tile_url: Option<String>) -> Self {
        Self {
            sightings_url: resolve_url(sightings_url, SIGHTINGS_URL),
            tile_url_template: resolve_url(tile_url, TILE_URL_TEMPLATE),
        }
    }

    pub fn from_element(el: &web_sys::Element) -> Self {
        Self::from_attributes(
            el.get_attribute(SIGHTINGS_URL_ATTR),
            el.get_attribute(TILE_URL_ATTR),
        )
    }
}

#[component]
pub fn App(config: MapConfig) -> impl IntoView {
    let viewport: RwSignal<Viewport> =
        RwSignal::new(Viewport::new(INITIAL_VIEW, MAP_SIZE_PX, MAP_SIZE_PX));
    let markers: RwSignal<Vec<Marker>> = RwSignal::new(Vec::new());
    let popup: RwSignal<PopupState> = RwSignal::new(PopupState::default());
    let icons: RwSignal<IconImages> = RwSignal::new(IconImages::default());
    let load_state: RwSignal<LoadState> = RwSignal::new(LoadState::default());

    provide_context(viewport);
    provide_context(markers);
    provide_context(popup);
    provide_context(icons);
    provide_context(load_state);
    provide_context(config.clone());

    // Decode the icon catalog once on mount
    Effect::new(move || {
        load_icons(icons);
    });

    // One-shot sightings fetch
    let sightings_url = config.sightings_url.clone();
    Effect::new(move || {
        let url = sightings_url.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = fetch_sightings(&url).await;
            match &result {
                Ok(sightings) => web_sys::console::info_1(
                    &format!("orcamap: loaded {} sightings", sightings.len()).into(),
                ),
                Err(err) => web_sys::console::warn_1(
                    &format!("orcamap: sightings unavailable from {url}: {err}").into(),
                ),
            }
            let mut loaded = markers.get_untracked();
            let mut vp = viewport.get_untracked();
            let state = apply_load(&result, &mut loaded, &mut vp);
            if result.is_ok() {
                report_unknown_species(&loaded);
                markers.set(loaded);
                viewport.set(vp);
            }
            load_state.set(state);
        });
    });

    let status = move || {
        load_state.with(|state| {
            let text = state.status_text()?;
            let color = if state.is_failed() {
                STATUS_ERROR
            } else {
                STATUS_INFO
            };
            Some(view! {
                <div
                    class="orcamap-status"
                    role="status"
                    style=format!(
                        "position: absolute; top: 8px; left: 50%; transform: translateX(-50%); padding: 4px 10px; border-radius: 4px; background: rgba(255,255,255,0.9); color: {color}; font: 12px system-ui, sans-serif; pointer-events: none;"
                    )
                >
                    {text}
                </div>
            })
        })
    };

    view! {
        <div class="orcamap-shell" style="padding: 25px;">
            <div
                class="orcamap-map"
                style=format!(
                    "position: relative; width: {MAP_SIZE_PX}px; height: {MAP_SIZE_PX}px; overflow: hidden;"
                )
            >
                <MapCanvas />
                <Popup />
                {status}
                <div
                    class="orcamap-attribution"
                    style="position: absolute; right: 0; bottom: 0; padding: 1px 5px; background: rgba(255,255,255,0.7); font: 11px system-ui, sans-serif; color: #333;"
                >
                    {TILE_ATTRIBUTION}
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_uses_defaults_without_attributes() {
        let config = MapConfig::default();
        assert_eq!(config.sightings_url, SIGHTINGS_URL);
        assert_eq!(config.tile_url_template, TILE_URL_TEMPLATE);
    }

    #[test]
    fn config_prefers_non_blank_attributes() {
        let config = MapConfig::from_attributes(
            Some(" http://localhost:8080/sightings.json ".into()),
            Some("   ".into()),
        );
        assert_eq!(config.sightings_url, "http://localhost:8080/sightings.json");
        assert_eq!(config.tile_url_template, TILE_URL_TEMPLATE);
    }
}
