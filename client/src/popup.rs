use leptos::prelude::*;

use orcamap_shared::{PopupState, Viewport};

/// Gap between the bubble's tail and the marker anchor.
const POPUP_OFFSET_PX: f64 = 12.0;

/// Inline placement for the bubble: bottom-centre above the anchor point.
pub(crate) fn popup_anchor_style(x: f64, y: f64) -> String {
    format!(
        "left: {x:.1}px; top: {y:.1}px; transform: translate(-50%, calc(-100% - {POPUP_OFFSET_PX}px));"
    )
}

/// Sighting details for the last clicked marker. Follows the map as it pans and zooms.
#[component]
pub fn Popup() -> impl IntoView {
    let popup: RwSignal<PopupState> = expect_context();
    let viewport: RwSignal<Viewport> = expect_context();

    let position = Memo::new(move |_| {
        let (lon, lat) = popup.with(|p| p.content().map(|c| (c.lon, c.lat)))?;
        Some(viewport.with(|vp| vp.lonlat_to_screen(lon, lat)))
    });

    view! {
        {move || {
            let Some(lines) = popup.with(|p| p.content().map(|c| c.lines())) else {
                return ().into_any();
            };
            let (x, y) = position.get().unwrap_or((0.0, 0.0));
            view! {
                <div class="orcamap-popup" style=popup_anchor_style(x, y)>
                    <div class="orcamap-popup-content">
                        {lines
                            .into_iter()
                            .map(|line| view! { <div>{line}</div> })
                            .collect_view()}
                    </div>
                </div>
            }
            .into_any()
        }}
    }
}
