use leptos::prelude::*;

use crate::app::HistoryCtx;

#[component]
pub fn StatusMessage() -> impl IntoView {
    let ctx = use_context::<HistoryCtx>().unwrap();

    view! {
        <div
            style=move || format!(
                "color: #44dd66; font-size: 11px; letter-spacing: 0.5px; height: 16px; display: {};",
                if ctx.status_visible.get() { "block" } else { "none" }
            )
        >
            "[SAVED]"
        </div>
    }
}
