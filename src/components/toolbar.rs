use std::rc::Rc;

use leptos::prelude::*;

use crate::app::HistoryCtx;
use crate::keymap::HistoryCommand;

const BUTTON_STYLE: &str = "background: transparent; color: #66cc88; border: 1px solid #66cc88; \
                            padding: 6px 14px; cursor: pointer; margin-right: 8px; \
                            font-family: inherit; font-size: 12px;";

#[component]
pub fn HistoryToolbar(on_command: Rc<dyn Fn(HistoryCommand)>) -> impl IntoView {
    let ctx = use_context::<HistoryCtx>().unwrap();
    let on_undo = on_command.clone();
    let on_redo = on_command;

    view! {
        <div style="margin-bottom: 12px;">
            <button
                style=BUTTON_STYLE
                disabled=move || !ctx.affordances.get().can_undo
                on:click=move |_| on_undo(HistoryCommand::Undo)
            >
                "Undo"
            </button>
            <button
                style=BUTTON_STYLE
                disabled=move || !ctx.affordances.get().can_redo
                on:click=move |_| on_redo(HistoryCommand::Redo)
            >
                "Redo"
            </button>
        </div>
    }
}
