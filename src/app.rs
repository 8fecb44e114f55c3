use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info};

use crate::components::{HistoryToolbar, StatusMessage};
use crate::config::EditorConfig;
use crate::context::{Affordances, EditorContext};
use crate::debounce::{Debouncer, TimeoutScheduler};
use crate::dom::DomSurface;
use crate::keymap::{HistoryCommand, KeyChord};

const FONT: &str = "'JetBrains Mono', 'Fira Code', Consolas, monospace";

/// Reactive state shared with the toolbar and status line.
#[derive(Clone, Copy)]
pub struct HistoryCtx {
    pub affordances: ReadSignal<Affordances>,
    pub status_visible: ReadSignal<bool>,
}

/// Everything the event handlers need, cloned into each closure.
#[derive(Clone)]
struct Session {
    editor: Rc<RefCell<Option<EditorContext<DomSurface>>>>,
    capture_timer: Rc<RefCell<Debouncer<TimeoutScheduler>>>,
    status_timer: Rc<RefCell<Debouncer<TimeoutScheduler>>>,
    set_affordances: WriteSignal<Affordances>,
    set_status_visible: WriteSignal<bool>,
}

impl Session {
    fn attach(&self, surface: DomSurface, config: &EditorConfig) {
        *self.editor.borrow_mut() = Some(EditorContext::new(surface, config));
        if config.baseline_snapshot {
            self.commit(false);
        }
        info!("editor attached");
    }

    fn commit(&self, announce: bool) {
        let result = match self.editor.borrow_mut().as_mut() {
            Some(editor) => editor.commit(),
            None => return,
        };
        match result {
            Ok(affordances) => {
                self.set_affordances.set(affordances);
                if announce {
                    self.flash_status();
                }
            }
            Err(err) => error!("failed to capture snapshot: {}", err),
        }
    }

    fn flash_status(&self) {
        self.set_status_visible.set(true);
        let set_status_visible = self.set_status_visible;
        self.status_timer
            .borrow_mut()
            .schedule(move || set_status_visible.set(false));
    }

    fn on_input(&self) {
        let session = self.clone();
        self.capture_timer
            .borrow_mut()
            .schedule(move || session.commit(true));
        self.refresh();
    }

    fn run(&self, command: HistoryCommand) {
        // Record the edit still waiting on the debounce before stepping away from it
        let flushed = self.capture_timer.borrow_mut().flush();
        if flushed {
            debug!("flushed pending capture before {:?}", command);
        }

        let mut guard = self.editor.borrow_mut();
        let Some(editor) = guard.as_mut() else {
            return;
        };
        let affordances = editor.affordances();
        let result = match command {
            HistoryCommand::Undo if affordances.can_undo => editor.undo(),
            HistoryCommand::Redo if affordances.can_redo => editor.redo(),
            _ => return,
        };
        if let Err(err) = result {
            error!("{:?} failed: {}", command, err);
        }
        self.set_affordances.set(editor.affordances());
    }

    fn refresh(&self) {
        if let Some(editor) = self.editor.borrow().as_ref() {
            self.set_affordances.set(editor.affordances());
        }
    }
}

#[component]
pub fn App(config: EditorConfig) -> impl IntoView {
    let (affordances, set_affordances) = signal(Affordances::default());
    let (status_visible, set_status_visible) = signal(false);
    let editor_ref = NodeRef::<leptos::html::Div>::new();

    let session = Session {
        editor: Rc::new(RefCell::new(None)),
        capture_timer: Rc::new(RefCell::new(Debouncer::new(TimeoutScheduler, config.debounce()))),
        status_timer: Rc::new(RefCell::new(Debouncer::new(TimeoutScheduler, config.status()))),
        set_affordances,
        set_status_visible,
    };

    provide_context(HistoryCtx {
        affordances,
        status_visible,
    });

    // Build the editor context once the element exists
    Effect::new({
        let session = session.clone();
        move || {
            let Some(div) = editor_ref.get() else {
                return;
            };
            if session.editor.borrow().is_some() {
                return;
            }
            match DomSurface::new(div.into()) {
                Ok(surface) => session.attach(surface, &config),
                Err(err) => error!("cannot attach editor: {}", err),
            }
        }
    });

    let on_input = {
        let session = session.clone();
        move |_| session.on_input()
    };

    let on_keydown = {
        let session = session.clone();
        move |ev: web_sys::KeyboardEvent| {
            if let Some(command) = HistoryCommand::from_key(&KeyChord::from_event(&ev)) {
                ev.prevent_default();
                session.run(command);
            }
        }
    };

    let on_command: Rc<dyn Fn(HistoryCommand)> = Rc::new(move |command: HistoryCommand| session.run(command));

    view! {
        <div style=format!(
            "width: 100vw; min-height: 100vh; background: #020202; color: #ccffdd; \
             padding: 24px; box-sizing: border-box; font-family: {};",
            FONT
        )>
            <HistoryToolbar on_command=on_command />
            <StatusMessage />
            <div
                node_ref=editor_ref
                contenteditable="true"
                style="min-height: 60vh; border: 1px solid #44dd66; padding: 12px; \
                       outline: none; line-height: 1.6; font-size: 14px;"
                on:input=on_input
                on:keydown=on_keydown
            />
            <div style="margin-top: 12px; color: #66cc88; font-size: 11px; letter-spacing: 0.5px;">
                "[CMD/CTRL+Z] undo  [CMD/CTRL+SHIFT+Z] redo"
            </div>
        </div>
    }
}
