//! Undo/redo with caret restoration for a `contenteditable` editor.

pub mod app;
mod components;
pub mod config;
pub mod context;
pub mod debounce;
pub mod dom;
pub mod error;
pub mod history;
pub mod keymap;
pub mod logging;
pub mod memory;
pub mod snapshot;
pub mod surface;

pub use context::{Affordances, EditorContext};
pub use error::{EditorError, HistoryError, SnapshotError, SurfaceError};
pub use history::HistoryStack;
pub use snapshot::{Snapshot, SnapshotController};
pub use surface::{CaretPosition, CaretRange, EditableSurface};
