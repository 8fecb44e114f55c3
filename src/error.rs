use thiserror::Error;

/// Misuse of the history stack: undo/redo with nothing to step to.
///
/// Callers are expected to check `can_undo`/`can_redo` first, so seeing
/// this at runtime points at a wiring bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("{0}")]
    InvalidOperation(&'static str),
}

/// Failure of a structural primitive on an editable surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("node is not a text node")]
    NotText,
    #[error("node is not attached to a parent")]
    Detached,
    #[error("dom operation failed: {0}")]
    Dom(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The restored content carried no caret marker.
    #[error("snapshot has no caret marker")]
    CorruptSnapshot,
    #[error("caret is outside the editable region")]
    CaretOutsideEditor,
    #[error("caret offset {offset} exceeds container length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Failure of an editor-level commit, undo or redo.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
