use log::{debug, warn};

use crate::config::EditorConfig;
use crate::error::{EditorError, SnapshotError};
use crate::history::HistoryStack;
use crate::snapshot::{Snapshot, SnapshotController};
use crate::surface::{CaretPosition, CaretRange, EditableSurface};

/// Whether the undo and redo controls should be enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Affordances {
    pub can_undo: bool,
    pub can_redo: bool,
}

/// One editor instance: its surface, history and snapshot controller.
pub struct EditorContext<S: EditableSurface> {
    surface: S,
    history: HistoryStack<Snapshot<S::Fragment>>,
    controller: SnapshotController,
}

impl<S: EditableSurface> EditorContext<S> {
    pub fn new(surface: S, config: &EditorConfig) -> Self {
        let history = match config.history_limit {
            Some(limit) => HistoryStack::with_limit(limit),
            None => HistoryStack::new(),
        };
        Self {
            surface,
            history,
            controller: SnapshotController::new(config.marker_attribute.clone()),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn history(&self) -> &HistoryStack<Snapshot<S::Fragment>> {
        &self.history
    }

    pub fn affordances(&self) -> Affordances {
        Affordances {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    /// Snapshot the current content and caret as a new history entry.
    ///
    /// A selection outside the editor, or none at all, is recorded as a
    /// caret at the end of the content.
    pub fn commit(&mut self) -> Result<Affordances, EditorError> {
        let caret = self
            .surface
            .selection()
            .filter(|range| self.surface.contains(&range.start.node))
            .unwrap_or_else(|| {
                let root = self.surface.root();
                let end = self.surface.child_count(&root);
                CaretRange::collapsed(CaretPosition::new(root, end))
            });

        let snapshot = self.controller.capture(&mut self.surface, caret)?;
        self.history.add(snapshot);
        debug!(
            "committed snapshot, index {:?} of {}",
            self.history.current_index(),
            self.history.len()
        );
        Ok(self.affordances())
    }

    pub fn undo(&mut self) -> Result<CaretPosition<S::Node>, EditorError> {
        let snapshot = self.history.undo()?;
        let caret = Self::apply(&self.controller, &mut self.surface, snapshot)?;
        debug!("undo, index now {:?}", self.history.current_index());
        Ok(caret)
    }

    pub fn redo(&mut self) -> Result<CaretPosition<S::Node>, EditorError> {
        let snapshot = self.history.redo()?;
        let caret = Self::apply(&self.controller, &mut self.surface, snapshot)?;
        debug!("redo, index now {:?}", self.history.current_index());
        Ok(caret)
    }

    fn apply(
        controller: &SnapshotController,
        surface: &mut S,
        snapshot: &Snapshot<S::Fragment>,
    ) -> Result<CaretPosition<S::Node>, EditorError> {
        match controller.restore(surface, snapshot) {
            Ok(caret) => Ok(caret),
            Err(SnapshotError::CorruptSnapshot) => {
                warn!(
                    "snapshot from {} has no caret marker, caret moved to start",
                    snapshot.timestamp()
                );
                Ok(CaretPosition::new(surface.root(), 0))
            }
            Err(err) => Err(err.into()),
        }
    }
}
