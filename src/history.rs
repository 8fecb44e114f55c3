use crate::error::HistoryError;

/// Linear undo/redo buffer over full snapshots.
///
/// Entries live in one sequence addressed by a cursor. `None` is the state
/// before every entry. Adding while the cursor is behind the end discards
/// the redo tail, so history never branches.
#[derive(Clone, Debug)]
pub struct HistoryStack<T> {
    stack: Vec<T>,
    index: Option<usize>,
    limit: Option<usize>,
}

impl<T> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HistoryStack<T> {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            index: None,
            limit: None,
        }
    }

    /// Like `new`, but evicts the oldest entries once more than `limit`
    /// are stored.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Record a new entry. Drops everything after the cursor first.
    pub fn add(&mut self, item: T) {
        let keep = self.index.map_or(0, |i| i + 1);
        self.stack.truncate(keep);
        self.stack.push(item);

        // Trim oldest entries if we exceed the limit
        if let Some(limit) = self.limit {
            if self.stack.len() > limit {
                let excess = self.stack.len() - limit;
                self.stack.drain(..excess);
            }
        }

        self.index = self.stack.len().checked_sub(1);
    }

    pub fn can_undo(&self) -> bool {
        self.index.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.next_index() < self.stack.len()
    }

    /// Return the entry under the cursor, then step the cursor back.
    pub fn undo(&mut self) -> Result<&T, HistoryError> {
        let current = self
            .index
            .ok_or(HistoryError::InvalidOperation("cannot Undo"))?;
        self.index = current.checked_sub(1);
        Ok(&self.stack[current])
    }

    /// Step the cursor forward, then return the entry under it.
    pub fn redo(&mut self) -> Result<&T, HistoryError> {
        if !self.can_redo() {
            return Err(HistoryError::InvalidOperation("cannot Redo"));
        }
        let next = self.next_index();
        self.index = Some(next);
        Ok(&self.stack[next])
    }

    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Forget every entry and return to the initial state.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.index = None;
    }

    fn next_index(&self) -> usize {
        self.index.map_or(0, |i| i + 1)
    }
}
