//! Bounded undo/redo over room snapshots.

use std::collections::VecDeque;

use crate::snapshot::RoomSnapshot;

/// Most snapshots kept on each stack.
pub const HISTORY_LIMIT: usize = 100;

/// Undo and redo stacks of [`RoomSnapshot`]s.
///
/// Callers record the state *before* an action. Undo hands back the
/// previous state and keeps the current one for redo.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: VecDeque<RoomSnapshot>,
    redo: VecDeque<RoomSnapshot>,
}

fn push_bounded(stack: &mut VecDeque<RoomSnapshot>, snapshot: RoomSnapshot) {
    if stack.len() == HISTORY_LIMIT {
        stack.pop_front();
    }
    stack.push_back(snapshot);
}

impl History {
    /// Empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
        }
    }

    /// Record the state before a new action and clear the redo stack.
    ///
    /// A snapshot identical to the most recent one is not stored again.
    pub fn record(&mut self, before: RoomSnapshot) {
        self.redo.clear();
        let duplicate = self
            .undo
            .back()
            .is_some_and(|last| last.fingerprint() == before.fingerprint() && *last == before);
        if !duplicate {
            push_bounded(&mut self.undo, before);
        }
    }

    /// Step back. `current` moves to the redo stack and the previous
    /// state is returned, or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: RoomSnapshot) -> Option<RoomSnapshot> {
        let previous = self.undo.pop_back()?;
        push_bounded(&mut self.redo, current);
        Some(previous)
    }

    /// Step forward again after [`undo`](Self::undo).
    pub fn redo(&mut self, current: RoomSnapshot) -> Option<RoomSnapshot> {
        let next = self.redo.pop_back()?;
        push_bounded(&mut self.undo, current);
        Some(next)
    }

    /// Returns `true` if there is anything to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Returns `true` if there is anything to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps available.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
