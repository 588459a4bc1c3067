// File: crates/overlay-core/src/history.rs
// Summary: Snapshot undo/redo stacks with an optional depth limit.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    undo_stack: VecDeque<T>,
    redo_stack: Vec<T>,
    limit: Option<usize>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self { undo_stack: VecDeque::new(), redo_stack: Vec::new(), limit: None }
    }
}

impl<T: Clone> History<T> {
    /// `limit` caps the undo stack; the oldest snapshots fall off first.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self { limit, ..Self::default() }
    }

    /// Record the state as it was before a mutation. Clears redo.
    pub fn record(&mut self, before: T) {
        self.undo_stack.push_back(before);
        self.redo_stack.clear();
        if let Some(limit) = self.limit {
            while self.undo_stack.len() > limit {
                self.undo_stack.pop_front();
            }
        }
    }

    /// Previous state, with `current` moved onto the redo stack.
    pub fn undo(&mut self, current: &T) -> Option<T> {
        let prev = self.undo_stack.pop_back()?;
        self.redo_stack.push(current.clone());
        Some(prev)
    }

    pub fn redo(&mut self, current: &T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current.clone());
        Some(next)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool { !self.undo_stack.is_empty() }
    pub fn can_redo(&self) -> bool { !self.redo_stack.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_clears_redo_stack() {
        let mut history = History::default();
        history.record(vec![0]);
        assert_eq!(history.undo(&vec![0, 1]), Some(vec![0]));
        assert_eq!(history.redo_len(), 1);

        history.record(vec![0]);
        assert_eq!(history.redo_len(), 0);
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn undo_redo_roundtrip_snapshots() {
        let mut history = History::default();
        let mut state = vec![];
        for i in 1..=2 {
            history.record(state.clone());
            state.push(i);
        }

        state = history.undo(&state).unwrap();
        assert_eq!(state, vec![1]);
        state = history.undo(&state).unwrap();
        assert!(state.is_empty());
        assert_eq!(history.undo(&state), None);

        state = history.redo(&state).unwrap();
        state = history.redo(&state).unwrap();
        assert_eq!(state, vec![1, 2]);
        assert_eq!(history.redo(&state), None);
    }

    #[test]
    fn limit_drops_oldest() {
        let mut history = History::with_limit(Some(2));
        for i in 0..5 {
            history.record(i);
        }
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.undo(&5), Some(4));
        assert_eq!(history.undo(&4), Some(3));
        assert!(!history.can_undo());
    }
}
