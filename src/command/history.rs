use std::collections::VecDeque;

use crate::layer::LayerStack;

/// Bounded undo/redo stacks of full canvas snapshots
#[derive(Debug, Clone)]
pub struct HistoryManager {
    /// Snapshots that can be restored by undo, newest at the back
    undo_stack: VecDeque<LayerStack>,
    /// Snapshots that can be restored by redo, newest at the back
    redo_stack: VecDeque<LayerStack>,
    max_depth: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_HISTORY_DEPTH)
    }
}

impl HistoryManager {
    /// Creates an empty history keeping at most `max_depth` entries per
    /// stack. A depth of zero records nothing.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Records the state from before an edit and drops any redo states
    pub fn commit(&mut self, snapshot: LayerStack) {
        self.redo_stack.clear();
        push_bounded(&mut self.undo_stack, snapshot, self.max_depth);
        log::debug!("History commit, {} undo entries", self.undo_stack.len());
    }

    /// Restores the previous snapshot into `stack`. Returns false when there
    /// is nothing to undo.
    pub fn undo(&mut self, stack: &mut LayerStack) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            return false;
        };
        let current = std::mem::replace(stack, previous);
        push_bounded(&mut self.redo_stack, current, self.max_depth);
        log::debug!("Undo, {} undo / {} redo entries", self.undo_stack.len(), self.redo_stack.len());
        true
    }

    /// Re-applies the most recently undone snapshot. Returns false when there
    /// is nothing to redo.
    pub fn redo(&mut self, stack: &mut LayerStack) -> bool {
        let Some(next) = self.redo_stack.pop_back() else {
            return false;
        };
        let current = std::mem::replace(stack, next);
        push_bounded(&mut self.undo_stack, current, self.max_depth);
        log::debug!("Redo, {} undo / {} redo entries", self.undo_stack.len(), self.redo_stack.len());
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn push_bounded(stack: &mut VecDeque<LayerStack>, snapshot: LayerStack, max_depth: usize) {
    if max_depth == 0 {
        return;
    }
    while stack.len() >= max_depth {
        stack.pop_front();
    }
    stack.push_back(snapshot);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn stack_with_pixel(color: Color) -> LayerStack {
        let mut stack = LayerStack::new(2, 2).unwrap();
        stack.active_layer_mut().buffer_mut().set(0, 0, color).unwrap();
        stack
    }

    #[test]
    fn test_empty_history_is_noop() {
        let mut history = HistoryManager::new(10);
        let mut stack = stack_with_pixel(Color::BLACK);
        let before = stack.clone();
        assert!(!history.undo(&mut stack));
        assert!(!history.redo(&mut stack));
        assert_eq!(stack, before);
    }

    #[test]
    fn test_depth_bound_drops_oldest() {
        let mut history = HistoryManager::new(2);
        let mut stack = stack_with_pixel(Color::rgb(3, 3, 3));
        history.commit(stack_with_pixel(Color::rgb(0, 0, 0)));
        history.commit(stack_with_pixel(Color::rgb(1, 1, 1)));
        history.commit(stack_with_pixel(Color::rgb(2, 2, 2)));
        assert_eq!(history.undo_len(), 2);

        assert!(history.undo(&mut stack));
        assert!(history.undo(&mut stack));
        assert!(!history.undo(&mut stack));
        assert_eq!(stack, stack_with_pixel(Color::rgb(1, 1, 1)));
    }

    #[test]
    fn test_zero_depth_records_nothing() {
        let mut history = HistoryManager::new(0);
        history.commit(stack_with_pixel(Color::BLACK));
        assert!(!history.can_undo());
    }
}
