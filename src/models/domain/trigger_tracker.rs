use std::collections::HashSet;

use crate::constants::quiz_limits::{BATCH_SIZE, CHECKPOINT_OFFSETS};

/// Remembers which graded indices already started an automatic fetch.
#[derive(Clone, Debug, Default)]
pub struct TriggerTracker {
    triggered: HashSet<usize>,
}

impl TriggerTracker {
    pub fn is_checkpoint(index: usize) -> bool {
        CHECKPOINT_OFFSETS.contains(&(index % BATCH_SIZE))
    }

    /// Returns true exactly once per checkpoint index, marking it as triggered.
    pub fn register_grading(&mut self, index: usize) -> bool {
        Self::is_checkpoint(index) && self.triggered.insert(index)
    }

    pub fn has_triggered(&self, index: usize) -> bool {
        self.triggered.contains(&index)
    }

    pub fn clear(&mut self) {
        self.triggered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_third_and_thirteenth_question_of_every_batch_are_checkpoints() {
        let checkpoints: Vec<usize> = (0..45).filter(|i| TriggerTracker::is_checkpoint(*i)).collect();

        assert_eq!(checkpoints, vec![2, 12, 17, 27, 32, 42]);
    }

    #[test]
    fn test_checkpoint_triggers_only_once() {
        let mut tracker = TriggerTracker::default();

        assert!(tracker.register_grading(2));
        assert!(!tracker.register_grading(2));
        assert!(tracker.has_triggered(2));
    }

    #[test]
    fn test_non_checkpoint_is_never_recorded() {
        let mut tracker = TriggerTracker::default();

        assert!(!tracker.register_grading(3));
        assert!(!tracker.has_triggered(3));
    }

    #[test]
    fn test_clear_forgets_history() {
        let mut tracker = TriggerTracker::default();
        tracker.register_grading(12);
        tracker.clear();

        assert!(tracker.register_grading(12));
    }
}
