use crate::{
    constants::quiz_limits::MAX_QUESTIONS,
    models::domain::{document::ActiveSource, trigger_tracker::TriggerTracker},
};

/// Fetch lifecycle state, kept next to (not inside) the quiz state.
#[derive(Clone, Debug, Default)]
pub struct AcquisitionState {
    pub active_source: Option<ActiveSource>,
    pub is_fetching_more: bool,
    pub has_reached_end: bool,
    pub triggers: TriggerTracker,
    /// Bumped on every reset; in-flight work compares it before applying results.
    pub epoch: u64,
}

impl AcquisitionState {
    /// Drops the source, flags and trigger history, and starts a new epoch.
    pub fn reset(&mut self) -> u64 {
        self.active_source = None;
        self.is_fetching_more = false;
        self.has_reached_end = false;
        self.triggers.clear();
        self.epoch += 1;
        self.epoch
    }

    pub fn mark_reached_end(&mut self) {
        self.has_reached_end = true;
    }

    pub fn remaining_capacity(question_count: usize) -> usize {
        MAX_QUESTIONS.saturating_sub(question_count)
    }
}
