/// Questions requested from the provider per call.
pub const BATCH_SIZE: usize = 15;

/// Hard ceiling on accepted questions per session.
pub const MAX_QUESTIONS: usize = 65;

/// Positions within a batch (0-based) whose grading starts a background fetch.
pub const CHECKPOINT_OFFSETS: [usize; 2] = [2, 12];

pub const OPTIONS_PER_QUESTION: usize = 4;

/// How many of the most recent question titles are quoted back to the provider.
pub const DEFAULT_EXCLUSION_CONTEXT_LIMIT: usize = 30;

/// Upper bound (exclusive) of the selection seed embedded in prompts.
pub const SELECTION_SEED_RANGE: u32 = 1_000_000;
