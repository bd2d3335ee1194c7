use rand::{seq::SliceRandom, Rng};

use crate::models::domain::QuizQuestion;

/// Uniform in-place permutation (Fisher-Yates).
pub fn shuffle_in_place<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// One-time acceptance step: permutes every question's options, then the batch order.
///
/// Accepted questions are never passed through here again, so option order stays stable.
pub fn shuffle_batch<R: Rng + ?Sized>(mut batch: Vec<QuizQuestion>, rng: &mut R) -> Vec<QuizQuestion> {
    for question in batch.iter_mut() {
        shuffle_in_place(&mut question.options, rng);
    }
    shuffle_in_place(&mut batch, rng);
    batch
}
