//! Spaced-repetition stage transitions and review-date computation.
//!
//! Stages run 0..=4; the interval table has four entries, so stage 4 reuses
//! the stage-3 interval (21 days) via clamped indexing. That matches the
//! behavior observed in production and is kept as-is pending product
//! clarification.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::{FlashCard, RevisionProgress};

pub const MAX_STAGE: u8 = 4;

/// Days until the next review, indexed by stage (clamped).
pub const INTERVAL_DAYS: [i64; 4] = [1, 3, 7, 21];

/// Outcome of one revision, reported by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Easy,
    Medium,
    Hard,
}

/// Compute the next stage from the previous stage and a rating.
///
/// * `hard` resets to stage 0.
/// * `medium` clamps into [1, 2]: it neither escalates past 2 nor regresses
///   below 1.
/// * `easy` advances one stage, capped at `MAX_STAGE`.
pub fn compute_next_stage(prev_stage: u8, rating: Rating) -> u8 {
    match rating {
        Rating::Hard => 0,
        Rating::Medium => prev_stage.clamp(1, 2),
        Rating::Easy => (prev_stage + 1).min(MAX_STAGE),
    }
}

/// Interval in days for a stage, with the index clamped into the table.
pub fn interval_days(stage: u8) -> i64 {
    let idx = (stage as usize).min(INTERVAL_DAYS.len() - 1);
    INTERVAL_DAYS[idx]
}

/// Next review timestamp (epoch ms) for a stage, relative to `now`.
pub fn next_review_at(stage: u8, now: DateTime<Utc>) -> i64 {
    (now + Duration::days(interval_days(stage))).timestamp_millis()
}

/// Apply a revision outcome to a topic's progress: advance the stage, stamp
/// the revision time, and schedule the next review.
pub fn apply_rating(progress: &mut RevisionProgress, rating: Rating, now: DateTime<Utc>) {
    let stage = compute_next_stage(progress.stage, rating);
    progress.stage = stage;
    progress.last_revised_at = Some(now.timestamp_millis());
    progress.next_review_at = Some(next_review_at(stage, now));
}

/// Apply a rating to one flashcard; same mechanics, tracked per card.
pub fn rate_card(card: &mut FlashCard, rating: Rating, now: DateTime<Utc>) {
    let stage = compute_next_stage(card.stage, rating);
    card.stage = stage;
    card.next_review_at = Some(next_review_at(stage, now));
}
