pub mod store;

use serde::{Deserialize, Serialize};

/// Per-topic spaced-repetition state, persisted keyed by
/// `subjectId__topicName`. Mutated by "mark as revised" and flashcard rating
/// actions; deleted only by explicit reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionProgress {
    /// Epoch milliseconds of the last revision, if any
    #[serde(default)]
    pub last_revised_at: Option<i64>,
    /// Spaced-repetition stage, clamped to 0..=4
    #[serde(default)]
    pub stage: u8,
    /// Epoch milliseconds of the next due review
    #[serde(default)]
    pub next_review_at: Option<i64>,
    /// User-visible deferral marker; independent of stage
    #[serde(default)]
    pub revise_later: bool,
}

/// One flashcard in a per-topic deck. Same stage/interval mechanics as
/// `RevisionProgress`, tracked independently per card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashCard {
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub stage: u8,
    #[serde(default)]
    pub next_review_at: Option<i64>,
}
