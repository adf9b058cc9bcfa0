pub mod store;

use serde::{Deserialize, Serialize};

use crate::quiz::model::{AnswerMap, Difficulty, QuizPayload, TimeMode};

/// Maximum number of attempts kept in the log. Older entries are evicted
/// FIFO on append.
pub const MAX_ATTEMPTS: usize = 40;

/// One completed quiz submission. Immutable once written; the system of
/// record for all statistics. Topics and subjects are joined to attempts by
/// name/id string match only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredQuizAttempt {
    pub id: String,
    /// Epoch milliseconds
    pub created_at: i64,
    pub user_id: String,
    pub subject_id: String,
    #[serde(default)]
    pub subject_name: Option<String>,
    pub topic_name: String,
    pub difficulty: Difficulty,
    pub time_mode: TimeMode,
    pub exam_type: String,
    pub question_count: u32,
    pub quiz: QuizPayload,
    pub answers: AnswerMap,
}

impl StoredQuizAttempt {
    /// Key under which this attempt's topic is aggregated, and under which
    /// revision progress and flashcard decks are persisted.
    pub fn topic_key(&self) -> String {
        topic_key(&self.subject_id, &self.topic_name)
    }
}

/// `subjectId__topicName` join key used across stats, progress and decks.
pub fn topic_key(subject_id: &str, topic_name: &str) -> String {
    format!("{}__{}", subject_id, topic_name)
}
