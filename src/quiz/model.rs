use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Grading key for numerical questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericalKey {
    pub final_answer: f64,
    #[serde(default)]
    pub tolerance: f64,
}

/// Grading key for assertion-reason questions. The correct option is one of
/// the four standard choices "A".."D".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionReasonKey {
    pub correct_option: String,
}

/// Grading key for fill-in-the-blank questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillBlankKey {
    pub answer: String,
}

/// A typed quiz question. The wire format is a tagged union on `type`, with
/// the grading fields optional: a variant missing its key is ungradeable and
/// the evaluator returns no verdict for it rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuizQuestion {
    #[serde(rename = "MCQ_SINGLE", rename_all = "camelCase")]
    McqSingle {
        id: String,
        question: String,
        #[serde(default)]
        options: Vec<String>,
        correct_option: Option<u32>,
    },
    #[serde(rename = "MCQ_MULTI", rename_all = "camelCase")]
    McqMulti {
        id: String,
        question: String,
        #[serde(default)]
        options: Vec<String>,
        correct_options: Option<Vec<u32>>,
    },
    #[serde(rename = "SHORT", rename_all = "camelCase")]
    Short {
        id: String,
        question: String,
        expected_keywords: Option<Vec<String>>,
    },
    #[serde(rename = "NUMERICAL", rename_all = "camelCase")]
    Numerical {
        id: String,
        question: String,
        numerical: Option<NumericalKey>,
    },
    #[serde(rename = "ASSERTION_REASON", rename_all = "camelCase")]
    AssertionReason {
        id: String,
        question: String,
        assertion_reason: Option<AssertionReasonKey>,
    },
    #[serde(rename = "FILL_BLANK", rename_all = "camelCase")]
    FillBlank {
        id: String,
        question: String,
        fill_blank: Option<FillBlankKey>,
    },
}

impl QuizQuestion {
    pub fn id(&self) -> &str {
        match self {
            QuizQuestion::McqSingle { id, .. }
            | QuizQuestion::McqMulti { id, .. }
            | QuizQuestion::Short { id, .. }
            | QuizQuestion::Numerical { id, .. }
            | QuizQuestion::AssertionReason { id, .. }
            | QuizQuestion::FillBlank { id, .. } => id,
        }
    }

    pub fn question(&self) -> &str {
        match self {
            QuizQuestion::McqSingle { question, .. }
            | QuizQuestion::McqMulti { question, .. }
            | QuizQuestion::Short { question, .. }
            | QuizQuestion::Numerical { question, .. }
            | QuizQuestion::AssertionReason { question, .. }
            | QuizQuestion::FillBlank { question, .. } => question,
        }
    }

    pub fn set_id(&mut self, new_id: String) {
        match self {
            QuizQuestion::McqSingle { id, .. }
            | QuizQuestion::McqMulti { id, .. }
            | QuizQuestion::Short { id, .. }
            | QuizQuestion::Numerical { id, .. }
            | QuizQuestion::AssertionReason { id, .. }
            | QuizQuestion::FillBlank { id, .. } => *id = new_id,
        }
    }
}

/// One stored answer, mirroring the answerable shapes. `SHORT`, `NUMERICAL`
/// and `FILL_BLANK` questions all answer through the `text` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerValue {
    McqSingle { value: Option<u32> },
    McqMulti { value: Vec<u32> },
    Text { value: String },
    AssertionReason { value: String },
}

/// The quiz shape the generation collaborator produces. Question ids are
/// unique within one payload (enforced after generation).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizPayload {
    pub questions: Vec<QuizQuestion>,
}

pub type AnswerMap = HashMap<String, AnswerValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeMode {
    Timed,
    Practice,
}

impl Default for TimeMode {
    fn default() -> Self {
        TimeMode::Practice
    }
}

/// Request shape handed to the quiz generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub user_id: String,
    pub subject_id: String,
    #[serde(default)]
    pub subject_name: Option<String>,
    pub topic: String,
    pub difficulty: Difficulty,
    pub time_mode: TimeMode,
    pub question_count: u32,
    pub exam_type: String,
    #[serde(default)]
    pub question_types: Vec<String>,
}
