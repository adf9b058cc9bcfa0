//! Prompt construction and post-processing for the generation collaborator.
//!
//! Model output is never trusted: quizzes are re-identified, stamped with
//! the requested shape, deduplicated against recent generations and only
//! then handed to callers.

use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::cache;
use crate::config::get_model_config;
use crate::error::RevosError;
use crate::llm::client;
use crate::progress::FlashCard;
use crate::quiz::model::{Difficulty, QuizPayload, QuizRequest};
use crate::state::app::AppState;

/// Content hash used for duplicate detection across generations.
pub fn hash_question(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn difficulty_label(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
    }
}

fn build_quiz_prompt(request: &QuizRequest) -> String {
    let types = if request.question_types.is_empty() {
        "MCQ_SINGLE".to_string()
    } else {
        request.question_types.join(", ")
    };

    format!(
        r#"Generate a {difficulty} quiz with exactly {count} questions on the topic "{topic}" for {exam} preparation.

Allowed question types: {types}.

Return ONLY valid JSON in this schema:

{{
  "questions": [
    {{
      "type": "MCQ_SINGLE",
      "id": "q1",
      "question": "...",
      "options": ["...", "...", "...", "..."],
      "correctOption": 0
    }}
  ]
}}

Field requirements per type:
- MCQ_SINGLE: "options" (4 strings) and "correctOption" (0-based index)
- MCQ_MULTI: "options" and "correctOptions" (array of 0-based indices)
- SHORT: "expectedKeywords" (array of strings a correct answer must mention)
- NUMERICAL: "numerical": {{"finalAnswer": <number>, "tolerance": <number>}}
- ASSERTION_REASON: "assertionReason": {{"correctOption": "A".."D"}}
- FILL_BLANK: "fillBlank": {{"answer": "..."}}

Rules:
- Every question must be self-contained and unambiguous
- Use only the allowed question types
- Output only valid JSON, no markdown or extra text

Generate the quiz now:"#,
        difficulty = difficulty_label(request.difficulty),
        count = request.question_count,
        topic = request.topic,
        exam = request.exam_type,
        types = types,
    )
}

/// Generate a quiz for a request. Cached per (model, prompt); questions the
/// model repeats from recent generations are dropped and the quiz is
/// rejected if too few survive.
pub async fn generate_quiz(
    state: &AppState,
    request: &QuizRequest,
) -> Result<QuizPayload, RevosError> {
    let model = get_model_config().quiz_model.as_str();
    let prompt = build_quiz_prompt(request);

    if let Some(cached) = cache::get_cached::<QuizPayload>(state, model, &prompt) {
        return Ok(cached);
    }

    let mut payload: QuizPayload = client::call_model_json(model, &prompt).await?;

    if payload.questions.is_empty() {
        return Err(RevosError::generation(model, "Quiz came back with no questions"));
    }

    // Re-assign ids: model-provided ids collide often enough to break the
    // answer map.
    let stamp = Utc::now().timestamp_millis();
    for (i, question) in payload.questions.iter_mut().enumerate() {
        question.set_id(format!("q_{}_{}", stamp, i + 1));
    }

    let before = payload.questions.len();
    payload
        .questions
        .retain(|q| !state.has_question_hash(&hash_question(q.question())));
    let dropped = before - payload.questions.len();
    if dropped > 0 {
        tracing::info!(model, dropped, "Dropped repeated questions from generated quiz");
    }
    if payload.questions.len() < (request.question_count as usize).div_ceil(2) {
        return Err(RevosError::generation(
            model,
            "Too many repeated questions in generated quiz",
        ));
    }

    for question in &payload.questions {
        state.record_question_hash(hash_question(question.question()));
    }

    if let Err(e) = cache::cache_response(state, model, &prompt, &payload) {
        tracing::warn!(error = %e, "Failed to cache generated quiz");
    }
    Ok(payload)
}

/// Condensed study material for one topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPack {
    #[serde(default)]
    pub core_concept: String,
    #[serde(default)]
    pub formulas: Vec<String>,
    #[serde(default)]
    pub common_mistakes: Vec<String>,
    #[serde(default)]
    pub rapid_questions: Vec<String>,
}

pub async fn generate_topic_pack(
    state: &AppState,
    topic: &str,
    exam_type: &str,
) -> Result<TopicPack, RevosError> {
    let model = get_model_config().tutor_model.as_str();
    let prompt = format!(
        r#"Create a revision pack for the topic "{topic}" ({exam_type} preparation).

Return ONLY valid JSON:
{{
  "coreConcept": "2-3 sentence summary of the central idea",
  "formulas": ["key formula or fact", ...],
  "commonMistakes": ["mistake students make", ...],
  "rapidQuestions": ["short recall question", ...]
}}

Keep each list to at most 5 entries. Output only valid JSON."#,
    );

    if let Some(cached) = cache::get_cached::<TopicPack>(state, model, &prompt) {
        return Ok(cached);
    }

    let pack: TopicPack = client::call_model_json(model, &prompt).await?;
    if pack.core_concept.is_empty() {
        return Err(RevosError::generation(model, "Topic pack missing core concept"));
    }

    if let Err(e) = cache::cache_response(state, model, &prompt, &pack) {
        tracing::warn!(error = %e, "Failed to cache topic pack");
    }
    Ok(pack)
}

/// Plain-text explanation of why an answer is right or wrong.
pub async fn explain(
    state: &AppState,
    question: &str,
    correct_answer: &str,
    user_answer: Option<&str>,
) -> Result<String, RevosError> {
    let model = get_model_config().tutor_model.as_str();
    let user_part = match user_answer {
        Some(given) => format!("The student answered: {given}\n"),
        None => String::new(),
    };
    let prompt = format!(
        "Explain the following question to a student in at most 4 sentences.\n\
         Question: {question}\n\
         Correct answer: {correct_answer}\n\
         {user_part}\
         Explain the reasoning, and if the student's answer is wrong, point out the mistake. Plain text only."
    );

    if let Some(cached) = cache::get_cached::<String>(state, model, &prompt) {
        return Ok(cached);
    }

    let text = client::call_model(model, &prompt).await?;
    let text = text.trim().to_string();
    if let Err(e) = cache::cache_response(state, model, &prompt, &text) {
        tracing::warn!(error = %e, "Failed to cache explanation");
    }
    Ok(text)
}

#[derive(Debug, Deserialize)]
struct RawCard {
    front: String,
    back: String,
}

/// Generate a fresh flashcard deck for a topic. Cards start at stage 0 with
/// no due date; ids are assigned locally.
pub async fn generate_flashcards(topic: &str, count: u32) -> Result<Vec<FlashCard>, RevosError> {
    let model = get_model_config().tutor_model.as_str();
    let prompt = format!(
        r#"Create {count} flashcards for the topic "{topic}".

Return ONLY a valid JSON array:
[{{"front": "prompt side", "back": "answer side"}}, ...]

Fronts must be answerable from memory in one line. Output only valid JSON."#,
    );

    let raw: Vec<RawCard> = client::call_model_json(model, &prompt).await?;
    if raw.is_empty() {
        return Err(RevosError::generation(model, "Model returned no flashcards"));
    }

    let stamp = Utc::now().timestamp_millis();
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, card)| FlashCard {
            id: format!("card_{}_{}", stamp, i + 1),
            front: card.front,
            back: card.back,
            stage: 0,
            next_review_at: None,
        })
        .collect())
}
