//! High-level operations stitched from the stores, the scorers and the
//! generation collaborator. This is the surface a frontend would bind to.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::attempts::StoredQuizAttempt;
use crate::error::RevosError;
use crate::llm::generate::{self, TopicPack};
use crate::mastery::{self, TopicMastery};
use crate::planner::{self, RevisionPlan};
use crate::progress::{FlashCard, RevisionProgress};
use crate::quiz::model::{AnswerMap, QuizPayload, QuizRequest};
use crate::scheduler::{self, Rating};
use crate::state::app::AppState;
use crate::stats::{self, StatsReport};

/// Verdict summary returned from a quiz submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub attempt_id: String,
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
    pub accuracy: u32,
}

/// Grade a finished quiz and record the attempt. Grading always succeeds;
/// persistence is best effort and a failed write only drops history.
pub async fn submit_quiz(
    state: &AppState,
    request: &QuizRequest,
    quiz: QuizPayload,
    answers: AnswerMap,
) -> SubmitOutcome {
    let now = Utc::now();
    let attempt = StoredQuizAttempt {
        id: format!("att_{}_{}", now.timestamp_millis(), request.user_id),
        created_at: now.timestamp_millis(),
        user_id: request.user_id.clone(),
        subject_id: request.subject_id.clone(),
        subject_name: request.subject_name.clone(),
        topic_name: request.topic.clone(),
        difficulty: request.difficulty,
        time_mode: request.time_mode,
        exam_type: request.exam_type.clone(),
        question_count: quiz.questions.len() as u32,
        quiz,
        answers,
    };

    let grade = stats::grade_attempt(&attempt);
    let outcome = SubmitOutcome {
        attempt_id: attempt.id.clone(),
        correct: grade.correct,
        wrong: grade.wrong,
        skipped: grade.skipped,
        accuracy: stats::accuracy(grade.correct, grade.correct + grade.wrong),
    };

    state.attempts.append(attempt).await;
    outcome
}

/// Full statistics for one user's dashboard.
pub async fn dashboard_stats(state: &AppState, user_id: &str) -> StatsReport {
    let attempts = state.attempts.filter_by_user(user_id).await;
    stats::compute_stats(&attempts, Utc::now())
}

/// Flagged weak topics for one user, most urgent first.
pub async fn weak_topics(state: &AppState, user_id: &str) -> Vec<TopicMastery> {
    let report = dashboard_stats(state, user_id).await;
    mastery::weak_topics(&report.by_topic)
}

/// Mastery classification for every topic the user has attempted.
pub async fn topic_mastery(state: &AppState, user_id: &str) -> Vec<TopicMastery> {
    let report = dashboard_stats(state, user_id).await;
    mastery::classify_all(&report.by_topic)
}

/// Record a revision of one topic: advance its stage, schedule the next
/// review and clear any deferral flag.
pub async fn mark_topic_revised(
    state: &AppState,
    topic_key: &str,
    rating: Rating,
) -> Result<RevisionProgress, RevosError> {
    let now = Utc::now();
    let updated = state
        .progress
        .update_progress(topic_key, |progress| {
            scheduler::apply_rating(progress, rating, now);
            progress.revise_later = false;
        })
        .await?;
    // Progress moved; any cached plan may now list stale reviews.
    *state.current_plan.write() = None;
    Ok(updated)
}

pub async fn set_revise_later(
    state: &AppState,
    topic_key: &str,
    flag: bool,
) -> Result<RevisionProgress, RevosError> {
    state
        .progress
        .update_progress(topic_key, |progress| progress.revise_later = flag)
        .await
}

pub async fn reset_topic_progress(state: &AppState, topic_key: &str) -> Result<(), RevosError> {
    state.progress.reset_progress(topic_key).await
}

/// Rate one flashcard in a topic's deck and persist the new schedule.
pub async fn rate_flashcard(
    state: &AppState,
    topic_key: &str,
    card_id: &str,
    rating: Rating,
) -> Result<FlashCard, RevosError> {
    let mut deck = state.progress.load_deck(topic_key).await;
    let card = deck
        .iter_mut()
        .find(|c| c.id == card_id)
        .ok_or_else(|| {
            RevosError::state(format!("No card '{}' in deck '{}'", card_id, topic_key))
        })?;
    scheduler::rate_card(card, rating, Utc::now());
    let updated = card.clone();
    state.progress.save_deck(topic_key, deck).await?;
    Ok(updated)
}

/// The topic's flashcard deck, generating and persisting one if none exists.
pub async fn flashcards_for_topic(
    state: &AppState,
    topic_key: &str,
    topic: &str,
    count: u32,
) -> Result<Vec<FlashCard>, RevosError> {
    let deck = state.progress.load_deck(topic_key).await;
    if !deck.is_empty() {
        return Ok(deck);
    }
    let deck = generate::generate_flashcards(topic, count).await?;
    state.progress.save_deck(topic_key, deck.clone()).await?;
    Ok(deck)
}

/// The current revision plan, regenerated when missing or expired.
pub async fn revision_session(
    state: &AppState,
    user_id: &str,
) -> Result<RevisionPlan, RevosError> {
    let now = Utc::now();

    if let Some(plan) = state.get_current_plan() {
        if !plan.is_expired(now) {
            return Ok(plan);
        }
    }

    match state.plans.load().await {
        Ok(Some(plan)) if !plan.is_expired(now) => {
            state.set_current_plan(plan.clone());
            return Ok(plan);
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Stored plan unreadable, regenerating");
        }
    }

    let progress = state.progress.load_progress().await;
    let report = dashboard_stats(state, user_id).await;
    let plan = planner::generate_plan(&progress, &report, now);
    state.plans.save(&plan).await?;
    state.set_current_plan(plan.clone());
    Ok(plan)
}

/// Generate a quiz via the collaborator model.
pub async fn generate_quiz(
    state: &AppState,
    request: &QuizRequest,
) -> Result<QuizPayload, RevosError> {
    generate::generate_quiz(state, request).await
}

pub async fn generate_topic_pack(
    state: &AppState,
    topic: &str,
    exam_type: &str,
) -> Result<TopicPack, RevosError> {
    generate::generate_topic_pack(state, topic, exam_type).await
}

pub async fn explain(
    state: &AppState,
    question: &str,
    correct_answer: &str,
    user_answer: Option<&str>,
) -> Result<String, RevosError> {
    generate::explain(state, question, correct_answer, user_answer).await
}
