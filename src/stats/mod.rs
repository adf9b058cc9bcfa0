//! Fold the attempt log into per-topic and per-subject statistics.
//!
//! Everything here is a pure function of `(attempts, now)`: "focus time" is
//! a fixed per-question estimate (60 s timed, 45 s practice), not measured
//! wall-clock engagement, and no clock is consulted beyond the `now` passed
//! in. Statistics are always computed from a fully-read snapshot of the log.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::attempts::StoredQuizAttempt;
use crate::quiz::evaluator::evaluate;
use crate::quiz::model::TimeMode;

pub const TIMED_SEC_PER_QUESTION: i64 = 60;
pub const PRACTICE_SEC_PER_QUESTION: i64 = 45;

/// Estimated seconds spent on one attempt.
pub fn focus_seconds(attempt: &StoredQuizAttempt) -> i64 {
    let per_question = match attempt.time_mode {
        TimeMode::Timed => TIMED_SEC_PER_QUESTION,
        TimeMode::Practice => PRACTICE_SEC_PER_QUESTION,
    };
    attempt.question_count as i64 * per_question
}

/// `round(correct / total * 100)`, 0 when `total == 0`. Always in [0, 100].
pub fn accuracy(correct: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        ((correct as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Per-topic aggregates, keyed by `subjectId__topicName`.
/// `total` counts graded questions only (`correct + wrong`); skips are
/// tracked but excluded from the accuracy denominator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStats {
    pub total: u32,
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
    pub focus_seconds: i64,
    pub accuracy: u32,
    pub avg_sec_per_q: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowStats {
    pub total: u32,
    pub correct: u32,
    pub accuracy: u32,
}

/// Per-subject aggregates with a last-7-days vs previous-7-days accuracy
/// delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    #[serde(default)]
    pub subject_name: Option<String>,
    pub total: u32,
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
    pub focus_seconds: i64,
    pub accuracy: u32,
    pub last7: WindowStats,
    pub prev7: WindowStats,
    /// `last7.accuracy - prev7.accuracy`
    pub accuracy_delta: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub attempts: u32,
    pub total: u32,
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
    pub focus_seconds: i64,
    pub accuracy: u32,
}

/// One day in the 28-day focus heatmap. `date` is an ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayFocus {
    pub date: String,
    pub seconds: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub overall: OverallStats,
    pub by_subject: HashMap<String, SubjectStats>,
    pub by_topic: HashMap<String, TopicStats>,
    /// Last 28 calendar days, oldest first, zero-filled
    pub last28_days_focus: Vec<DayFocus>,
    /// Focus seconds grouped by ISO week, e.g. `2026-W11`
    pub weekly_focus: BTreeMap<String, i64>,
    /// Focus seconds grouped by `YYYY-MM`
    pub monthly_focus: BTreeMap<String, i64>,
    /// Consecutive days with at least one attempt, walking back from today
    pub streak: u32,
    /// Days out of the last 14 with zero attempts
    pub missed_last14: u32,
    /// Hour of day (0-23) with the most cumulative focus seconds
    pub best_hour: Option<u32>,
}

/// Verdict counts for a single attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptGrade {
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
}

/// Grade every question of one attempt against its stored answers.
/// Unanswered questions are skipped; an answered-but-ungradeable question
/// counts as wrong for aggregate purposes.
pub fn grade_attempt(attempt: &StoredQuizAttempt) -> AttemptGrade {
    let mut grade = AttemptGrade::default();
    for question in &attempt.quiz.questions {
        match attempt.answers.get(question.id()) {
            None => grade.skipped += 1,
            Some(answer) => match evaluate(question, Some(answer)) {
                Some(true) => grade.correct += 1,
                Some(false) | None => grade.wrong += 1,
            },
        }
    }
    grade
}

/// Fold an attempt snapshot (one user's attempts, newest first or not —
/// order does not matter) into a full statistics report.
pub fn compute_stats(attempts: &[StoredQuizAttempt], now: DateTime<Utc>) -> StatsReport {
    let mut report = StatsReport::default();
    let today = now.date_naive();

    let mut daily_focus: HashMap<chrono::NaiveDate, i64> = HashMap::new();
    let mut hour_focus: HashMap<u32, i64> = HashMap::new();
    let mut attempt_days: HashSet<chrono::NaiveDate> = HashSet::new();

    for attempt in attempts {
        let grade = grade_attempt(attempt);
        let focus = focus_seconds(attempt);
        let created = match Utc.timestamp_millis_opt(attempt.created_at).single() {
            Some(ts) => ts,
            None => {
                tracing::warn!(
                    attempt_id = %attempt.id,
                    created_at = attempt.created_at,
                    "Attempt has unusable timestamp, skipping from time series"
                );
                now
            }
        };
        let day = created.date_naive();
        attempt_days.insert(day);
        *daily_focus.entry(day).or_insert(0) += focus;
        *hour_focus.entry(created.hour()).or_insert(0) += focus;

        // Overall
        report.overall.attempts += 1;
        report.overall.correct += grade.correct;
        report.overall.wrong += grade.wrong;
        report.overall.skipped += grade.skipped;
        report.overall.focus_seconds += focus;

        // Per topic
        let topic = report
            .by_topic
            .entry(attempt.topic_key())
            .or_default();
        topic.correct += grade.correct;
        topic.wrong += grade.wrong;
        topic.skipped += grade.skipped;
        topic.focus_seconds += focus;

        // Per subject, with recency windows
        let subject = report
            .by_subject
            .entry(attempt.subject_id.clone())
            .or_default();
        if subject.subject_name.is_none() {
            subject.subject_name = attempt.subject_name.clone();
        }
        subject.correct += grade.correct;
        subject.wrong += grade.wrong;
        subject.skipped += grade.skipped;
        subject.focus_seconds += focus;

        let age_days = (now - created).num_days();
        let graded = grade.correct + grade.wrong;
        if (0..7).contains(&age_days) {
            subject.last7.total += graded;
            subject.last7.correct += grade.correct;
        } else if (7..14).contains(&age_days) {
            subject.prev7.total += graded;
            subject.prev7.correct += grade.correct;
        }

        // Weekly / monthly series
        let week = created.iso_week();
        *report
            .weekly_focus
            .entry(format!("{}-W{:02}", week.year(), week.week()))
            .or_insert(0) += focus;
        *report
            .monthly_focus
            .entry(format!("{:04}-{:02}", created.year(), created.month()))
            .or_insert(0) += focus;
    }

    // Derive accuracies once all counts are in
    report.overall.total = report.overall.correct + report.overall.wrong;
    report.overall.accuracy = accuracy(report.overall.correct, report.overall.total);

    for topic in report.by_topic.values_mut() {
        topic.total = topic.correct + topic.wrong;
        topic.accuracy = accuracy(topic.correct, topic.total);
        topic.avg_sec_per_q = if topic.total > 0 {
            topic.focus_seconds as f64 / topic.total as f64
        } else {
            0.0
        };
    }

    for subject in report.by_subject.values_mut() {
        subject.total = subject.correct + subject.wrong;
        subject.accuracy = accuracy(subject.correct, subject.total);
        subject.last7.accuracy = accuracy(subject.last7.correct, subject.last7.total);
        subject.prev7.accuracy = accuracy(subject.prev7.correct, subject.prev7.total);
        subject.accuracy_delta =
            subject.last7.accuracy as i32 - subject.prev7.accuracy as i32;
    }

    // 28-day heatmap, oldest first, zero-filled
    report.last28_days_focus = (0..28)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            DayFocus {
                date: date.format("%Y-%m-%d").to_string(),
                seconds: daily_focus.get(&date).copied().unwrap_or(0),
            }
        })
        .collect();

    // Streak: consecutive days with an attempt, stopping at the first gap
    let mut streak = 0u32;
    let mut cursor = today;
    while attempt_days.contains(&cursor) {
        streak += 1;
        cursor = cursor - Duration::days(1);
    }
    report.streak = streak;

    // Missed days in the 14-day window ending today
    report.missed_last14 = (0..14)
        .filter(|back| !attempt_days.contains(&(today - Duration::days(*back))))
        .count() as u32;

    report.best_hour = hour_focus
        .into_iter()
        .max_by_key(|(hour, seconds)| (*seconds, std::cmp::Reverse(*hour)))
        .map(|(hour, _)| hour);

    report
}
