//! Build the daily revision plan from due reviews and weak topics.

pub mod store;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::mastery::{self, TopicMastery};
use crate::progress::store::ProgressMap;
use crate::stats::StatsReport;

/// How many weak-topic drills a plan carries on top of due reviews.
const MAX_WEAK_TASKS: usize = 3;

const PLAN_TTL_HOURS: i64 = 24;

/// One directive in a daily plan, keyed by `subjectId__topicName`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevisionTask {
    /// Spaced review that has come due.
    Review { topic_key: String, stage: u8 },
    /// Extra drill on a flagged weak topic.
    Drill { topic_key: String, priority: u32 },
}

impl RevisionTask {
    pub fn topic_key(&self) -> &str {
        match self {
            RevisionTask::Review { topic_key, .. } => topic_key,
            RevisionTask::Drill { topic_key, .. } => topic_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionPlan {
    pub tasks: Vec<RevisionTask>,
    /// Epoch milliseconds
    pub generated_at: i64,
    pub expires_at: i64,
}

impl RevisionPlan {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() > self.expires_at
    }
}

/// Topics whose next review is due at or before `now`, plus topics the user
/// marked "revise later". Never-reviewed topics have no due date and are not
/// listed here.
pub fn due_topics(progress: &ProgressMap, now: DateTime<Utc>) -> Vec<(String, u8)> {
    let now_ms = now.timestamp_millis();
    let mut due: Vec<(String, u8)> = progress
        .iter()
        .filter(|(_, p)| {
            p.revise_later || p.next_review_at.map(|at| at <= now_ms).unwrap_or(false)
        })
        .map(|(key, p)| (key.clone(), p.stage))
        .collect();
    // Lowest stage first: the least-consolidated material leads the plan.
    due.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    due
}

/// Assemble a plan: every due review, then up to `MAX_WEAK_TASKS` weak-topic
/// drills not already covered by a review. Equal-priority drills are
/// shuffled so repeated regenerations rotate through them.
pub fn generate_plan(
    progress: &ProgressMap,
    stats: &StatsReport,
    now: DateTime<Utc>,
) -> RevisionPlan {
    let due = due_topics(progress, now);
    let mut tasks: Vec<RevisionTask> = due
        .iter()
        .map(|(key, stage)| RevisionTask::Review {
            topic_key: key.clone(),
            stage: *stage,
        })
        .collect();

    let mut weak: Vec<TopicMastery> = mastery::weak_topics(&stats.by_topic)
        .into_iter()
        .filter(|t| !due.iter().any(|(key, _)| key == &t.topic_key))
        .collect();

    let mut rng = rand::thread_rng();
    weak.shuffle(&mut rng);
    weak.sort_by(|a, b| b.priority.cmp(&a.priority));

    for t in weak.into_iter().take(MAX_WEAK_TASKS) {
        tasks.push(RevisionTask::Drill {
            topic_key: t.topic_key,
            priority: t.priority,
        });
    }

    RevisionPlan {
        tasks,
        generated_at: now.timestamp_millis(),
        expires_at: (now + Duration::hours(PLAN_TTL_HOURS)).timestamp_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RevisionProgress;
    use crate::stats::TopicStats;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn progress(stage: u8, next_review_at: Option<i64>, revise_later: bool) -> RevisionProgress {
        RevisionProgress {
            last_revised_at: None,
            stage,
            next_review_at,
            revise_later,
        }
    }

    fn weak_stats() -> TopicStats {
        TopicStats {
            total: 10,
            correct: 2,
            wrong: 8,
            skipped: 0,
            focus_seconds: 450,
            accuracy: 20,
            avg_sec_per_q: 45.0,
        }
    }

    #[test]
    fn due_includes_overdue_and_revise_later_only() {
        let past = now().timestamp_millis() - 1;
        let future = now().timestamp_millis() + 1;
        let mut map = ProgressMap::new();
        map.insert("s__Due".into(), progress(2, Some(past), false));
        map.insert("s__Later".into(), progress(0, Some(future), true));
        map.insert("s__NotYet".into(), progress(1, Some(future), false));
        map.insert("s__Never".into(), progress(0, None, false));

        let due = due_topics(&map, now());
        let keys: Vec<&str> = due.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["s__Later", "s__Due"]);
    }

    #[test]
    fn plan_mixes_reviews_with_capped_drills() {
        let past = now().timestamp_millis() - 1;
        let mut map = ProgressMap::new();
        map.insert("s__Due".into(), progress(1, Some(past), false));

        let mut stats = StatsReport::default();
        for name in ["s__W1", "s__W2", "s__W3", "s__W4"] {
            stats.by_topic.insert(name.into(), weak_stats());
        }

        let plan = generate_plan(&map, &stats, now());
        let reviews = plan
            .tasks
            .iter()
            .filter(|t| matches!(t, RevisionTask::Review { .. }))
            .count();
        let drills = plan
            .tasks
            .iter()
            .filter(|t| matches!(t, RevisionTask::Drill { .. }))
            .count();
        assert_eq!(reviews, 1);
        assert_eq!(drills, 3);
    }

    #[test]
    fn due_topic_is_not_duplicated_as_drill() {
        let past = now().timestamp_millis() - 1;
        let mut map = ProgressMap::new();
        map.insert("s__Both".into(), progress(0, Some(past), false));

        let mut stats = StatsReport::default();
        stats.by_topic.insert("s__Both".into(), weak_stats());

        let plan = generate_plan(&map, &stats, now());
        assert_eq!(plan.tasks.len(), 1);
        assert!(matches!(&plan.tasks[0], RevisionTask::Review { .. }));
    }

    #[test]
    fn plan_expires_after_a_day() {
        let plan = generate_plan(&ProgressMap::new(), &StatsReport::default(), now());
        assert!(!plan.is_expired(now()));
        assert!(!plan.is_expired(now() + Duration::hours(24)));
        assert!(plan.is_expired(now() + Duration::hours(24) + Duration::seconds(1)));
    }

    #[test]
    fn healthy_topics_produce_no_drills() {
        let mut stats = StatsReport::default();
        stats.by_topic.insert(
            "s__Fine".into(),
            TopicStats {
                total: 20,
                correct: 18,
                wrong: 2,
                skipped: 0,
                focus_seconds: 900,
                accuracy: 90,
                avg_sec_per_q: 45.0,
            },
        );
        let plan = generate_plan(&ProgressMap::new(), &stats, now());
        assert!(plan.tasks.is_empty());
    }
}
