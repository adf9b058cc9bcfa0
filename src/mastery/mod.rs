//! Classify topics into mastery bands and surface weak topics for revision.
//!
//! Mastery is accuracy discounted by coverage: a topic with few graded
//! questions cannot score high no matter how accurate, which keeps one lucky
//! quiz from marking a topic Strong.

use serde::{Deserialize, Serialize};

use crate::stats::TopicStats;

/// Topics with fewer graded questions than this are unclassified.
pub const MIN_SAMPLE: u32 = 3;

/// Graded questions needed for full coverage weight.
pub const FULL_COVERAGE_TOTAL: u32 = 20;

pub const STRONG_THRESHOLD: u32 = 75;
pub const AVERAGE_THRESHOLD: u32 = 45;

const WEAK_MIN_TOTAL: u32 = 5;
const WEAK_ACCURACY_BELOW: u32 = 60;
const SLOW_SEC_PER_Q: f64 = 60.0;
const HIGH_WRONG_COUNT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryBand {
    Strong,
    Average,
    Weak,
    /// Not enough graded questions to judge.
    Unclassified,
}

/// Which weak-topic rules fired, kept separately so the UI can explain
/// the flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakReasons {
    pub low_accuracy: bool,
    pub slow: bool,
    pub high_wrong: bool,
}

impl WeakReasons {
    pub fn any(&self) -> bool {
        self.low_accuracy || self.slow || self.high_wrong
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicMastery {
    pub topic_key: String,
    pub band: MasteryBand,
    /// `round(accuracy * coverage)`, in [0, 100]
    pub score: u32,
    pub accuracy: u32,
    pub total: u32,
    pub reasons: WeakReasons,
    /// Higher means more urgent; only meaningful when `reasons.any()`.
    pub priority: u32,
}

/// Coverage weight in [0, 1]: linear in graded questions up to
/// `FULL_COVERAGE_TOTAL`.
pub fn coverage(total: u32) -> f64 {
    (total as f64 / FULL_COVERAGE_TOTAL as f64).min(1.0)
}

pub fn mastery_score(stats: &TopicStats) -> u32 {
    (stats.accuracy as f64 * coverage(stats.total)).round() as u32
}

pub fn band_for(stats: &TopicStats) -> MasteryBand {
    if stats.total < MIN_SAMPLE {
        return MasteryBand::Unclassified;
    }
    let score = mastery_score(stats);
    if score >= STRONG_THRESHOLD {
        MasteryBand::Strong
    } else if score >= AVERAGE_THRESHOLD {
        MasteryBand::Average
    } else {
        MasteryBand::Weak
    }
}

/// Weak-topic rules. Accuracy and pace rules require a minimum sample of 5
/// graded questions; the wrong-count rule fires regardless of sample size.
/// Accuracy must be strictly below 60 to fire.
pub fn weak_reasons(stats: &TopicStats) -> WeakReasons {
    WeakReasons {
        low_accuracy: stats.total >= WEAK_MIN_TOTAL && stats.accuracy < WEAK_ACCURACY_BELOW,
        slow: stats.total >= WEAK_MIN_TOTAL && stats.avg_sec_per_q > SLOW_SEC_PER_Q,
        high_wrong: stats.wrong >= HIGH_WRONG_COUNT,
    }
}

/// Revision priority: accuracy gap plus fixed bumps for pace and wrong-count
/// flags.
pub fn priority(stats: &TopicStats, reasons: &WeakReasons) -> u32 {
    let mut p = 100 - stats.accuracy.min(100);
    if reasons.slow {
        p += 15;
    }
    if reasons.high_wrong {
        p += 20;
    }
    p
}

pub fn classify(topic_key: &str, stats: &TopicStats) -> TopicMastery {
    let reasons = weak_reasons(stats);
    TopicMastery {
        topic_key: topic_key.to_string(),
        band: band_for(stats),
        score: mastery_score(stats),
        accuracy: stats.accuracy,
        total: stats.total,
        reasons,
        priority: priority(stats, &reasons),
    }
}

/// Classify every topic in a stats map, returned sorted by priority
/// descending (key ascending to break ties deterministically).
pub fn classify_all<'a, I>(topics: I) -> Vec<TopicMastery>
where
    I: IntoIterator<Item = (&'a String, &'a TopicStats)>,
{
    let mut out: Vec<TopicMastery> = topics
        .into_iter()
        .map(|(key, stats)| classify(key, stats))
        .collect();
    out.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.topic_key.cmp(&b.topic_key))
    });
    out
}

/// Flagged weak topics only, most urgent first.
pub fn weak_topics<'a, I>(topics: I) -> Vec<TopicMastery>
where
    I: IntoIterator<Item = (&'a String, &'a TopicStats)>,
{
    classify_all(topics)
        .into_iter()
        .filter(|t| t.reasons.any())
        .collect()
}

/// Strong topics, highest score first.
pub fn strong_topics<'a, I>(topics: I) -> Vec<TopicMastery>
where
    I: IntoIterator<Item = (&'a String, &'a TopicStats)>,
{
    let mut out: Vec<TopicMastery> = topics
        .into_iter()
        .map(|(key, stats)| classify(key, stats))
        .filter(|t| t.band == MasteryBand::Strong)
        .collect();
    out.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.topic_key.cmp(&b.topic_key))
    });
    out
}
