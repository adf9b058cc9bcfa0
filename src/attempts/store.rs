use std::path::PathBuf;

use crate::attempts::{StoredQuizAttempt, MAX_ATTEMPTS};
use crate::storage::{data_dir, read_json_or_default, write_json};

const ATTEMPTS_FILE: &str = "attempts.json";

/// Append-only, bounded attempt log persisted as a single JSON array,
/// newest first.
///
/// Failure semantics: reads degrade to an empty list and writes are
/// swallowed after logging, so downstream statistics never crash the caller.
/// Callers must not assume persistence succeeded.
#[derive(Debug, Clone)]
pub struct AttemptStore {
    root: PathBuf,
}

impl AttemptStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AttemptStore { root: root.into() }
    }

    pub fn open_default() -> Self {
        Self::new(data_dir())
    }

    fn path(&self) -> PathBuf {
        self.root.join(ATTEMPTS_FILE)
    }

    /// Read the full attempt log, newest first. Any read or parse failure
    /// yields an empty list.
    pub async fn read_all(&self) -> Vec<StoredQuizAttempt> {
        let mut attempts: Vec<StoredQuizAttempt> = read_json_or_default(&self.path()).await;
        // Stored newest-first; re-sort defensively in case the file was
        // edited out of band.
        attempts.sort_by_key(|a| std::cmp::Reverse(a.created_at));
        attempts
    }

    /// Attempts for one user, newest first.
    pub async fn filter_by_user(&self, user_id: &str) -> Vec<StoredQuizAttempt> {
        self.read_all()
            .await
            .into_iter()
            .filter(|a| a.user_id == user_id)
            .collect()
    }

    /// Append an attempt, evicting the oldest entries beyond `MAX_ATTEMPTS`.
    /// A write failure is logged and swallowed.
    pub async fn append(&self, attempt: StoredQuizAttempt) {
        let mut attempts = self.read_all().await;
        attempts.insert(0, attempt);
        if attempts.len() > MAX_ATTEMPTS {
            attempts.truncate(MAX_ATTEMPTS);
        }

        if let Err(e) = write_json(&self.path(), &attempts).await {
            tracing::warn!(
                path = ?self.path(),
                error = %e,
                "Failed to persist attempt log, entry dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::{Difficulty, QuizPayload, TimeMode};
    use std::collections::HashMap;

    fn attempt(id: &str, created_at: i64) -> StoredQuizAttempt {
        StoredQuizAttempt {
            id: id.to_string(),
            created_at,
            user_id: "u1".to_string(),
            subject_id: "phys".to_string(),
            subject_name: None,
            topic_name: "Kinematics".to_string(),
            difficulty: Difficulty::Medium,
            time_mode: TimeMode::Practice,
            exam_type: "JEE".to_string(),
            question_count: 5,
            quiz: QuizPayload::default(),
            answers: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn append_caps_log_and_evicts_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttemptStore::new(dir.path());

        for i in 0..(MAX_ATTEMPTS as i64 + 1) {
            store.append(attempt(&format!("a{}", i), i)).await;
        }

        let all = store.read_all().await;
        assert_eq!(all.len(), MAX_ATTEMPTS);
        // Oldest entry (created_at 0) was evicted; newest is first.
        assert_eq!(all.first().unwrap().created_at, MAX_ATTEMPTS as i64);
        assert!(all.iter().all(|a| a.created_at > 0));
    }

    #[tokio::test]
    async fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttemptStore::new(dir.path());
        tokio::fs::write(dir.path().join(ATTEMPTS_FILE), "{not json")
            .await
            .unwrap();

        assert!(store.read_all().await.is_empty());

        // Appending over a corrupt file starts a fresh log.
        store.append(attempt("a1", 10)).await;
        assert_eq!(store.read_all().await.len(), 1);
    }

    #[tokio::test]
    async fn filter_by_user_matches_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttemptStore::new(dir.path());

        store.append(attempt("a1", 1)).await;
        let mut other = attempt("a2", 2);
        other.user_id = "u2".to_string();
        store.append(other).await;

        assert_eq!(store.filter_by_user("u1").await.len(), 1);
        assert_eq!(store.filter_by_user("u2").await.len(), 1);
        assert!(store.filter_by_user("nobody").await.is_empty());
    }
}
