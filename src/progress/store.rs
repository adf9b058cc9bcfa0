use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::RevosError;
use crate::progress::{FlashCard, RevisionProgress};
use crate::storage::{data_dir, read_json_or_default, write_json};

const PROGRESS_FILE: &str = "revision_progress.json";
const DECKS_FILE: &str = "flashcards.json";

pub type ProgressMap = HashMap<String, RevisionProgress>;
pub type DeckMap = HashMap<String, Vec<FlashCard>>;

/// Persisted revision progress and flashcard decks, both JSON maps keyed by
/// `subjectId__topicName`. Reads degrade to empty maps; writes return typed
/// errors and the api layer decides whether they are fatal.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    root: PathBuf,
}

impl ProgressStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ProgressStore { root: root.into() }
    }

    pub fn open_default() -> Self {
        Self::new(data_dir())
    }

    fn progress_path(&self) -> PathBuf {
        self.root.join(PROGRESS_FILE)
    }

    fn decks_path(&self) -> PathBuf {
        self.root.join(DECKS_FILE)
    }

    pub async fn load_progress(&self) -> ProgressMap {
        let mut map: ProgressMap = read_json_or_default(&self.progress_path()).await;
        // Stage invariant: clamp anything out of range that snuck into the file.
        for progress in map.values_mut() {
            progress.stage = progress.stage.min(crate::scheduler::MAX_STAGE);
        }
        map
    }

    pub async fn save_progress(&self, map: &ProgressMap) -> Result<(), RevosError> {
        write_json(&self.progress_path(), map).await
    }

    /// Read-modify-write a single topic's progress entry.
    pub async fn update_progress<F>(&self, key: &str, f: F) -> Result<RevisionProgress, RevosError>
    where
        F: FnOnce(&mut RevisionProgress),
    {
        let mut map = self.load_progress().await;
        let entry = map.entry(key.to_string()).or_default();
        f(entry);
        let updated = entry.clone();
        self.save_progress(&map).await?;
        Ok(updated)
    }

    pub async fn load_decks(&self) -> DeckMap {
        read_json_or_default(&self.decks_path()).await
    }

    pub async fn load_deck(&self, key: &str) -> Vec<FlashCard> {
        self.load_decks().await.remove(key).unwrap_or_default()
    }

    pub async fn save_deck(&self, key: &str, deck: Vec<FlashCard>) -> Result<(), RevosError> {
        let mut decks = self.load_decks().await;
        decks.insert(key.to_string(), deck);
        write_json(&self.decks_path(), &decks).await
    }

    /// Explicit reset: drop one topic's progress entry.
    pub async fn reset_progress(&self, key: &str) -> Result<(), RevosError> {
        let mut map = self.load_progress().await;
        if map.remove(key).is_some() {
            self.save_progress(&map).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_progress_creates_default_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());

        let updated = store
            .update_progress("phys__Kinematics", |p| {
                p.stage = 2;
                p.revise_later = true;
            })
            .await
            .unwrap();

        assert_eq!(updated.stage, 2);
        assert!(updated.revise_later);

        let map = store.load_progress().await;
        assert_eq!(map.len(), 1);
        assert_eq!(map["phys__Kinematics"].stage, 2);
    }

    #[tokio::test]
    async fn out_of_range_stage_is_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());
        tokio::fs::write(
            dir.path().join(PROGRESS_FILE),
            r#"{"k": {"stage": 9, "reviseLater": false}}"#,
        )
        .await
        .unwrap();

        let map = store.load_progress().await;
        assert_eq!(map["k"].stage, crate::scheduler::MAX_STAGE);
    }

    #[tokio::test]
    async fn decks_are_isolated_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());

        let card = FlashCard {
            id: "c1".to_string(),
            front: "F = ?".to_string(),
            back: "ma".to_string(),
            stage: 0,
            next_review_at: None,
        };
        store.save_deck("phys__Laws", vec![card]).await.unwrap();

        assert_eq!(store.load_deck("phys__Laws").await.len(), 1);
        assert!(store.load_deck("phys__Other").await.is_empty());
    }
}
