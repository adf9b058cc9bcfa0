use std::path::PathBuf;

use crate::error::RevosError;
use crate::planner::RevisionPlan;
use crate::storage::{data_dir, write_json};

const PLAN_FILE: &str = "revision_plan.json";

/// Persists the current revision plan. Unlike the attempt and progress
/// stores there is no sensible default plan, so load returns `None` for a
/// missing file and a typed error for a corrupt one.
#[derive(Debug, Clone)]
pub struct PlanStore {
    root: PathBuf,
}

impl PlanStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PlanStore { root: root.into() }
    }

    pub fn open_default() -> Self {
        Self::new(data_dir())
    }

    fn path(&self) -> PathBuf {
        self.root.join(PLAN_FILE)
    }

    pub async fn save(&self, plan: &RevisionPlan) -> Result<(), RevosError> {
        write_json(&self.path(), plan).await
    }

    pub async fn load(&self) -> Result<Option<RevisionPlan>, RevosError> {
        let path = self.path();
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let plan = serde_json::from_str(&content)?;
                Ok(Some(plan))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::RevisionTask;

    #[tokio::test]
    async fn round_trips_a_plan() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(dir.path());

        assert!(store.load().await.unwrap().is_none());

        let plan = RevisionPlan {
            tasks: vec![RevisionTask::Review {
                topic_key: "s__T".into(),
                stage: 1,
            }],
            generated_at: 1,
            expires_at: 2,
        };
        store.save(&plan).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, plan);
    }

    #[tokio::test]
    async fn corrupt_plan_is_a_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        tokio::fs::write(dir.path().join(PLAN_FILE), "{oops")
            .await
            .unwrap();

        assert!(store.load().await.is_err());
    }
}
