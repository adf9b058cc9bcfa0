use lru::LruCache;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use crate::attempts::store::AttemptStore;
use crate::cache::CachedResponse;
use crate::planner::store::PlanStore;
use crate::planner::RevisionPlan;
use crate::progress::store::ProgressStore;

const RECENT_QUESTION_HASHES: usize = 100;

/// Application-wide state container.
/// All mutable state is centralized here and passed explicitly to functions.
#[derive(Clone)]
pub struct AppState {
    pub attempts: AttemptStore,
    pub progress: ProgressStore,
    pub plans: PlanStore,
    /// Response cache (LRU with bounded size)
    pub response_cache: Arc<RwLock<LruCache<u64, CachedResponse>>>,
    /// Content hashes of recently generated questions, to reject repeats
    pub recent_question_hashes: Arc<RwLock<VecDeque<String>>>,
    /// In-memory copy of the current revision plan
    pub current_plan: Arc<RwLock<Option<RevisionPlan>>>,
}

impl AppState {
    /// State backed by the platform data directory.
    pub fn new() -> Self {
        Self {
            attempts: AttemptStore::open_default(),
            progress: ProgressStore::open_default(),
            plans: PlanStore::open_default(),
            response_cache: Arc::new(RwLock::new(LruCache::new(
                NonZeroUsize::new(200).expect("200 > 0"),
            ))),
            recent_question_hashes: Arc::new(RwLock::new(VecDeque::with_capacity(
                RECENT_QUESTION_HASHES,
            ))),
            current_plan: Arc::new(RwLock::new(None)),
        }
    }

    /// State backed by an explicit directory, used by tests.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            attempts: AttemptStore::new(root),
            progress: ProgressStore::new(root),
            plans: PlanStore::new(root),
            ..Self::new()
        }
    }

    /// Record a generated question's content hash, evicting the oldest.
    pub fn record_question_hash(&self, hash: String) {
        let mut recent = self.recent_question_hashes.write();
        recent.retain(|h| h != &hash);
        recent.push_front(hash);
        if recent.len() > RECENT_QUESTION_HASHES {
            recent.pop_back();
        }
    }

    pub fn has_question_hash(&self, hash: &str) -> bool {
        self.recent_question_hashes.read().iter().any(|h| h == hash)
    }

    pub fn set_current_plan(&self, plan: RevisionPlan) {
        *self.current_plan.write() = Some(plan);
    }

    pub fn get_current_plan(&self) -> Option<RevisionPlan> {
        self.current_plan.read().clone()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
