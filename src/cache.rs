use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::RevosError;
use crate::state::app::AppState;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CachedResponse {
    pub data: String,
    pub timestamp: i64,
}

/// Cache key from model name and prompt.
fn cache_key(model: &str, prompt: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    prompt.hash(&mut hasher);
    hasher.finish()
}

/// Look up a cached model response and deserialize it.
pub fn get_cached<T: for<'de> Deserialize<'de>>(
    state: &AppState,
    model: &str,
    prompt: &str,
) -> Option<T> {
    let key = cache_key(model, prompt);
    let cache = state.response_cache.read();

    if let Some(cached) = cache.peek(&key) {
        let preview: String = prompt.chars().take(50).collect();
        tracing::debug!(model, prompt_preview = %preview, "Cache hit");
        match serde_json::from_str::<T>(&cached.data) {
            Ok(parsed) => return Some(parsed),
            Err(e) => {
                tracing::warn!(model, error = %e, "Failed to parse cached response");
            }
        }
    }
    None
}

/// Store a model response in the cache.
pub fn cache_response<T: Serialize>(
    state: &AppState,
    model: &str,
    prompt: &str,
    response: &T,
) -> Result<(), RevosError> {
    let key = cache_key(model, prompt);
    let data = serde_json::to_string(response)?;
    let cached = CachedResponse {
        data,
        timestamp: chrono::Utc::now().timestamp(),
    };
    state.response_cache.write().put(key, cached);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn caches_and_returns_typed_responses() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::with_root(dir.path());

        let miss: Option<Vec<u32>> = get_cached(&state, "m", "p");
        assert!(miss.is_none());

        cache_response(&state, "m", "p", &vec![1u32, 2, 3]).unwrap();
        let hit: Option<Vec<u32>> = get_cached(&state, "m", "p");
        assert_eq!(hit, Some(vec![1, 2, 3]));

        // Different prompt, different key.
        let other: Option<Vec<u32>> = get_cached(&state, "m", "q");
        assert!(other.is_none());
    }
}
