use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::RevosError;

/// Platform-specific application data directory.
/// Every persisted bucket (attempt log, revision progress, flashcard decks,
/// revision plan) lives under this root unless a store is constructed with an
/// explicit root (tests do that).
pub fn data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support/com.revos.app");
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push("com.revos.app");
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share/com.revos.app");
            return dir;
        }
    }

    // Fallback
    PathBuf::from("data")
}

/// Read a JSON bucket, degrading to `T::default()` on any failure.
/// A missing file is normal (first run); parse failures are logged and
/// treated as an empty bucket so statistics never crash the caller.
pub async fn read_json_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    match tokio::fs::read_to_string(path).await {
        Ok(text) => match serde_json::from_str::<T>(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    path = ?path,
                    error = %e,
                    "Failed to parse bucket, using defaults"
                );
                T::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => T::default(),
        Err(e) => {
            tracing::debug!(
                path = ?path,
                error = %e,
                "Failed to read bucket, using defaults"
            );
            T::default()
        }
    }
}

/// Write a JSON bucket, creating parent directories as needed.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RevosError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            RevosError::storage(format!("failed to create {:?}: {}", parent, e))
        })?;
    }

    let json = serde_json::to_string_pretty(value)?;

    tokio::fs::write(path, json)
        .await
        .map_err(|e| RevosError::storage(format!("failed to write {:?}: {}", path, e)))?;

    Ok(())
}
