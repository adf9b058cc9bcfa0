use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::storage::data_dir;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model used to generate quizzes and flashcard decks
    pub quiz_model: String,
    /// Model used for topic packs and free-text explanations
    pub tutor_model: String,
    /// Ollama-compatible generate endpoint
    pub endpoint: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            quiz_model: "qwen2.5:7b-instruct".to_string(),
            tutor_model: "llama3.1:8b".to_string(),
            endpoint: "http://localhost:11434/api/generate".to_string(),
        }
    }
}

fn load_model_config_internal() -> ModelConfig {
    let config_path = data_dir().join("models.toml");

    if let Ok(content) = fs::read_to_string(&config_path) {
        match toml::from_str::<ModelConfig>(&content) {
            Ok(config) => {
                tracing::info!(path = ?config_path, "Loaded model config");
                return config;
            }
            Err(e) => {
                tracing::warn!(
                    path = ?config_path,
                    error = %e,
                    "Failed to parse models.toml, using defaults"
                );
            }
        }
    }

    ModelConfig::default()
}

lazy_static! {
    static ref MODEL_CONFIG: ModelConfig = load_model_config_internal();
}

/// Get the cached model configuration (loaded once at startup)
pub fn get_model_config() -> &'static ModelConfig {
    &MODEL_CONFIG
}
