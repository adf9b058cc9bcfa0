use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::OnceLock;
use tokio::time::{timeout, Duration};

use crate::config::get_model_config;
use crate::error::RevosError;
use crate::llm::json_utils;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Shared HTTP client, created once.
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

fn http_client() -> &'static Client {
    HTTP_CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to create HTTP client")
    })
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateChunk {
    response: String,
    #[serde(default)]
    done: bool,
}

/// Call a local model and return the assembled response text.
pub async fn call_model(model: &str, prompt: &str) -> Result<String, RevosError> {
    call_model_with_timeout(model, prompt, Duration::from_secs(DEFAULT_TIMEOUT_SECS)).await
}

pub async fn call_model_with_timeout(
    model: &str,
    prompt: &str,
    timeout_duration: Duration,
) -> Result<String, RevosError> {
    let start = std::time::Instant::now();
    let endpoint = get_model_config().endpoint.as_str();

    let result = timeout(timeout_duration, async {
        let response = http_client()
            .post(endpoint)
            .json(&GenerateRequest {
                model,
                prompt,
                stream: true,
            })
            .send()
            .await
            .map_err(|e| {
                RevosError::generation(model, format!("Request to {} failed: {}", endpoint, e))
            })?;

        let text = response.text().await.map_err(|e| {
            RevosError::generation(model, format!("Failed to read response body: {}", e))
        })?;

        // Streaming responses arrive as one JSON object per line.
        let mut full_response = String::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(chunk) = serde_json::from_str::<GenerateChunk>(line) {
                full_response.push_str(&chunk.response);
                if chunk.done {
                    break;
                }
            }
        }

        if full_response.is_empty() {
            return Err(RevosError::generation(model, "Model returned empty response"));
        }
        Ok(full_response)
    })
    .await;

    let latency_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(Ok(response)) => {
            tracing::info!(model, latency_ms, "Model call succeeded");
            Ok(response)
        }
        Ok(Err(e)) => {
            tracing::warn!(model, latency_ms, error = %e, "Model call failed");
            Err(e)
        }
        Err(elapsed) => {
            tracing::warn!(
                model,
                timeout_secs = timeout_duration.as_secs(),
                "Model call timed out"
            );
            Err(RevosError::Timeout(elapsed))
        }
    }
}

/// Call a model and parse its output as JSON into `T`, tolerating fences
/// and surrounding prose.
pub async fn call_model_json<T: DeserializeOwned>(
    model: &str,
    prompt: &str,
) -> Result<T, RevosError> {
    call_model_json_with_timeout(model, prompt, Duration::from_secs(DEFAULT_TIMEOUT_SECS)).await
}

pub async fn call_model_json_with_timeout<T: DeserializeOwned>(
    model: &str,
    prompt: &str,
    timeout_duration: Duration,
) -> Result<T, RevosError> {
    let raw = call_model_with_timeout(model, prompt, timeout_duration).await?;
    let json_str = json_utils::extract_json(&raw)?;
    serde_json::from_str(&json_str).map_err(|e| {
        RevosError::generation(
            model,
            format!("Response JSON did not match expected shape: {}", e),
        )
    })
}
