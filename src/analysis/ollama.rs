//! Ollama `/api/generate` client.

use super::AnalysisBackend;
use crate::config::AnalysisSettings;
use crate::error::{Result, ShortsError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Blocking-style (non-streaming) Ollama client with a request timeout.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShortsError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Result<Self> {
        Self::new(
            &settings.base_url,
            &settings.model,
            Duration::from_secs(settings.timeout_seconds),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check that the server answers at all.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(self.endpoint("/api/tags"))
            .send()
            .await
            .map_err(|e| ShortsError::AnalysisBackend(format!("Cannot reach {}: {}", self.base_url, e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ShortsError::AnalysisBackend(format!(
                "{} returned status {}",
                self.base_url,
                response.status()
            )))
        }
    }
}

#[async_trait]
impl AnalysisBackend for OllamaBackend {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint("/api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ShortsError::AnalysisBackend(format!("Request timed out: {}", e))
                } else {
                    ShortsError::AnalysisBackend(format!(
                        "Cannot reach {}. Is the service running? ({})",
                        self.base_url, e
                    ))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShortsError::AnalysisBackend(format!(
                "Backend returned status {}",
                status
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            ShortsError::AnalysisBackend(format!("Malformed backend response: {}", e))
        })?;

        debug!("Backend answered with {} chars", body.response.len());
        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_generate_returns_response_text() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["model"], "llama3.2");
                assert_eq!(body["stream"], false);
                let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
                Json(serde_json::json!({ "response": format!("echo: {}", prompt), "done": true }))
            }),
        );
        let base_url = serve(app).await;

        let backend = OllamaBackend::new(&base_url, "llama3.2", Duration::from_secs(5)).unwrap();
        let answer = backend.generate("hello").await.unwrap();
        assert_eq!(answer, "echo: hello");
    }

    #[tokio::test]
    async fn test_non_success_status_is_backend_error() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
        );
        let base_url = serve(app).await;

        let backend = OllamaBackend::new(&base_url, "m", Duration::from_secs(5)).unwrap();
        let result = backend.generate("hello").await;
        assert!(matches!(result, Err(ShortsError::AnalysisBackend(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_backend_error() {
        let app = Router::new().route("/api/generate", post(|| async { "not json" }));
        let base_url = serve(app).await;

        let backend = OllamaBackend::new(&base_url, "m", Duration::from_secs(5)).unwrap();
        assert!(matches!(
            backend.generate("hello").await,
            Err(ShortsError::AnalysisBackend(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_backend_error() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let base_url = serve(app).await;

        let backend = OllamaBackend::new(&base_url, "m", Duration::from_millis(200)).unwrap();
        assert!(matches!(
            backend.generate("hello").await,
            Err(ShortsError::AnalysisBackend(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_is_backend_error() {
        // Bind and drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend =
            OllamaBackend::new(&format!("http://{}", addr), "m", Duration::from_secs(2)).unwrap();
        assert!(matches!(
            backend.generate("hello").await,
            Err(ShortsError::AnalysisBackend(_))
        ));
        assert!(backend.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_ping() {
        let app = Router::new().route("/api/tags", get(|| async { Json(serde_json::json!({"models": []})) }));
        let base_url = serve(app).await;

        let backend = OllamaBackend::new(&format!("{}/", base_url), "m", Duration::from_secs(5)).unwrap();
        assert!(backend.ping().await.is_ok());
    }
}
