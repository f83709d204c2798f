//! HTTP client for a text-generation inference endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::ResponseGenerator;
use crate::config::GeneratorConfig;

/// Reply shapes accepted from the endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationReply {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
    Chat { response: String },
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

impl GenerationReply {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Batch(items) => items.into_iter().next().map(|g| g.generated_text),
            Self::Single(g) => Some(g.generated_text),
            Self::Chat { response } => Some(response),
        }
    }
}

/// Posts `{"inputs": .., "parameters": {"max_length": ..}}` to a configured URL.
pub struct HttpGenerator {
    client: reqwest::Client,
    url: String,
    max_length: usize,
}

impl HttpGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        anyhow::ensure!(
            !config.url.is_empty(),
            "generator provider \"http\" requires generator.url"
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
            max_length: config.max_length,
        })
    }
}

#[async_trait]
impl ResponseGenerator for HttpGenerator {
    async fn generate(&self, user_input: &str) -> Result<String> {
        let body = serde_json::json!({
            "inputs": user_input,
            "parameters": { "max_length": self.max_length },
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("generation request to {} failed", self.url))?;

        anyhow::ensure!(
            response.status().is_success(),
            "generation endpoint returned HTTP {}",
            response.status()
        );

        let reply: GenerationReply = response
            .json()
            .await
            .context("unexpected generation response body")?;

        let text = reply
            .into_text()
            .context("generation response contained no text")?;
        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn spawn_endpoint(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/generate")
    }

    fn config(url: String) -> GeneratorConfig {
        GeneratorConfig {
            provider: "http".into(),
            url,
            timeout_secs: 5,
            ..GeneratorConfig::default()
        }
    }

    #[tokio::test]
    async fn parses_batch_reply_and_sends_input() {
        let router = Router::new().route(
            "/generate",
            post(|Json(body): Json<serde_json::Value>| async move {
                let input = body["inputs"].as_str().unwrap_or_default().to_string();
                let max_length = body["parameters"]["max_length"].as_u64().unwrap_or(0);
                Json(serde_json::json!([
                    { "generated_text": format!("  echo: {input} ({max_length})  ") }
                ]))
            }),
        );
        let generator = HttpGenerator::new(&config(spawn_endpoint(router).await)).unwrap();

        let reply = generator.generate("how are you").await.unwrap();
        assert_eq!(reply, "echo: how are you (600)");
    }

    #[tokio::test]
    async fn parses_chat_style_reply() {
        let router = Router::new().route(
            "/generate",
            post(|| async { Json(serde_json::json!({ "response": "I am fine." })) }),
        );
        let generator = HttpGenerator::new(&config(spawn_endpoint(router).await)).unwrap();
        assert_eq!(generator.generate("hi").await.unwrap(), "I am fine.");
    }

    #[tokio::test]
    async fn error_status_is_an_error() {
        let router = Router::new().route(
            "/generate",
            post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "loading") }),
        );
        let generator = HttpGenerator::new(&config(spawn_endpoint(router).await)).unwrap();
        assert!(generator.generate("hi").await.is_err());
    }

    #[tokio::test]
    async fn empty_batch_is_an_error() {
        let router = Router::new().route(
            "/generate",
            post(|| async { Json(serde_json::json!([])) }),
        );
        let generator = HttpGenerator::new(&config(spawn_endpoint(router).await)).unwrap();
        assert!(generator.generate("hi").await.is_err());
    }
}
