//! Generative fallback used when the knowledge base has no match.
//!
//! Provides the [`ResponseGenerator`] trait, a fixed-message implementation,
//! and an HTTP client for a text-generation inference endpoint. The generator
//! is created via [`create_generator`] from configuration.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::GeneratorConfig;

/// Produces a free-form reply for input the knowledge base could not answer.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, user_input: &str) -> Result<String>;

    /// Short provider name for logs and status output.
    fn name(&self) -> &str;
}

/// Always answers with the same configured message.
#[derive(Debug, Clone)]
pub struct StaticGenerator {
    message: String,
}

impl StaticGenerator {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ResponseGenerator for StaticGenerator {
    async fn generate(&self, _user_input: &str) -> Result<String> {
        Ok(self.message.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Create a generator from config.
///
/// Supported providers: `"static"` and `"http"`.
pub fn create_generator(config: &GeneratorConfig) -> Result<Box<dyn ResponseGenerator>> {
    match config.provider.as_str() {
        "static" => Ok(Box::new(StaticGenerator::new(config.fallback_message.clone()))),
        "http" => Ok(Box::new(http::HttpGenerator::new(config)?)),
        other => anyhow::bail!("unknown generator provider: {other}. Supported: static, http"),
    }
}
