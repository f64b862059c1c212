pub mod client;
pub mod gemini;

pub use client::AiClient;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    /// When set, the provider is asked for JSON output matching this schema.
    pub response_schema: Option<serde_json::Value>,
    /// Which assistant operation issued the call, e.g. `chat` or `quiz`.
    pub operation: &'static str,
}

impl GenerateRequest {
    pub fn text(operation: &'static str, prompt: String) -> Self {
        Self {
            prompt,
            response_schema: None,
            operation,
        }
    }

    pub fn structured(
        operation: &'static str,
        prompt: String,
        response_schema: serde_json::Value,
    ) -> Self {
        Self {
            response_schema: Some(response_schema),
            ..Self::text(operation, prompt)
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: String,
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    fn server_address(&self) -> &str {
        "unknown"
    }
}
