//! Google Gemini `generateContent` provider.

use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{GenerateRequest, GenerateResponse, Provider};

pub struct GeminiProvider {
    client: reqwest::Client,
    api_base: String,
    model: String,
    server_address: String,
}

impl GeminiProvider {
    pub fn new(api_key: &str, api_base: &str, model: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| anyhow::anyhow!("invalid API key header: {e}"))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let api_base = api_base.trim_end_matches('/').to_string();
        let server_address = reqwest::Url::parse(&api_base)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self {
            client,
            api_base,
            model: model.to_string(),
            server_address,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

fn build_request(req: &GenerateRequest) -> GenerateContentRequest {
    let generation_config = req.response_schema.as_ref().map(|schema| GenerationConfig {
        response_mime_type: "application/json".to_string(),
        response_schema: schema.clone(),
    });

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(req.prompt.clone()),
            }],
        }],
        generation_config,
    }
}

fn into_response(resp: GenerateContentResponse, model: &str) -> anyhow::Result<GenerateResponse> {
    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Gemini returned no candidates"))?;

    let content = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let finish_reason = candidate.finish_reason.unwrap_or_default();

    if content.is_empty() {
        return Err(anyhow::anyhow!(
            "Gemini returned no text (finish reason: {})",
            if finish_reason.is_empty() { "unknown" } else { finish_reason.as_str() }
        ));
    }

    let usage = resp.usage_metadata.unwrap_or_default();

    Ok(GenerateResponse {
        content,
        model: resp.model_version.unwrap_or_else(|| model.to_string()),
        input_tokens: usage.prompt_token_count,
        output_tokens: usage.candidates_token_count,
        finish_reason: finish_reason.to_lowercase(),
    })
}

#[async_trait::async_trait]
impl Provider for GeminiProvider {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let body = build_request(req);

        tracing::debug!(
            model = %self.model,
            prompt_len = req.prompt.len(),
            structured = req.response_schema.is_some(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if let Ok(err) = serde_json::from_str::<GeminiError>(&error_body) {
                return Err(anyhow::anyhow!(
                    "Gemini API error ({}): {}",
                    status,
                    err.error.message
                ));
            }
            return Err(anyhow::anyhow!("Gemini API error ({}): {}", status, error_body));
        }

        let resp: GenerateContentResponse = response.json().await?;

        into_response(resp, &self.model)
    }

    fn name(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn server_address(&self) -> &str {
        &self.server_address
    }
}
