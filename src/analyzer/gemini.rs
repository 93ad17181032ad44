//! Gemini API連携
//!
//! `generateContent` にプロンプト + インライン画像を送り、応答テキストを返す。
//! APIキーはこのプロセスだけが保持する（ブラウザには渡さない）

use async_trait::async_trait;
use doc_snap_common::{GenerativeModel, InlinePayload};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{DocSnapError, Result};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

fn build_request<'a>(
    prompt: &'a str,
    images: &'a [InlinePayload],
    temperature: f32,
) -> GeminiRequest<'a> {
    let mut parts = vec![Part::Text { text: prompt }];
    parts.extend(images.iter().map(|img| Part::InlineData {
        inline_data: InlineData {
            mime_type: &img.mime_type,
            data: &img.data,
        },
    }));

    GeminiRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig { temperature },
    }
}

/// 最初の候補のテキストパートを連結
fn extract_text(response: GeminiResponse) -> Result<String> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(DocSnapError::ApiParse("Empty response".into()));
    }
    Ok(text)
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let endpoint = format!("{}/{}:generateContent", GEMINI_API_BASE, config.model);
        Self::new(api_key, endpoint, config.temperature, config.timeout_seconds)
    }

    pub fn new(
        api_key: String,
        endpoint: String,
        temperature: f32,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| DocSnapError::ApiCall(format!("HTTPクライアント初期化失敗: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            endpoint,
            temperature,
        })
    }

    /// Gemini API呼び出し
    pub async fn call(&self, prompt: &str, images: &[InlinePayload]) -> Result<String> {
        let request = build_request(prompt, images, self.temperature);
        debug!(
            endpoint = %self.endpoint,
            prompt_len = prompt.len(),
            images = images.len(),
            "calling Gemini"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocSnapError::ApiCall(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Gemini returned an error");
            return Err(DocSnapError::ApiCall(format!("API error {}: {}", status, body)));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| DocSnapError::ApiParse(e.to_string()))?;

        let text = extract_text(payload)?;
        debug!(response_len = text.len(), "Gemini replied");
        Ok(text)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        _language: &str,
        images: &[InlinePayload],
    ) -> doc_snap_common::Result<String> {
        Ok(self.call(prompt, images).await?)
    }
}
