use reqwest::blocking::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::QuoteConfig;
use crate::models::WeekData;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("API key not set (environment variable {0})")]
    MissingApiKey(String),
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("Unexpected response: {0}")]
    MalformedResponse(String),
    #[error("Empty quote in response")]
    Empty,
}

/// Something that can come up with a motivational line for a task list
pub trait QuoteSource {
    fn generate(&self, tasks: &[String]) -> Result<String, QuoteError>;
}

/// Prompt sent to the model; tasks are listed so the quote can reference them
pub fn build_prompt(tasks: &[String]) -> String {
    let focus = if tasks.is_empty() {
        "برنامه‌ریزی و پیشرفت".to_string()
    } else {
        tasks.iter().take(20).cloned().collect::<Vec<_>>().join("، ")
    };
    format!(
        "یک جمله انگیزشی کوتاه (حداکثر ۱۵ کلمه) به زبان فارسی بنویس برای کسی که این هفته روی این کارها تمرکز دارد: {}. فقط خود جمله را بدون گیومه برگردان.",
        focus
    )
}

/// `generateContent` client for Gemini-style endpoints
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client, reading the API key from the environment variable named in `config`
    pub fn from_config(config: &QuoteConfig) -> Result<Self, QuoteError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| QuoteError::MissingApiKey(config.api_key_env.clone()))?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl QuoteSource for GeminiClient {
    fn generate(&self, tasks: &[String]) -> Result<String, QuoteError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(tasks) }] }]
        });
        tracing::debug!(url = %self.url(), tasks = tasks.len(), "requesting quote");

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()?;
        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(QuoteError::HttpStatus { status: status.as_u16(), body: text });
        }

        let v: Value = serde_json::from_str(&text).map_err(|e| QuoteError::MalformedResponse(e.to_string()))?;
        extract_text(&v)
    }
}

/// Pull the first candidate's text out of a `generateContent` reply
pub fn extract_text(v: &Value) -> Result<String, QuoteError> {
    let text = v
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| QuoteError::MalformedResponse("missing candidates[0].content.parts[0].text".to_string()))?;
    let text = text.trim().trim_matches(|c| c == '"' || c == '«' || c == '»').trim();
    if text.is_empty() {
        Err(QuoteError::Empty)
    } else {
        Ok(text.to_string())
    }
}

/// Replace the week's quote with a freshly generated one
///
/// Returns false and leaves the quote alone when generation fails.
pub fn refresh_quote(data: &mut WeekData, source: &dyn QuoteSource) -> bool {
    match source.generate(&data.task_texts()) {
        Ok(quote) => {
            data.set_quote(quote);
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "quote generation failed, keeping current quote");
            false
        }
    }
}
