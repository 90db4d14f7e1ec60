//! Gemini question answering over one scraped record.

use anyhow::{Result, anyhow};
use serde_json::json;
use tracing::{info, warn};

use prodsift_config::LlmConfig;
use prodsift_scrape::{ProductRecord, ScrapeBatch};

// ── GeminiClient ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl GeminiClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// One `generateContent` call.  Single request, no retry; the caller
    /// decides how to degrade on error.
    pub async fn generate(&self, api_key: &str, prompt: &str) -> Result<String> {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );

        let payload = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": {
                "maxOutputTokens": self.config.max_output_tokens,
                "temperature": self.config.temperature,
                "topP": self.config.top_p,
            }
        });

        let response = self
            .client
            .post(endpoint)
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body: serde_json::Value = response.json().await?;
        if !status.is_success() {
            anyhow::bail!("Gemini error ({status}): {body}");
        }

        body.get("candidates")
            .and_then(|candidates| candidates.get(0))
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.get(0))
            .and_then(|part| part.get("text"))
            .and_then(|text| text.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| anyhow!("Gemini response missing text: {body}"))
    }
}

// ── Prompt assembly ──────────────────────────────────────────────────────────

/// Render one record plus the user's question into the generation prompt.
/// The record context is its JSON object form.
pub fn build_question_prompt(record: &ProductRecord, question: &str) -> String {
    let context = serde_json::to_value(record)
        .map(|value| value.to_string())
        .unwrap_or_default();
    format!("Here is product information: {context}\n\nQuestion: {question}\n\nAnswer:")
}

// ── Question responder ───────────────────────────────────────────────────────

/// Answer a free-text question about the record with the given `product_id`.
///
/// Returns `None` — the "no answer" sentinel — when the credential is absent
/// or blank, when no record matches, or when the service call fails.  Every
/// failure path logs and degrades; nothing here ever raises to the caller.
pub async fn answer_question(
    client: &GeminiClient,
    api_key: Option<&str>,
    batch: &ScrapeBatch,
    product_id: usize,
    question: &str,
) -> Option<String> {
    let api_key = api_key.map(str::trim).filter(|key| !key.is_empty())?;

    let Some(record) = batch.record_by_id(product_id) else {
        warn!(product_id, "no record with that product id");
        return None;
    };

    let prompt = build_question_prompt(record, question);
    info!(model = %client.model(), product_id, "sending product question to Gemini");

    match client.generate(api_key, &prompt).await {
        Ok(answer) => Some(answer),
        Err(err) => {
            warn!(?err, product_id, "question answering failed");
            None
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use prodsift_config::LlmConfig;
    use prodsift_scrape::{ExtractedFields, FetchOutcome, ProductRecord, ScrapeBatch};

    fn record(product_id: usize) -> ProductRecord {
        let mut record = ProductRecord::new(product_id, "http://shop.test/p");
        record.apply(ExtractedFields {
            title: Some("Widget".to_string()),
            price: Some("19.99".to_string()),
            description: Some("A widget.".to_string()),
            product_type: Some("Books".to_string()),
            availability: Some("In stock".to_string()),
            review_count: Some("7".to_string()),
        });
        record
    }

    fn batch_of(ids: &[usize]) -> ScrapeBatch {
        ScrapeBatch {
            records: ids.iter().map(|&id| record(id)).collect(),
            outcomes: ids.iter().map(|_| FetchOutcome::Fetched).collect(),
        }
    }

    fn client() -> GeminiClient {
        GeminiClient::new(LlmConfig::default())
    }

    // ── Prompt template ────────────────────────────────────────────────────

    #[test]
    fn prompt_follows_the_template() {
        let prompt = build_question_prompt(&record(0), "How much does it cost?");
        assert!(prompt.starts_with("Here is product information: {"));
        assert!(prompt.contains("\"title\":\"Widget\""));
        assert!(prompt.contains("\n\nQuestion: How much does it cost?\n\nAnswer:"));
    }

    #[test]
    fn prompt_context_carries_blank_fields_as_null() {
        let prompt = build_question_prompt(&ProductRecord::new(2, "http://shop.test/p"), "q");
        assert!(prompt.contains("\"title\":null"));
        assert!(prompt.contains("\"product_id\":2"));
    }

    // ── Sentinel contract ──────────────────────────────────────────────────
    // Each of these must return None before any request is attempted.

    #[tokio::test]
    async fn missing_credential_yields_no_answer() {
        let answer = answer_question(&client(), None, &batch_of(&[0]), 0, "q").await;
        assert!(answer.is_none());
    }

    #[tokio::test]
    async fn blank_credential_yields_no_answer() {
        let answer = answer_question(&client(), Some("   "), &batch_of(&[0]), 0, "q").await;
        assert!(answer.is_none());
    }

    #[tokio::test]
    async fn unknown_product_id_yields_no_answer() {
        let answer = answer_question(&client(), Some("key"), &batch_of(&[0, 1]), 9, "q").await;
        assert!(answer.is_none());
    }

    #[tokio::test]
    async fn empty_batch_yields_no_answer() {
        let answer = answer_question(&client(), Some("key"), &ScrapeBatch::default(), 0, "q").await;
        assert!(answer.is_none());
    }
}
