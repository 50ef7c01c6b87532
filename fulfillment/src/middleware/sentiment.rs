//! Sentiment scoring via Amazon Comprehend.

use aws_sdk_comprehend::types::LanguageCode;
use aws_sdk_comprehend::Client as ComprehendClient;
use serde_json::{json, Value};
use shared::{Error, Result};

/// Sentiment label and per-class scores for an utterance.
#[derive(Debug)]
pub struct Sentiment {
    pub label: String,
    pub score: Value,
}

/// Score the sentiment of the given text.
pub async fn analyze(comprehend: &ComprehendClient, text: &str) -> Result<Sentiment> {
    let response = comprehend
        .detect_sentiment()
        .text(text)
        .language_code(LanguageCode::En)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to detect sentiment: {}", e)))?;

    let label = response
        .sentiment()
        .map(|sentiment| sentiment.as_str().to_string())
        .unwrap_or_else(|| "NEUTRAL".to_string());

    let score = response
        .sentiment_score()
        .map(|score| {
            json!({
                "Positive": score.positive(),
                "Negative": score.negative(),
                "Neutral": score.neutral(),
                "Mixed": score.mixed(),
            })
        })
        .unwrap_or_else(|| json!({}));

    Ok(Sentiment { label, score })
}
