//! Multi-language support.
//!
//! Detects the dominant language of the user's utterance and records it on
//! the request, so later stages can localize matching and response text.
//! The locale travels with the request rather than through process-wide
//! state; concurrent invocations never see each other's locale.

use aws_sdk_comprehend::Client as ComprehendClient;
use shared::models::Req;
use shared::{Error, Result};
use tracing::{debug, info};

/// Detect the utterance's dominant language and set it on the request.
pub async fn apply(comprehend: &ComprehendClient, req: &mut Req) -> Result<()> {
    if req.question.is_empty() {
        debug!("Question is empty, skipping language detection");
        return Ok(());
    }

    let response = comprehend
        .detect_dominant_language()
        .text(&req.question)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to detect dominant language: {}", e)))?;

    let detected = response
        .languages()
        .iter()
        .max_by(|a, b| {
            a.score()
                .partial_cmp(&b.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .and_then(|language| language.language_code())
        .map(str::to_string);

    if let Some(locale) = detected {
        info!("Detected user locale: {}", locale);
        req.user_locale = Some(locale);
    } else {
        debug!("No dominant language detected");
    }

    Ok(())
}
