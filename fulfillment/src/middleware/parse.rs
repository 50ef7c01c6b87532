//! Request normalization, the first middleware stage of the fulfillment
//! pipeline.
//!
//! Resolves settings, classifies the channel and client, rewrites the
//! utterance per settings, runs optional enrichment, and builds the
//! response skeleton that downstream stages fill in.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use shared::models::{ChannelType, LexClient, Req, Res, ResponseType};
use shared::{get_settings, Result, Settings};
use tracing::{info, warn};

use crate::middleware::{alexa, lex, multilanguage, sentiment};
use crate::AppState;

/// Sentiment label used when sentiment support is switched off.
const SENTIMENT_NOT_ENABLED: &str = "NOT_ENABLED";

/// Normalize a raw channel event into the canonical request/response pair.
///
/// Fails if settings cannot be fetched, the channel parser rejects the
/// event, or an enrichment call fails; recovery is the caller's concern.
pub async fn parse(state: &AppState, event: Value) -> Result<(Req, Res)> {
    let settings = get_settings(&state.ssm_client, &state.config).await?;

    let mut req = build_request(event, settings)?;

    if req.settings.get_bool("ENABLE_MULTI_LANGUAGE_SUPPORT") {
        multilanguage::apply(&state.comprehend_client, &mut req).await?;
    }

    if req.settings.get_bool("ENABLE_SENTIMENT_SUPPORT") {
        let sentiment = sentiment::analyze(&state.comprehend_client, &req.question).await?;
        req.sentiment = sentiment.label;
        req.sentiment_score = sentiment.score;
    }

    let res = Res::skeleton(&req);
    Ok((req, res))
}

/// Assemble the request record from the raw event and resolved settings.
fn build_request(event: Value, settings: Settings) -> Result<Req> {
    // Alexa requests carry a top-level version field; Lex requests never do.
    let channel = if event.get("version").is_some_and(|v| !v.is_null()) {
        ChannelType::Alexa
    } else {
        ChannelType::Lex
    };

    let (fields, preferred_response_type) = match channel {
        ChannelType::Lex => (lex::parse(&event)?, lex_response_type(&event)),
        ChannelType::Alexa => (alexa::parse(&event)?, ResponseType::Ssml),
    };

    let client_type = classify_client(&event, channel, preferred_response_type);

    Ok(Req {
        question: rewrite_question(fields.question, &settings),
        session: fields.session,
        intent_name: fields.intent_name,
        slots: fields.slots,
        event,
        channel,
        preferred_response_type,
        client_type,
        user_locale: None,
        sentiment: SENTIMENT_NOT_ENABLED.to_string(),
        sentiment_score: Value::Object(Map::new()),
        settings,
    })
}

/// Determine the preferred response format for a Lex request.
///
/// Amazon Connect uses dialog mode `Text` yet advertises SSML support
/// through the `x-amz-lex:accept-content-types` request attribute.
fn lex_response_type(event: &Value) -> ResponseType {
    let mode = event
        .get("outputDialogMode")
        .or_else(|| event.get("inputMode"))
        .and_then(Value::as_str);

    match mode {
        Some("Voice") | Some("Speech") => ResponseType::Ssml,
        Some("Text") => {
            let content_types =
                request_attribute(event, "x-amz-lex:accept-content-types").unwrap_or("");
            if content_types.contains("SSML") {
                ResponseType::Ssml
            } else {
                ResponseType::PlainText
            }
        }
        Some(other) => {
            warn!("Unrecognized value for outputDialogMode: {}", other);
            ResponseType::PlainText
        }
        None => ResponseType::PlainText,
    }
}

/// Ordered client detection rules; first match wins.
const CLIENT_RULES: &[(fn(&Value) -> bool, LexClient)] = &[
    (is_slack, LexClient::Slack),
    (is_twilio_sms, LexClient::TwilioSms),
    (is_amazon_connect, LexClient::AmazonConnect),
    (is_genesys_cloud, LexClient::GenesysCloud),
    (is_lex_web_ui, LexClient::LexWebUi),
];

/// Best-effort client classification from request attributes and the user
/// id shape.
fn classify_client(event: &Value, channel: ChannelType, response_type: ResponseType) -> String {
    if channel == ChannelType::Alexa {
        return "ALEXA".to_string();
    }

    CLIENT_RULES
        .iter()
        .find(|(matches, _)| matches(event))
        .map(|(_, client)| *client)
        .unwrap_or(LexClient::Generic)
        .label(response_type)
}

// Lex v1 messaging channels set x-amz-lex:channel-type; v2 channels set
// x-amz-lex:channels:platform.
fn is_slack(event: &Value) -> bool {
    request_attribute(event, "x-amz-lex:channel-type") == Some("Slack")
        || request_attribute(event, "x-amz-lex:channels:platform") == Some("Slack")
}

fn is_twilio_sms(event: &Value) -> bool {
    request_attribute(event, "x-amz-lex:channel-type") == Some("Twilio-SMS")
        || request_attribute(event, "x-amz-lex:channels:platform") == Some("Twilio")
}

fn is_amazon_connect(event: &Value) -> bool {
    request_attribute(event, "x-amz-lex:accept-content-types").is_some()
}

fn is_genesys_cloud(event: &Value) -> bool {
    request_attribute(event, "x-amz-lex:channels:platform") == Some("Genesys Cloud")
}

/// Lex Web UI surfaces through a Cognito identity as the user id,
/// e.g. `us-east-1:a8e1f7b2-b20d-441c-9698-aff8b519d8d5`.
fn is_lex_web_ui(event: &Value) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"^.*-.*-\d:.*-.*-.*-.*$").expect("valid pattern"));

    event
        .get("userId")
        .and_then(Value::as_str)
        .is_some_and(|user_id| pattern.is_match(user_id))
}

fn request_attribute<'a>(event: &'a Value, name: &str) -> Option<&'a str> {
    event
        .get("requestAttributes")
        .and_then(|attributes| attributes.get(name))
        .and_then(Value::as_str)
}

/// Apply the literal search/replace pairs configured in
/// `SEARCH_REPLACE_QUESTION_SUBSTRINGS` to the question.
///
/// Malformed JSON in the setting logs and skips the whole step; the
/// question passes through unchanged.
fn rewrite_question(question: String, settings: &Settings) -> String {
    info!("Checking for question search/replace setting SEARCH_REPLACE_QUESTION_SUBSTRINGS");
    let replacements = match settings.get("SEARCH_REPLACE_QUESTION_SUBSTRINGS") {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(raw)) if !raw.is_empty() => {
            match serde_json::from_str::<Map<String, Value>>(raw) {
                Ok(map) => map,
                Err(_) => {
                    info!(
                        "Improperly formatted JSON in SEARCH_REPLACE_QUESTION_SUBSTRINGS: {}",
                        raw
                    );
                    return question;
                }
            }
        }
        _ => {
            info!("question search/replace is not enabled");
            return question;
        }
    };

    let mut question = question;
    for (pattern, replacement) in &replacements {
        let replacement = replacement
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| replacement.to_string());
        info!("Search/replace: '{}' with '{}'", pattern, replacement);
        question = question.replacen(pattern.as_str(), &replacement, 1);
    }
    question
}
