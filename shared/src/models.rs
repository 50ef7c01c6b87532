//! Canonical request/response pair produced by the fulfillment middleware.
//!
//! Field names follow the wire shape downstream answer-selection stages
//! consume, so the structs serialize with their original JSON keys.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::settings::Settings;

/// Channel family that originated a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChannelType {
    #[serde(rename = "LEX")]
    Lex,
    #[serde(rename = "ALEXA")]
    Alexa,
}

/// Response body format preferred by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseType {
    PlainText,
    #[serde(rename = "SSML")]
    Ssml,
}

impl ResponseType {
    /// Voice/text discriminator used in client type labels.
    pub fn modality(self) -> &'static str {
        match self {
            ResponseType::Ssml => "Voice",
            ResponseType::PlainText => "Text",
        }
    }
}

/// Lex client platform detected from request attributes and user id shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexClient {
    Slack,
    TwilioSms,
    AmazonConnect,
    GenesysCloud,
    LexWebUi,
    Generic,
}

impl LexClient {
    /// Dotted client type label, e.g. `LEX.Slack.Voice`.
    pub fn label(self, response_type: ResponseType) -> String {
        let modality = response_type.modality();
        match self {
            LexClient::Slack => format!("LEX.Slack.{}", modality),
            LexClient::TwilioSms => format!("LEX.TwilioSMS.{}", modality),
            LexClient::AmazonConnect => format!("LEX.AmazonConnect.{}", modality),
            LexClient::GenesysCloud => format!("LEX.GenesysCloud.{}", modality),
            LexClient::LexWebUi => format!("LEX.LexWebUI.{}", modality),
            LexClient::Generic => format!("LEX.{}", modality),
        }
    }
}

/// Fields a channel parser extracts from the raw event.
#[derive(Debug, Default)]
pub struct ChannelFields {
    pub question: String,
    pub session: Map<String, Value>,
    pub intent_name: String,
    pub slots: Map<String, Value>,
}

/// Normalized request accumulated by the middleware pipeline.
#[derive(Debug, Serialize)]
pub struct Req {
    /// Raw channel event as received from the runtime.
    #[serde(rename = "_event")]
    pub event: Value,
    #[serde(rename = "_type")]
    pub channel: ChannelType,
    #[serde(rename = "_settings")]
    pub settings: Settings,
    #[serde(rename = "_preferredResponseType")]
    pub preferred_response_type: ResponseType,
    #[serde(rename = "_clientType")]
    pub client_type: String,
    /// Locale detected by the multi-language stage, when enabled.
    #[serde(rename = "_userLocale", skip_serializing_if = "Option::is_none")]
    pub user_locale: Option<String>,
    pub question: String,
    pub session: Map<String, Value>,
    #[serde(rename = "intentname")]
    pub intent_name: String,
    pub slots: Map<String, Value>,
    pub sentiment: String,
    #[serde(rename = "sentimentScore")]
    pub sentiment_score: Value,
}

/// Card payload attached to rich-client responses.
#[derive(Debug, Serialize)]
pub struct Card {
    pub send: bool,
    pub title: String,
    pub text: String,
    pub url: String,
}

impl Default for Card {
    fn default() -> Self {
        Self {
            send: false,
            title: String::new(),
            text: String::new(),
            url: String::new(),
        }
    }
}

/// Response skeleton handed to downstream answer-selection stages.
#[derive(Debug, Serialize)]
pub struct Res {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub message: String,
    pub session: Map<String, Value>,
    pub card: Card,
    #[serde(rename = "intentname")]
    pub intent_name: String,
}

impl Res {
    /// Build the initial response skeleton for a request.
    ///
    /// The session view drops the vendor-internal `appContext` key, expands
    /// JSON-encoded string values, and guarantees `qnabotcontext` exists.
    pub fn skeleton(req: &Req) -> Self {
        let mut session: Map<String, Value> = req
            .session
            .iter()
            .filter(|(key, _)| key.as_str() != "appContext")
            .map(|(key, value)| (key.clone(), expand_json_string(value)))
            .collect();

        session
            .entry("qnabotcontext")
            .or_insert_with(|| Value::Object(Map::new()));

        Self {
            response_type: ResponseType::PlainText,
            message: String::new(),
            session,
            card: Card::default(),
            intent_name: req.intent_name.clone(),
        }
    }
}

fn expand_json_string(value: &Value) -> Value {
    match value {
        Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| value.clone()),
        other => other.clone(),
    }
}
