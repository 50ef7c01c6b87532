//! Alexa channel parser.
//!
//! Extracts the question, session attributes and intent fields from Alexa
//! skill requests. The skill routes utterances through a single catch-all
//! slot named `QnA_slot`.

use serde_json::{Map, Value};
use shared::models::ChannelFields;
use shared::{Error, Result};

/// Parse an Alexa skill request into channel fields.
pub fn parse(event: &Value) -> Result<ChannelFields> {
    let request_type = event
        .pointer("/request/type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Parse("Alexa event has no request type".to_string()))?;

    let session = event
        .pointer("/session/attributes")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    match request_type {
        // No utterance to work with; downstream stages greet or close out.
        "LaunchRequest" | "SessionEndedRequest" => Ok(ChannelFields {
            question: String::new(),
            session,
            intent_name: request_type.to_string(),
            slots: Map::new(),
        }),
        "IntentRequest" => Ok(ChannelFields {
            question: event
                .pointer("/request/intent/slots/QnA_slot/value")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            session,
            intent_name: event
                .pointer("/request/intent/name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            slots: event
                .pointer("/request/intent/slots")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }),
        other => Err(Error::Parse(format!(
            "Unsupported Alexa request type: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_intent_request() {
        let event = json!({
            "version": "1.0",
            "session": { "attributes": { "topic": "hours" } },
            "request": {
                "type": "IntentRequest",
                "intent": {
                    "name": "Qna_intent",
                    "slots": { "QnA_slot": { "value": "what are your hours" } }
                }
            }
        });

        let fields = parse(&event).unwrap();
        assert_eq!(fields.question, "what are your hours");
        assert_eq!(fields.intent_name, "Qna_intent");
        assert_eq!(fields.session.get("topic"), Some(&json!("hours")));
        assert!(fields.slots.contains_key("QnA_slot"));
    }

    #[test]
    fn test_parse_launch_request() {
        let event = json!({
            "version": "1.0",
            "request": { "type": "LaunchRequest" }
        });

        let fields = parse(&event).unwrap();
        assert_eq!(fields.question, "");
        assert_eq!(fields.intent_name, "LaunchRequest");
    }

    #[test]
    fn test_parse_rejects_unknown_request_type() {
        let event = json!({
            "version": "1.0",
            "request": { "type": "AudioPlayer.PlaybackStarted" }
        });

        assert!(parse(&event).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_request_type() {
        assert!(parse(&json!({ "version": "1.0" })).is_err());
    }
}
