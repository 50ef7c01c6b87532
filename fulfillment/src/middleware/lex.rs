//! Lex channel parser.
//!
//! Extracts the question, session attributes, intent name and slots from
//! Lex v1 and v2 events. Lex v2 carries the intent and session under
//! `sessionState`; v1 puts them at the top level.

use serde_json::{Map, Value};
use shared::models::ChannelFields;
use shared::{Error, Result};

/// Parse a Lex event into channel fields.
pub fn parse(event: &Value) -> Result<ChannelFields> {
    if event.get("sessionState").is_some() {
        Ok(parse_v2(event))
    } else if event.get("currentIntent").is_some() {
        Ok(parse_v1(event))
    } else {
        Err(Error::Parse("Unrecognized Lex event format".to_string()))
    }
}

fn parse_v1(event: &Value) -> ChannelFields {
    ChannelFields {
        question: string_at(event, "/inputTranscript"),
        session: object_at(event, "/sessionAttributes"),
        intent_name: string_at(event, "/currentIntent/name"),
        slots: object_at(event, "/currentIntent/slots"),
    }
}

fn parse_v2(event: &Value) -> ChannelFields {
    ChannelFields {
        question: string_at(event, "/inputTranscript"),
        session: object_at(event, "/sessionState/sessionAttributes"),
        intent_name: string_at(event, "/sessionState/intent/name"),
        slots: object_at(event, "/sessionState/intent/slots"),
    }
}

fn string_at(event: &Value, pointer: &str) -> String {
    event
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn object_at(event: &Value, pointer: &str) -> Map<String, Value> {
    event
        .pointer(pointer)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_v1_event() {
        let event = json!({
            "messageVersion": "1.0",
            "inputTranscript": "what are your hours",
            "outputDialogMode": "Text",
            "sessionAttributes": { "topic": "hours" },
            "currentIntent": {
                "name": "fulfillment_IntentName",
                "slots": { "slot_one": "value" }
            }
        });

        let fields = parse(&event).unwrap();
        assert_eq!(fields.question, "what are your hours");
        assert_eq!(fields.intent_name, "fulfillment_IntentName");
        assert_eq!(fields.session.get("topic"), Some(&json!("hours")));
        assert_eq!(fields.slots.get("slot_one"), Some(&json!("value")));
    }

    #[test]
    fn test_parse_v2_event() {
        let event = json!({
            "messageVersion": "1.0",
            "inputTranscript": "what are your hours",
            "inputMode": "Speech",
            "sessionState": {
                "sessionAttributes": { "topic": "hours" },
                "intent": {
                    "name": "FallbackIntent",
                    "slots": {
                        "qnaslot": { "value": { "interpretedValue": "hours" } }
                    }
                }
            }
        });

        let fields = parse(&event).unwrap();
        assert_eq!(fields.question, "what are your hours");
        assert_eq!(fields.intent_name, "FallbackIntent");
        assert_eq!(fields.session.get("topic"), Some(&json!("hours")));
        assert!(fields.slots.contains_key("qnaslot"));
    }

    #[test]
    fn test_parse_missing_sessions_default_empty() {
        let event = json!({
            "inputTranscript": "hi",
            "currentIntent": { "name": "greeting" }
        });

        let fields = parse(&event).unwrap();
        assert!(fields.session.is_empty());
        assert!(fields.slots.is_empty());
    }

    #[test]
    fn test_parse_rejects_unrecognized_event() {
        assert!(parse(&json!({ "something": "else" })).is_err());
    }
}
