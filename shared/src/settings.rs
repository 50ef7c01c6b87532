//! QnABot settings from SSM Parameter Store.
//!
//! Settings live in three parameters: a default settings document, a custom
//! settings document that overrides it, and the user pool JWKS URL. Values
//! are normalized once at fetch time so downstream stages read typed fields
//! instead of re-parsing strings.

use aws_sdk_ssm::Client as SsmClient;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{Config, Error, Result};

/// Key under which the user pool JWKS URL is attached to the merged settings.
pub const DEFAULT_USER_POOL_JWKS_URL: &str = "DEFAULT_USER_POOL_JWKS_URL";

/// Merged QnABot settings.
///
/// JSON documents are expanded, wrapping double quotes are stripped from
/// string leaves, and `"true"`/`"false"` strings become booleans.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Settings(Map<String, Value>);

impl Settings {
    /// Look up a setting by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string setting by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Feature flag lookup: true only for an explicit boolean `true`.
    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Bool(true)))
    }
}

impl From<Map<String, Value>> for Settings {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Fetch a parameter and normalize its value.
///
/// JSON-parseable values are decoded and normalized; anything else is kept
/// as the raw string (the JWKS URL parameter, for example).
pub async fn get_parameter(ssm: &SsmClient, name: &str) -> Result<Value> {
    let response = ssm
        .get_parameter()
        .name(name)
        .with_decryption(true)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get parameter {}: {}", name, e)))?;

    let value = response
        .parameter()
        .and_then(|parameter| parameter.value())
        .ok_or_else(|| Error::Aws(format!("Parameter {} has no value", name)))?;

    Ok(parse_parameter(value))
}

/// Fetch and merge the three settings parameters.
///
/// The fetches run concurrently; the first failure wins. Custom settings
/// override default settings on key collision.
pub async fn get_settings(ssm: &SsmClient, config: &Config) -> Result<Settings> {
    info!(
        "Getting QnABot settings from SSM Parameter Store: {}, {}, {}",
        config.default_jwks_param, config.default_settings_param, config.custom_settings_param
    );

    let (jwks_url, default_settings, custom_settings) = tokio::try_join!(
        get_parameter(ssm, &config.default_jwks_param),
        get_parameter(ssm, &config.default_settings_param),
        get_parameter(ssm, &config.custom_settings_param),
    )?;

    debug!("Default settings: {}", default_settings);
    debug!("Custom settings: {}", custom_settings);

    let settings = merge_settings(default_settings, custom_settings, jwks_url);
    debug!(
        "Merged settings: {}",
        serde_json::to_string(&settings).unwrap_or_default()
    );

    Ok(settings)
}

fn parse_parameter(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(parsed) => normalize_value(parsed),
        Err(_) => Value::String(raw.to_string()),
    }
}

/// Strip wrapping quotes from string leaves and coerce `"true"`/`"false"`
/// (case-insensitive) to booleans, recursively.
fn normalize_value(value: Value) -> Value {
    match value {
        Value::String(s) => {
            let s = strip_quotes(&s);
            if s.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if s.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                Value::String(s.to_string())
            }
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, normalize_value(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        other => other,
    }
}

fn strip_quotes(s: &str) -> &str {
    if s.len() >= 3 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn merge_settings(default_settings: Value, custom_settings: Value, jwks_url: Value) -> Settings {
    let mut merged = into_object(default_settings);
    deep_merge(&mut merged, into_object(custom_settings));
    merged.insert(DEFAULT_USER_POOL_JWKS_URL.to_string(), jwks_url);
    Settings(merged)
}

/// A settings parameter that is not a JSON object (the shipped custom
/// settings default is a blank string) contributes an empty overlay.
fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            debug!("Settings parameter is not a JSON object, ignoring: {}", other);
            Map::new()
        }
    }
}

fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        let merged = match (base.remove(&key), value) {
            (Some(Value::Object(mut base_child)), Value::Object(overlay_child)) => {
                deep_merge(&mut base_child, overlay_child);
                Value::Object(base_child)
            }
            (_, value) => value,
        };
        base.insert(key, merged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_boolean_string_coercion() {
        let normalized = normalize_value(json!({
            "A": "true",
            "B": "FALSE",
            "C": "\"true\"",
            "D": { "E": "False" },
            "F": ["true", "maybe"],
            "G": "hello",
            "H": 7,
        }));

        assert_eq!(
            normalized,
            json!({
                "A": true,
                "B": false,
                "C": true,
                "D": { "E": false },
                "F": [true, "maybe"],
                "G": "hello",
                "H": 7,
            })
        );
    }

    #[test]
    fn test_quote_stripping() {
        assert_eq!(strip_quotes("\"hello\""), "hello");
        assert_eq!(strip_quotes("plain"), "plain");
        assert_eq!(strip_quotes("\"\""), "\"\"");
        assert_eq!(
            normalize_value(json!("\"quoted value\"")),
            json!("quoted value")
        );
    }

    #[test]
    fn test_parse_parameter_plain_string() {
        let url = "https://cognito-idp.us-east-1.amazonaws.com/pool/.well-known/jwks.json";
        assert_eq!(parse_parameter(url), Value::String(url.to_string()));
    }

    #[test]
    fn test_parse_parameter_json_document() {
        let parsed = parse_parameter(r#"{"ENABLE_DEBUG_RESPONSES":"false","MINIMUM_CONFIDENCE_SCORE":0.6}"#);
        assert_eq!(
            parsed,
            json!({ "ENABLE_DEBUG_RESPONSES": false, "MINIMUM_CONFIDENCE_SCORE": 0.6 })
        );
    }

    #[test]
    fn test_custom_settings_override_defaults() {
        let settings = merge_settings(
            json!({ "A": 1, "B": "default", "NESTED": { "X": 1, "Y": 2 } }),
            json!({ "B": "custom", "NESTED": { "Y": 3 } }),
            json!("https://example.com/jwks.json"),
        );

        assert_eq!(settings.get("A"), Some(&json!(1)));
        assert_eq!(settings.get_str("B"), Some("custom"));
        assert_eq!(settings.get("NESTED"), Some(&json!({ "X": 1, "Y": 3 })));
        assert_eq!(
            settings.get_str(DEFAULT_USER_POOL_JWKS_URL),
            Some("https://example.com/jwks.json")
        );
    }

    #[test]
    fn test_blank_custom_settings_are_ignored() {
        let settings = merge_settings(
            json!({ "A": true }),
            Value::String(String::new()),
            json!("https://example.com/jwks.json"),
        );

        assert!(settings.get_bool("A"));
    }

    #[test]
    fn test_get_bool_requires_explicit_true() {
        let mut map = Map::new();
        map.insert("ON".to_string(), json!(true));
        map.insert("OFF".to_string(), json!(false));
        map.insert("TEXT".to_string(), json!("enabled"));
        let settings = Settings::from(map);

        assert!(settings.get_bool("ON"));
        assert!(!settings.get_bool("OFF"));
        assert!(!settings.get_bool("TEXT"));
        assert!(!settings.get_bool("MISSING"));
    }
}
