//! Inbound slash-command decoding.
//!
//! Slack posts slash commands as `application/x-www-form-urlencoded`.
//! JSON bodies of the same shape are accepted too, which is handy for
//! driving the bridge with `curl`.

use axum::http::{HeaderMap, header::CONTENT_TYPE};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::BridgeError;

/// Body encodings the bridge understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Form,
    Json,
}

impl ContentKind {
    /// Classifies a `Content-Type` value. Parameters such as `charset` are ignored.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let value = value.to_ascii_lowercase();
        if value.contains("application/x-www-form-urlencoded") {
            Some(Self::Form)
        } else if value.contains("application/json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
        Self::from_content_type(value)
    }
}

/// Normalized slash-command payload. Every field may be absent.
///
/// In JSON bodies, a non-string value for any field but `text` reads as
/// absent, so e.g. a numeric `token` fails verification instead of decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandRecord {
    #[serde(deserialize_with = "string_or_absent")]
    pub token: Option<String>,
    #[serde(deserialize_with = "string_or_absent")]
    pub team_id: Option<String>,
    #[serde(deserialize_with = "string_or_absent")]
    pub team_domain: Option<String>,
    #[serde(deserialize_with = "string_or_absent")]
    pub channel_id: Option<String>,
    #[serde(deserialize_with = "string_or_absent")]
    pub channel_name: Option<String>,
    #[serde(deserialize_with = "string_or_absent")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "string_or_absent")]
    pub user_name: Option<String>,
    pub text: Option<String>,
    #[serde(deserialize_with = "string_or_absent")]
    pub trigger_word: Option<String>,
}

fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl CommandRecord {
    /// The user's message, or `""` when it was not sent.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    fn from_form(body: &[u8]) -> Self {
        let mut record = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            let slot = match &*key {
                "token" => &mut record.token,
                "team_id" => &mut record.team_id,
                "team_domain" => &mut record.team_domain,
                "channel_id" => &mut record.channel_id,
                "channel_name" => &mut record.channel_name,
                "user_id" => &mut record.user_id,
                "user_name" => &mut record.user_name,
                "text" => &mut record.text,
                "trigger_word" => &mut record.trigger_word,
                _ => continue,
            };
            // First occurrence wins.
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        record
    }
}

/// Decodes `body` according to its content kind.
pub fn decode(kind: ContentKind, body: &[u8]) -> Result<CommandRecord, BridgeError> {
    match kind {
        ContentKind::Form => Ok(CommandRecord::from_form(body)),
        ContentKind::Json => {
            serde_json::from_slice(body).map_err(|e| BridgeError::MalformedBody(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn classifies_content_types() {
        assert_eq!(
            ContentKind::from_content_type("application/x-www-form-urlencoded"),
            Some(ContentKind::Form)
        );
        assert_eq!(
            ContentKind::from_content_type("application/json; charset=utf-8"),
            Some(ContentKind::Json)
        );
        assert_eq!(
            ContentKind::from_content_type("Application/JSON"),
            Some(ContentKind::Json)
        );
        assert_eq!(ContentKind::from_content_type("text/plain"), None);
        assert_eq!(ContentKind::from_content_type("multipart/form-data"), None);
    }

    #[test]
    fn missing_content_type_is_unsupported() {
        assert_eq!(ContentKind::from_headers(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert_eq!(ContentKind::from_headers(&headers), Some(ContentKind::Json));
    }

    #[test]
    fn decodes_slack_form_payload() {
        let body = b"token=abc&team_id=T1&team_domain=acme&channel_id=C1&channel_name=general\
&user_id=U1&user_name=sam&text=grind+1%2C0%2C0%2C2%2C0%2C0%2C1%2C1&trigger_word=grind&extra=x";
        let record = decode(ContentKind::Form, body).expect("form decodes");

        assert_eq!(record.token.as_deref(), Some("abc"));
        assert_eq!(record.team_id.as_deref(), Some("T1"));
        assert_eq!(record.team_domain.as_deref(), Some("acme"));
        assert_eq!(record.channel_id.as_deref(), Some("C1"));
        assert_eq!(record.channel_name.as_deref(), Some("general"));
        assert_eq!(record.user_id.as_deref(), Some("U1"));
        assert_eq!(record.user_name.as_deref(), Some("sam"));
        assert_eq!(record.text(), "grind 1,0,0,2,0,0,1,1");
        assert_eq!(record.trigger_word.as_deref(), Some("grind"));
    }

    #[test]
    fn missing_form_keys_stay_absent() {
        let record = decode(ContentKind::Form, b"text=1+2+3").expect("form decodes");
        assert_eq!(record.token, None);
        assert_eq!(record.user_name, None);
        assert_eq!(record.text(), "1 2 3");

        let empty = decode(ContentKind::Form, b"").expect("empty form decodes");
        assert_eq!(empty, CommandRecord::default());
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn repeated_form_key_keeps_first_value() {
        let record = decode(ContentKind::Form, b"text=first&text=second").expect("form decodes");
        assert_eq!(record.text(), "first");
    }

    #[test]
    fn json_payload_is_permissive() {
        let body = br#"{"text": "1 2 3 4 5 6 7 8", "unknown": 1, "token": null}"#;
        let record = decode(ContentKind::Json, body).expect("json decodes");
        assert_eq!(record.text(), "1 2 3 4 5 6 7 8");
        assert_eq!(record.token, None);
        assert_eq!(record.channel_id, None);
    }

    #[test]
    fn non_string_metadata_reads_as_absent() {
        let body = br#"{"token": 123, "user_id": ["U1"], "team_id": true, "text": "1 2 3"}"#;
        let record = decode(ContentKind::Json, body).expect("json decodes");
        assert_eq!(record.token, None);
        assert_eq!(record.user_id, None);
        assert_eq!(record.team_id, None);
        assert_eq!(record.text(), "1 2 3");
    }

    #[test]
    fn non_string_text_is_a_body_error() {
        let result = decode(ContentKind::Json, br#"{"text": 5}"#);
        assert!(matches!(result, Err(BridgeError::MalformedBody(_))));
    }

    #[test]
    fn malformed_json_is_a_body_error() {
        let result = decode(ContentKind::Json, b"{not json");
        assert!(matches!(result, Err(BridgeError::MalformedBody(_))));
    }
}
