use crate::error::CoreError;
use crate::structs::NewMessage;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The body of `POST /api/messages` exactly as the client sent it.
///
/// Every field is optional so that a missing field never fails
/// deserialization; presence is checked by [`CreateMessageRequest::validate`].
/// A field holding anything other than a JSON string is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub message: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

impl CreateMessageRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            message: Some(message.into()),
        }
    }

    /// Checks that `name`, `email` and `message` are all present and
    /// non-empty, and only then hands them over as a [`NewMessage`].
    ///
    /// No field content is inspected before every field has been checked.
    pub fn validate(self) -> Result<NewMessage, CoreError> {
        let present = |value: Option<String>| value.filter(|s| !s.is_empty());

        match (present(self.name), present(self.email), present(self.message)) {
            (Some(name), Some(email), Some(message)) => Ok(NewMessage::new(name, email, message)),
            (name, email, message) => {
                let missing = [
                    ("name", name.is_none()),
                    ("email", email.is_none()),
                    ("message", message.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, is_missing)| is_missing.then_some(field))
                .collect();
                Err(CoreError::MissingFields(missing))
            }
        }
    }

    /// A short preview of the message body for log lines.
    pub fn message_preview(&self) -> String {
        match self.message.as_deref() {
            Some(text) if text.chars().count() > 20 => {
                format!("{}...", text.chars().take(20).collect::<String>())
            }
            Some(text) => text.to_string(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CreateMessageRequest {
        serde_json::from_str(json).expect("body should deserialize")
    }

    #[test]
    fn valid_request_becomes_new_message() {
        let new_message = CreateMessageRequest::new("Ann", "a@x.com", "hi").validate().unwrap();
        assert_eq!(new_message.name(), "Ann");
        assert_eq!(new_message.email(), "a@x.com");
        assert_eq!(new_message.message(), "hi");
    }

    #[test]
    fn missing_message_is_rejected_without_panicking() {
        let request = parse(r#"{"name":"Ann","email":"a@x.com"}"#);
        assert_eq!(request.message_preview(), "");
        assert_eq!(request.validate(), Err(CoreError::MissingFields(vec!["message"])));
    }

    #[test]
    fn each_missing_field_is_reported() {
        let cases = [
            (r#"{"email":"a@x.com","message":"hi"}"#, vec!["name"]),
            (r#"{"name":"Ann","message":"hi"}"#, vec!["email"]),
            (r#"{"name":"Ann","email":"a@x.com"}"#, vec!["message"]),
            (r#"{}"#, vec!["name", "email", "message"]),
        ];
        for (body, expected) in cases {
            assert_eq!(parse(body).validate(), Err(CoreError::MissingFields(expected)), "{body}");
        }
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let request = parse(r#"{"name":"","email":"a@x.com","message":""}"#);
        assert_eq!(request.validate(), Err(CoreError::MissingFields(vec!["name", "message"])));
    }

    #[test]
    fn non_string_values_count_as_missing() {
        let request = parse(r#"{"name":42,"email":null,"message":["hi"]}"#);
        assert_eq!(
            request.validate(),
            Err(CoreError::MissingFields(vec!["name", "email", "message"]))
        );
    }

    #[test]
    fn error_message_matches_api_contract() {
        let err = CreateMessageRequest::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "All fields are required");
    }

    #[test]
    fn preview_truncates_long_messages() {
        let request = CreateMessageRequest::new("Ann", "a@x.com", "abcdefghijklmnopqrstuvwxyz");
        assert_eq!(request.message_preview(), "abcdefghijklmnopqrst...");
    }
}
