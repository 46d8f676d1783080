/**
 * Editor Command Messages
 *
 * The editing server talks to the gateway through small JSON objects that
 * always carry a `type` discriminator. Everything else in the object is the
 * command payload and is interpreted by whichever handler claims the type.
 *
 * ```json
 * {"type": "saveChanges", "changes": "[...]", "startSaveChanges": true}
 * ```
 */
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::shared::error::SharedError;

/// Key/value payload of a command
pub type CommandPayload = Map<String, Value>;

/// An inbound command from the editor
///
/// Lives only for the duration of one dispatch call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandRequest {
    /// Command discriminator (`auth`, `isSaveLock`, `saveChanges`, ...)
    #[serde(rename = "type")]
    pub command_type: String,
    /// Remaining fields of the message
    #[serde(flatten)]
    pub payload: CommandPayload,
}

impl CommandRequest {
    /// Create a request with an empty payload
    pub fn new(command_type: impl Into<String>) -> Self {
        Self {
            command_type: command_type.into(),
            payload: Map::new(),
        }
    }

    /// Builder-style helper to add a payload field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// The command discriminator
    pub fn command_type(&self) -> &str {
        &self.command_type
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Read an optional string field
    ///
    /// Numbers are accepted and rendered as strings, since editors send
    /// document ids in either form.
    pub fn get_str(&self, key: &str) -> Result<Option<String>, SharedError> {
        match self.payload.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(SharedError::invalid_field(key, "expected a string")),
        }
    }

    /// Read a boolean flag, absent meaning `false`
    pub fn flag(&self, key: &str) -> Result<bool, SharedError> {
        match self.payload.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(SharedError::invalid_field(key, "expected a boolean")),
        }
    }

    /// Read an optional non-negative index
    pub fn get_index(&self, key: &str) -> Result<Option<usize>, SharedError> {
        let invalid = || SharedError::invalid_field(key, "expected a non-negative integer");
        match self.payload.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => {
                let n = n.as_u64().ok_or_else(invalid)?;
                usize::try_from(n)
                    .map(Some)
                    .map_err(|_| SharedError::invalid_field(key, "index out of range"))
            }
            Some(_) => Err(invalid()),
        }
    }
}

/// The answer produced by exactly one command handler
///
/// Serialized verbatim as the HTTP response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CommandResponse(Map<String, Value>);

impl CommandResponse {
    /// Start a response carrying the given `type`
    pub fn of_type(response_type: &str) -> Self {
        let mut body = Map::new();
        body.insert("type".to_string(), Value::String(response_type.to_string()));
        Self(body)
    }

    /// Builder-style helper to add a field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn response_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_splits_type_from_payload() {
        let request: CommandRequest = serde_json::from_value(json!({
            "type": "saveChanges",
            "startSaveChanges": true,
            "changes": "[]"
        }))
        .unwrap();

        assert_eq!(request.command_type(), "saveChanges");
        assert_eq!(request.payload.len(), 2);
        assert!(request.get("type").is_none());
        assert!(request.flag("startSaveChanges").unwrap());
        assert!(!request.flag("endSaveChanges").unwrap());
    }

    #[test]
    fn test_request_without_type_is_rejected() {
        let result: Result<CommandRequest, _> = serde_json::from_value(json!({"changes": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_get_str_accepts_numbers() {
        let request = CommandRequest::new("auth").with("docid", 42);
        assert_eq!(request.get_str("docid").unwrap(), Some("42".to_string()));
        assert_eq!(request.get_str("token").unwrap(), None);
    }

    #[test]
    fn test_typed_getters_reject_wrong_types() {
        let request = CommandRequest::new("saveChanges")
            .with("endSaveChanges", "yes")
            .with("deleteIndex", -1);

        assert!(matches!(
            request.flag("endSaveChanges"),
            Err(SharedError::InvalidField { .. })
        ));
        assert!(request.get_index("deleteIndex").is_err());
    }

    #[test]
    fn test_index_bounds() {
        let request = CommandRequest::new("saveChanges").with("deleteIndex", 3);
        assert_eq!(request.get_index("deleteIndex").unwrap(), Some(3));

        for bad in [json!(-1), json!(1.5)] {
            let request = CommandRequest::new("saveChanges").with("deleteIndex", bad);
            assert!(matches!(
                request.get_index("deleteIndex"),
                Err(SharedError::InvalidField { .. })
            ));
        }

        let request = CommandRequest::new("saveChanges").with("deleteIndex", u64::MAX);
        match request.get_index("deleteIndex") {
            Ok(Some(n)) => assert_eq!(n as u64, u64::MAX),
            Err(SharedError::InvalidField { field, .. }) => {
                assert!(usize::BITS < 64);
                assert_eq!(field, "deleteIndex");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_response_serializes_as_plain_object() {
        let response = CommandResponse::of_type("saveLock").with("saveLock", false);
        assert_eq!(response.response_type(), Some("saveLock"));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": "saveLock", "saveLock": false})
        );
    }
}
