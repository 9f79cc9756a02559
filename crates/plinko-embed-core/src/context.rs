//! Session/user context propagated from the host page

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::protocol::InitPayload;

/// Identifying payload received from the host page and re-attached to
/// outgoing messages.
///
/// Overwritten wholesale on each init; there are no merge semantics between
/// successive inits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbedContext {
    /// Host-assigned session identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Host-assigned user identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl EmbedContext {
    /// Build a context from an init payload, dropping everything else.
    pub fn from_init(payload: &InitPayload) -> Self {
        Self {
            session_id: payload.session_id.clone(),
            user_id: payload.user_id.clone(),
        }
    }

    /// Merge this context into `payload`.
    ///
    /// Context fields win on key collision, and an unset context field
    /// removes the same-named payload key. Callers passing their own
    /// `sessionId`/`userId` in the payload get them replaced.
    pub fn merge_into(&self, payload: &mut Map<String, Value>) {
        Self::apply(payload, "sessionId", &self.session_id);
        Self::apply(payload, "userId", &self.user_id);
    }

    fn apply(payload: &mut Map<String, Value>, key: &str, field: &Option<String>) {
        match field {
            Some(value) => {
                payload.insert(key.into(), Value::String(value.clone()));
            }
            None => {
                payload.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_from_init_takes_identifiers_only() {
        let payload = InitPayload {
            balance: Some(100.0),
            session_id: Some("s1".into()),
            user_id: Some("u1".into()),
            ..Default::default()
        };
        assert_eq!(
            EmbedContext::from_init(&payload),
            EmbedContext {
                session_id: Some("s1".into()),
                user_id: Some("u1".into()),
            }
        );
    }

    #[test]
    fn test_merge_adds_context_fields() {
        let context = EmbedContext {
            session_id: Some("s1".into()),
            user_id: Some("u1".into()),
        };
        let mut payload = map(json!({"a": 1}));
        context.merge_into(&mut payload);
        assert_eq!(
            Value::Object(payload),
            json!({"a": 1, "sessionId": "s1", "userId": "u1"})
        );
    }

    #[test]
    fn test_merge_clobbers_payload_fields() {
        let context = EmbedContext {
            session_id: Some("s2".into()),
            user_id: None,
        };
        let mut payload = map(json!({"sessionId": "mine", "userId": "mine-too", "a": 1}));
        context.merge_into(&mut payload);
        // Set fields overwrite, unset fields remove.
        assert_eq!(Value::Object(payload), json!({"sessionId": "s2", "a": 1}));
    }

    #[test]
    fn test_empty_context_serializes_empty() {
        assert_eq!(
            serde_json::to_value(EmbedContext::default()).unwrap(),
            json!({})
        );
    }
}
