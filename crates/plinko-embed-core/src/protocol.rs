//! Wire protocol for host page <-> widget communication
//!
//! Messages travel as JSON objects of the form `{"type": "...", "payload": {...}}`
//! with camelCase payload fields. Inbound data decodes into a closed set of
//! variants; anything the widget does not recognize becomes
//! [`HostMessage::Unrecognized`] and is ignored by the bridge.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message type tags on the wire
pub mod kinds {
    /// parent -> child: initialization parameters
    pub const INIT: &str = "plinko:init";
    /// parent -> child: balance update
    pub const SET_BALANCE: &str = "plinko:set-balance";
    /// parent -> child: configuration change
    pub const CONFIG: &str = "plinko:config";
    /// parent -> child: reset signal
    pub const RESET: &str = "plinko:reset";
    /// child -> parent: widget is attached and listening
    pub const READY: &str = "plinko:ready";
}

/// A cross-document message event, reduced to the parts the bridge consumes
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    /// Event data as JSON
    pub data: Value,
    /// Origin of the sending frame; may be empty
    pub origin: String,
}

impl MessageEvent {
    /// Build an event from data and the sender's origin.
    pub fn new(data: Value, origin: impl Into<String>) -> Self {
        Self {
            data,
            origin: origin.into(),
        }
    }
}

/// Initialization parameters sent by the host page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitPayload {
    /// Opening balance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    /// Default bet amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bet_amount: Option<f64>,
    /// Number of peg rows on the board
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u32>,
    /// Risk level name; the vocabulary is host-defined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    /// Session identifier to attach to outgoing messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// User identifier to attach to outgoing messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Origin the widget should trust for outgoing messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_origin: Option<String>,
}

/// Balance update from the host page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalancePayload {
    /// New balance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

/// Configuration change from the host page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPayload {
    /// New bet amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bet_amount: Option<f64>,
    /// New row count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u32>,
    /// New risk level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
}

/// Payload of the ready event emitted when the bridge attaches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyPayload {
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Path of the embedded page
    pub pathname: String,
}

/// Outbound wire envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message type tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Message payload; omitted on the wire when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    /// Build an envelope from a type tag and an optional payload.
    pub fn new(kind: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// Inbound messages from the host page, decoded from raw event data
#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    /// `plinko:init`
    Init(InitPayload),
    /// `plinko:set-balance`
    SetBalance(BalancePayload),
    /// `plinko:config`
    Config(ConfigPayload),
    /// `plinko:reset`
    Reset,
    /// Any other type tag, or a known tag whose payload does not decode
    Unrecognized,
}

impl HostMessage {
    /// Decode raw event data.
    ///
    /// Returns `None` when the data is not a JSON object carrying a string
    /// `type` field; such events are dropped before dispatch. A missing or
    /// `null` payload decodes as an empty payload.
    pub fn decode(data: &Value) -> Option<Self> {
        let object = data.as_object()?;
        let kind = object.get("type")?.as_str()?;
        let payload = match object.get("payload") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(other) => other.clone(),
        };
        Some(match kind {
            kinds::INIT => Self::parse(payload, Self::Init),
            kinds::SET_BALANCE => Self::parse(payload, Self::SetBalance),
            kinds::CONFIG => Self::parse(payload, Self::Config),
            kinds::RESET => Self::Reset,
            _ => Self::Unrecognized,
        })
    }

    fn parse<P, F>(payload: Value, wrap: F) -> Self
    where
        P: serde::de::DeserializeOwned,
        F: FnOnce(P) -> Self,
    {
        match serde_json::from_value(payload) {
            Ok(parsed) => wrap(parsed),
            Err(_) => Self::Unrecognized,
        }
    }
}
