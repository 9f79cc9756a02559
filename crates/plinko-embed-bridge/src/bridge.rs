//! The embed bridge: mode detection, inbound dispatch, outbound emission
//!
//! One [`EmbedBridge`] instance per page lifecycle. All state the widget
//! shares with its host page (trusted target origin, embed-enabled flag,
//! session context) lives on the instance, never in module globals.

use std::fmt;

use plinko_embed_core::{
    BalancePayload, ConfigPayload, EmbedContext, Envelope, HostMessage, InitPayload, MessageEvent,
    ReadyPayload, kinds,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::host::{FrameNesting, HostPage};

/// Target origin outgoing messages default to before an init arrives
pub const DEFAULT_TARGET_ORIGIN: &str = "*";

/// Query parameter that forces embed mode
const EMBED_PARAM: &str = "embed";

/// Accepted values for the embed query parameter (exact, case-sensitive)
const EMBED_PARAM_VALUES: [&str; 3] = ["1", "true", "yes"];

/// Callbacks supplied by the embedding application
///
/// All handlers are optional; a message whose handler is absent still updates
/// bridge state (origin adoption, context) where the protocol requires it.
#[derive(Default)]
pub struct EmbedHandlers {
    /// Called on `plinko:init` with the payload and the sender's origin
    pub on_init: Option<Box<dyn FnMut(&InitPayload, &str)>>,
    /// Called on `plinko:set-balance`
    pub on_balance: Option<Box<dyn FnMut(&BalancePayload)>>,
    /// Called on `plinko:config`
    pub on_config: Option<Box<dyn FnMut(&ConfigPayload)>>,
    /// Called on `plinko:reset`
    pub on_reset: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for EmbedHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedHandlers")
            .field("on_init", &self.on_init.is_some())
            .field("on_balance", &self.on_balance.is_some())
            .field("on_config", &self.on_config.is_some())
            .field("on_reset", &self.on_reset.is_some())
            .finish()
    }
}

/// Detect whether the page should run in embed mode.
///
/// True when the `embed` query parameter is `1`, `true` or `yes`, or when the
/// page is not the top-level browsing context. A cross-origin failure while
/// probing the top-level context counts as embedded. Outside a browser this
/// is always false.
pub fn is_embed_mode<H: HostPage>(host: &H) -> bool {
    if !host.is_browser() {
        return false;
    }
    let explicit = query_param(&host.search(), EMBED_PARAM)
        .is_some_and(|value| EMBED_PARAM_VALUES.contains(&value.as_str()));
    explicit
        || match host.frame_nesting() {
            FrameNesting::TopLevel => false,
            FrameNesting::Embedded | FrameNesting::CrossOriginBlocked => true,
        }
}

/// First value of `name` in a raw query string
fn query_param(search: &str, name: &str) -> Option<String> {
    let trimmed = search.strip_prefix('?').unwrap_or(search);
    form_urlencoded::parse(trimmed.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Cross-frame messaging bridge between the widget and its host page
pub struct EmbedBridge<H: HostPage> {
    host: H,
    /// Origin outgoing messages are restricted to
    target_origin: String,
    /// Evaluate-once embed-mode flag; unset until setup or first emission
    enabled: Option<bool>,
    /// Session/user context attached to outgoing messages
    context: EmbedContext,
    /// Whether inbound dispatch is active
    attached: bool,
    handlers: EmbedHandlers,
}

impl<H: HostPage> EmbedBridge<H> {
    /// Create a detached bridge with a wildcard target origin.
    pub fn new(host: H) -> Self {
        Self {
            host,
            target_origin: DEFAULT_TARGET_ORIGIN.into(),
            enabled: None,
            context: EmbedContext::default(),
            attached: false,
            handlers: EmbedHandlers::default(),
        }
    }

    /// Detect embed mode against the current host state.
    pub fn is_embed_mode(&self) -> bool {
        is_embed_mode(&self.host)
    }

    /// Attach the bridge: store the handlers, re-evaluate the embed flag,
    /// and when enabled start dispatching inbound messages and announce
    /// readiness with a `plinko:ready` event.
    ///
    /// Returns whether the bridge attached. Outside a browser, or with embed
    /// mode off, nothing is registered and nothing is emitted.
    pub fn setup(&mut self, handlers: EmbedHandlers) -> bool {
        if !self.host.is_browser() {
            return false;
        }
        let enabled = is_embed_mode(&self.host);
        self.enabled = Some(enabled);
        if !enabled {
            debug!("embed mode off, bridge stays detached");
            return false;
        }
        self.handlers = handlers;
        self.attached = true;
        self.emit_ready();
        true
    }

    /// Stop dispatching inbound messages. Idempotent.
    pub fn teardown(&mut self) {
        self.attached = false;
    }

    /// Whether inbound dispatch is active.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Dispatch one inbound message event.
    ///
    /// Events that are not shaped like a bridge message, and messages of an
    /// unrecognized type, are dropped without error. No-op when detached.
    pub fn handle_message(&mut self, event: &MessageEvent) {
        if !self.attached {
            return;
        }
        let Some(message) = HostMessage::decode(&event.data) else {
            return;
        };
        match message {
            HostMessage::Init(payload) => {
                self.adopt_target_origin(&payload, &event.origin);
                self.context = EmbedContext::from_init(&payload);
                debug!(origin = %event.origin, target_origin = %self.target_origin, "host init received");
                if let Some(on_init) = self.handlers.on_init.as_mut() {
                    on_init(&payload, &event.origin);
                }
            }
            HostMessage::SetBalance(payload) => {
                if let Some(on_balance) = self.handlers.on_balance.as_mut() {
                    on_balance(&payload);
                }
            }
            HostMessage::Config(payload) => {
                if let Some(on_config) = self.handlers.on_config.as_mut() {
                    on_config(&payload);
                }
            }
            HostMessage::Reset => {
                if let Some(on_reset) = self.handlers.on_reset.as_mut() {
                    on_reset();
                }
            }
            HostMessage::Unrecognized => {
                debug!("ignoring unrecognized host message");
            }
        }
    }

    /// Emit a typed event to the parent frame.
    ///
    /// No-op outside a browser or when embed mode is not enabled; the enabled
    /// flag is computed once on first use if [`setup`](Self::setup) has not
    /// run. Transport failures are logged and swallowed.
    pub fn emit(&mut self, kind: &str, payload: Option<Value>) {
        if !self.host.is_browser() || !self.ensure_enabled() {
            return;
        }
        self.post(Envelope::new(kind, payload));
    }

    /// Emit a typed event with the stored context merged into the payload.
    ///
    /// Context fields win on key collision and an unset context field removes
    /// the same-named payload key (see [`EmbedContext::merge_into`]). With no
    /// payload, the context alone is sent.
    pub fn emit_with_context(&mut self, kind: &str, payload: Option<Map<String, Value>>) {
        if !self.host.is_browser() || !self.ensure_enabled() {
            return;
        }
        let mut merged = payload.unwrap_or_default();
        self.context.merge_into(&mut merged);
        self.post(Envelope::new(kind, Some(Value::Object(merged))));
    }

    /// Overwrite the stored context wholesale from an init payload.
    pub fn set_context(&mut self, payload: &InitPayload) {
        self.context = EmbedContext::from_init(payload);
    }

    /// The current session/user context.
    pub fn context(&self) -> &EmbedContext {
        &self.context
    }

    /// The origin outgoing messages are currently restricted to.
    pub fn target_origin(&self) -> &str {
        &self.target_origin
    }

    /// The host page this bridge is bound to.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// An explicit origin in the init payload beats the observed event
    /// origin; both beat the wildcard default. Empty strings never adopted.
    fn adopt_target_origin(&mut self, payload: &InitPayload, event_origin: &str) {
        if let Some(origin) = payload.target_origin.as_deref().filter(|o| !o.is_empty()) {
            self.target_origin = origin.into();
        } else if !event_origin.is_empty() {
            self.target_origin = event_origin.into();
        }
    }

    fn ensure_enabled(&mut self) -> bool {
        match self.enabled {
            Some(enabled) => enabled,
            None => {
                let enabled = is_embed_mode(&self.host);
                self.enabled = Some(enabled);
                enabled
            }
        }
    }

    fn emit_ready(&mut self) {
        let payload = ReadyPayload {
            timestamp: self.host.now_ms(),
            pathname: self.host.pathname(),
        };
        match serde_json::to_value(&payload) {
            Ok(value) => self.emit(kinds::READY, Some(value)),
            Err(error) => warn!(%error, "failed to encode ready payload"),
        }
    }

    fn post(&self, envelope: Envelope) {
        let data = match serde_json::to_value(&envelope) {
            Ok(data) => data,
            Err(error) => {
                warn!(%error, kind = %envelope.kind, "failed to encode outgoing message");
                return;
            }
        };
        if let Err(error) = self.host.post_to_parent(&data, &self.target_origin) {
            warn!(%error, kind = %envelope.kind, "failed to post message to parent");
        }
    }
}

impl<H: HostPage + fmt::Debug> fmt::Debug for EmbedBridge<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedBridge")
            .field("host", &self.host)
            .field("target_origin", &self.target_origin)
            .field("enabled", &self.enabled)
            .field("context", &self.context)
            .field("attached", &self.attached)
            .field("handlers", &self.handlers)
            .finish()
    }
}
