//! Browser binding for the embed bridge
//!
//! Binds [`HostPage`] to the real DOM via `web-sys` and wires the global
//! `message` listener to [`EmbedBridge::handle_message`]. Only compiled for
//! wasm32 with the `web` feature.

use std::cell::RefCell;
use std::rc::Rc;

use plinko_embed_core::{EmbedError, MessageEvent, Result};
use serde_json::Value;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;

use crate::bridge::{EmbedBridge, EmbedHandlers};
use crate::host::{FrameNesting, HostPage};

/// [`HostPage`] backed by the browser window
#[derive(Debug, Clone)]
pub struct WebHost {
    window: Option<web_sys::Window>,
}

impl WebHost {
    /// Bind to the current window, if any.
    pub fn new() -> Self {
        Self {
            window: web_sys::window(),
        }
    }
}

impl Default for WebHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostPage for WebHost {
    fn is_browser(&self) -> bool {
        self.window.is_some()
    }

    fn search(&self) -> String {
        self.window
            .as_ref()
            .and_then(|window| window.location().search().ok())
            .unwrap_or_default()
    }

    fn pathname(&self) -> String {
        self.window
            .as_ref()
            .and_then(|window| window.location().pathname().ok())
            .unwrap_or_default()
    }

    fn frame_nesting(&self) -> FrameNesting {
        let Some(window) = self.window.as_ref() else {
            return FrameNesting::TopLevel;
        };
        match window.top() {
            Ok(Some(top)) => {
                if JsValue::from(window.self_()) == JsValue::from(top) {
                    FrameNesting::TopLevel
                } else {
                    FrameNesting::Embedded
                }
            }
            Ok(None) => FrameNesting::Embedded,
            Err(_) => FrameNesting::CrossOriginBlocked,
        }
    }

    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn post_to_parent(&self, data: &Value, target_origin: &str) -> Result<()> {
        let Some(window) = self.window.as_ref() else {
            return Ok(());
        };
        let parent = match window.parent() {
            Ok(Some(parent)) => parent,
            Ok(None) => return Ok(()),
            Err(error) => return Err(transport_error(&error)),
        };
        let encoded = serde_json::to_string(data)?;
        let js_data = js_sys::JSON::parse(&encoded).map_err(|e| transport_error(&e))?;
        parent
            .post_message(&js_data, target_origin)
            .map_err(|e| transport_error(&e))
    }
}

fn transport_error(value: &JsValue) -> EmbedError {
    EmbedError::Transport(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

/// Event data as JSON, or `None` when it cannot be represented as JSON
fn decode_event_data(event: &web_sys::MessageEvent) -> Option<Value> {
    let raw = js_sys::JSON::stringify(&event.data()).ok()?;
    serde_json::from_str(&String::from(raw)).ok()
}

/// A bridge attached to the real window
///
/// Returned by [`attach`]; detaches on [`detach`](Self::detach) or drop.
pub struct WebAttachment {
    bridge: Rc<RefCell<EmbedBridge<WebHost>>>,
    listener: Option<Closure<dyn FnMut(web_sys::MessageEvent)>>,
}

impl WebAttachment {
    /// Remove the listener and stop dispatch. Safe to call repeatedly.
    pub fn detach(&mut self) {
        self.bridge.borrow_mut().teardown();
        let Some(listener) = self.listener.take() else {
            return;
        };
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "message",
                listener.as_ref().unchecked_ref(),
            );
        }
    }
}

impl Drop for WebAttachment {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Set up `bridge` against the real window.
///
/// Runs [`EmbedBridge::setup`] and, when the bridge attaches, registers the
/// global `message` listener feeding it. The listener lives until the
/// returned attachment is detached or dropped.
pub fn attach(
    bridge: Rc<RefCell<EmbedBridge<WebHost>>>,
    handlers: EmbedHandlers,
) -> WebAttachment {
    if !bridge.borrow_mut().setup(handlers) {
        return WebAttachment {
            bridge,
            listener: None,
        };
    }

    let sink = Rc::clone(&bridge);
    let listener = Closure::wrap(Box::new(move |event: web_sys::MessageEvent| {
        let Some(data) = decode_event_data(&event) else {
            return;
        };
        sink.borrow_mut()
            .handle_message(&MessageEvent::new(data, event.origin()));
    }) as Box<dyn FnMut(web_sys::MessageEvent)>);

    if let Some(window) = web_sys::window() {
        if let Err(error) =
            window.add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())
        {
            warn!(?error, "failed to register message listener");
        }
    }

    WebAttachment {
        bridge,
        listener: Some(listener),
    }
}
