//! Host-page abstraction
//!
//! The bridge's only view of the surrounding page. Implementations bind it
//! to the real DOM (`WebHost`, behind the `web` feature) or to an in-memory
//! double ([`MemoryHost`](crate::memory::MemoryHost)).

use plinko_embed_core::Result;
use serde_json::Value;

/// Where the page sits relative to the top-level browsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameNesting {
    /// The page is the top-level browsing context
    TopLevel,
    /// The page is nested inside another frame
    Embedded,
    /// Probing the top-level context threw; treated as embedded
    CrossOriginBlocked,
}

/// The bridge's collaborators on the surrounding page
pub trait HostPage {
    /// Whether the code runs in an interactive browser context.
    /// False in server-side or other non-interactive rendering contexts.
    fn is_browser(&self) -> bool;

    /// Raw query string of the current location, with or without a leading `?`
    fn search(&self) -> String;

    /// Path of the current location
    fn pathname(&self) -> String;

    /// Position of this page relative to the top-level browsing context
    fn frame_nesting(&self) -> FrameNesting;

    /// Wall clock, milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;

    /// Post a message to the parent frame, restricted to `target_origin`
    fn post_to_parent(&self, data: &Value, target_origin: &str) -> Result<()>;
}
