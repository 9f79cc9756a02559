//! Cross-frame messaging bridge for the embedded Plinko widget
//!
//! This crate provides:
//! - The [`HostPage`] abstraction over the surrounding browser page
//! - The stateful [`EmbedBridge`]: mode detection, inbound dispatch,
//!   outbound emission
//! - [`MemoryHost`], an in-memory host for tests and native simulation
//! - A `web-sys` binding to the real window (feature `web`, wasm32 only)

pub mod bridge;
pub mod host;
pub mod memory;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;

pub use bridge::{DEFAULT_TARGET_ORIGIN, EmbedBridge, EmbedHandlers, is_embed_mode};
pub use host::{FrameNesting, HostPage};
pub use memory::{MemoryHost, PostedMessage};
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use web::{WebAttachment, WebHost, attach};
