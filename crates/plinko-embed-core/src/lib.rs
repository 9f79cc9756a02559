//! # plinko-embed-core
//!
//! Core types for the Plinko embed bridge protocol.
//!
//! This crate provides the foundational types used by the bridge runtime:
//! - Inbound and outbound message shapes, with the tagged decode step
//! - The session/user context propagated onto outgoing messages
//! - Error types

pub mod context;
pub mod error;
pub mod protocol;

pub use context::EmbedContext;
pub use error::{EmbedError, Result};
pub use protocol::{
    BalancePayload, ConfigPayload, Envelope, HostMessage, InitPayload, MessageEvent, ReadyPayload,
    kinds,
};
