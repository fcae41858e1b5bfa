// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Boundary between the adapter and the middleware that owns transport,
//! serialization, discovery and scheduling.
//!
//! Everything behind [`Middleware`] is external: the adapter only marshals
//! arguments across it and stores the handles it returns.

use crate::handle::{HandleKind, RawHandle};
use crate::message::MessageTypeId;
use thiserror::Error;

/// Failures reported by a middleware implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiddlewareError {
    #[error("node handle {0} is not valid")]
    InvalidNode(RawHandle),
    #[error("invalid node name or namespace `{name}`: {reason}")]
    InvalidNodeName { name: String, reason: &'static str },
    #[error("invalid topic name `{name}`: {reason}")]
    InvalidTopicName { name: String, reason: &'static str },
    #[error("message type `{0}` is not supported")]
    UnknownMessageType(String),
    #[error("handle {0} is not valid")]
    InvalidHandle(RawHandle),
    #[error("middleware unavailable")]
    Unavailable,
    #[error("failed to write message: {0}")]
    Decode(String),
}

/// Writer the middleware calls to place a taken payload into a subscription
/// buffer.
pub type BufferWriter<'a> = dyn FnMut(&[u8]) -> crate::Result<()> + 'a;

/// Native calls consumed by the adapter.
pub trait Middleware: Send + Sync {
    /// Create a node in `domain_id` and return its handle. Subscriptions
    /// created on the node share its domain.
    fn create_node(
        &self,
        name: &str,
        namespace: &str,
        domain_id: u32,
    ) -> Result<RawHandle, MiddlewareError>;

    /// Create one new subscription bound to `node`. Each call registers a new
    /// subscription; failures are reported, never hidden behind a dead
    /// handle.
    fn create_subscription(
        &self,
        node: RawHandle,
        type_id: &MessageTypeId,
        topic: &str,
    ) -> Result<RawHandle, MiddlewareError>;

    /// Take the next pending message for `subscription`, handing its payload
    /// to `write`. Returns `Ok(false)` when nothing is pending.
    fn take_message(
        &self,
        subscription: RawHandle,
        write: &mut BufferWriter<'_>,
    ) -> Result<bool, MiddlewareError>;

    /// Release a resource previously returned by this middleware.
    fn destroy(
        &self,
        kind: HandleKind,
        raw: RawHandle,
        parent: Option<RawHandle>,
    ) -> Result<(), MiddlewareError>;
}
