// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::handle::{HandleKind, RawHandle};
use crate::middleware::MiddlewareError;
use thiserror::Error;

/// Errors emitted by the subscription adapter and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// The middleware refused to create a subscription. `source` is the
    /// middleware's own report, passed through unchanged.
    #[error("failed to create subscription on `{topic}` ({type_name})")]
    Creation {
        topic: String,
        type_name: String,
        #[source]
        source: MiddlewareError,
    },
    #[error(transparent)]
    Middleware(#[from] MiddlewareError),
    #[error("expected a live subscription handle, got {0}")]
    NotSubscription(HandleKind),
    #[error("invalid name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("payload does not fit message layout: {0}")]
    Decode(String),
    #[error("handle {0} does not belong to any subscription")]
    UnknownHandle(RawHandle),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
