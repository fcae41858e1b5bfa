// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Owned references to middleware-side resources.
//!
//! A [`RawHandle`] is the opaque value the middleware hands out when it
//! creates a node, a subscription, etc. It only has meaning to the middleware
//! that produced it. [`RclHandle`] pairs that value with its [`HandleKind`]
//! and the owning parent, and releases it through the middleware when dropped.

use crate::middleware::Middleware;
use crate::Result;
use std::fmt;
use std::num::NonZeroU64;
use std::sync::Arc;

/// Opaque, never-null reference to a middleware resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawHandle(NonZeroU64);

impl RawHandle {
    /// Wrap a raw value. Returns `None` for zero (the null handle).
    #[must_use]
    pub fn new(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(Self)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}

/// Kind of resource a handle refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum HandleKind {
    /// Released or dismissed handle.
    #[default]
    None,
    Node,
    Publisher,
    Subscription,
    Service,
    Client,
    Timer,
    IdlString,
    Malloc,
}

impl HandleKind {
    /// Human readable label, as shown by debugging tools.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Unknown",
            Self::Node => "ROS Node",
            Self::Publisher => "ROS Publisher",
            Self::Subscription => "ROS Subscription",
            Self::Service => "ROS Service",
            Self::Client => "ROS Client",
            Self::Timer => "ROS Timer",
            Self::IdlString => "ROS String",
            Self::Malloc => "Memory",
        }
    }

    /// Whether releasing this kind requires the parent node handle.
    #[must_use]
    pub fn needs_parent(self) -> bool {
        matches!(
            self,
            Self::Publisher | Self::Subscription | Self::Service | Self::Client
        )
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// RAII owner of a middleware resource.
pub struct RclHandle {
    raw: Option<RawHandle>,
    kind: HandleKind,
    parent: Option<RawHandle>,
    middleware: Arc<dyn Middleware>,
}

impl RclHandle {
    /// Take ownership of `raw`. `parent` is the node the resource was created
    /// on, if any.
    pub fn new(
        middleware: Arc<dyn Middleware>,
        raw: RawHandle,
        kind: HandleKind,
        parent: Option<RawHandle>,
    ) -> Self {
        Self {
            raw: Some(raw),
            kind,
            parent,
            middleware,
        }
    }

    /// The raw value, or `None` once destroyed or dismissed.
    #[must_use]
    pub fn raw(&self) -> Option<RawHandle> {
        self.raw
    }

    #[must_use]
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    #[must_use]
    pub fn parent(&self) -> Option<RawHandle> {
        self.parent
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.raw.is_some()
    }

    /// Middleware the handle belongs to.
    #[must_use]
    pub fn middleware(&self) -> &Arc<dyn Middleware> {
        &self.middleware
    }

    /// Release the resource through the middleware. Calling it again is a
    /// no-op.
    pub fn destroy(&mut self) -> Result<()> {
        let Some(raw) = self.raw.take() else {
            return Ok(());
        };
        let kind = std::mem::take(&mut self.kind);
        let parent = self.parent.take();

        // Children whose parent is already gone cannot be finalized; the
        // middleware only frees their bookkeeping.
        if kind.needs_parent() && parent.is_none() {
            log::debug!("[handle] releasing orphan {} {}", kind, raw);
        }
        self.middleware.destroy(kind, raw, parent)?;
        log::trace!("[handle] released {} {}", kind, raw);
        Ok(())
    }

    /// Forget the resource without releasing it.
    pub fn dismiss(&mut self) {
        self.raw = None;
        self.kind = HandleKind::None;
    }
}

impl fmt::Display for RclHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw {
            Some(raw) => fmt::Display::fmt(&raw, f),
            None => f.write_str("0x0"),
        }
    }
}

impl fmt::Debug for RclHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RclHandle")
            .field("raw", &self.raw)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

impl Drop for RclHandle {
    fn drop(&mut self) {
        let label = self.kind;
        if let Err(err) = self.destroy() {
            log::warn!("[handle] failed to release {}: {}", label, err);
        }
    }
}
