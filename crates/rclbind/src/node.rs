// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node collaborator.
//!
//! A `Node` only carries what subscriptions need from it: the node handle
//! and the middleware that issued it. Lifecycle, parameters and graph
//! queries are left to the middleware.

use crate::env_config::{EnvConfig, DEFAULT_DOMAIN_ID};
use crate::handle::{HandleKind, RawHandle, RclHandle};
use crate::message::MessageType;
use crate::middleware::Middleware;
use crate::names;
use crate::subscription::Subscription;
use crate::{Error, Result};
use std::sync::Arc;

/// A middleware node subscriptions are created on.
#[derive(Debug)]
pub struct Node {
    handle: RclHandle,
    raw: RawHandle,
    name: String,
    namespace: String,
    domain_id: u32,
}

impl Node {
    /// Create a node named `name` in `namespace`, on the default domain.
    pub fn new(middleware: Arc<dyn Middleware>, name: &str, namespace: &str) -> Result<Self> {
        Self::in_domain(middleware, name, namespace, DEFAULT_DOMAIN_ID)
    }

    /// Create a node named `name` in `namespace` on `domain_id`.
    pub fn in_domain(
        middleware: Arc<dyn Middleware>,
        name: &str,
        namespace: &str,
        domain_id: u32,
    ) -> Result<Self> {
        names::validate_node_name(name)?;
        names::validate_namespace(namespace)?;

        let raw = middleware
            .create_node(name, namespace, domain_id)
            .map_err(Error::Middleware)?;
        log::debug!(
            "[node] {} created in {} on domain {} ({})",
            name,
            namespace,
            domain_id,
            raw
        );

        Ok(Self {
            handle: RclHandle::new(middleware, raw, HandleKind::Node, None),
            raw,
            name: name.to_string(),
            namespace: namespace.to_string(),
            domain_id,
        })
    }

    /// Create a node in the namespace and domain configured by `config`.
    pub fn with_config(
        middleware: Arc<dyn Middleware>,
        name: &str,
        config: &EnvConfig,
    ) -> Result<Self> {
        Self::in_domain(middleware, name, &config.namespace, config.domain_id)
    }

    pub fn handle(&self) -> &RclHandle {
        &self.handle
    }

    /// Raw node handle. Valid for the lifetime of the node.
    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn domain_id(&self) -> u32 {
        self.domain_id
    }

    pub fn middleware(&self) -> &Arc<dyn Middleware> {
        self.handle.middleware()
    }

    /// Subscribe to `topic`. See [`Subscription::create`].
    pub fn create_subscription<T, F>(&self, topic: &str, callback: F) -> Result<Subscription<T>>
    where
        T: MessageType,
        F: Fn(&T::View) + Send + Sync + 'static,
    {
        Subscription::create(self, topic, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::LoopbackMiddleware;

    #[test]
    fn node_owns_its_handle() {
        let loopback = Arc::new(LoopbackMiddleware::new());
        let node = Node::new(loopback.clone(), "talker", "/robot").expect("node");
        assert_eq!(node.handle().kind(), HandleKind::Node);
        assert!(node.handle().is_live());
        assert_eq!(node.name(), "talker");
        assert_eq!(node.namespace(), "/robot");
        assert_eq!(node.domain_id(), DEFAULT_DOMAIN_ID);
        assert_eq!(loopback.node_count(), 1);

        drop(node);
        assert_eq!(loopback.node_count(), 0);
    }

    #[test]
    fn invalid_names_never_reach_middleware() {
        let loopback = Arc::new(LoopbackMiddleware::new());
        assert!(matches!(
            Node::new(loopback.clone(), "9lives", "/"),
            Err(Error::InvalidName { .. })
        ));
        assert!(matches!(
            Node::new(loopback.clone(), "talker", "robot"),
            Err(Error::InvalidName { .. })
        ));
        assert_eq!(loopback.node_count(), 0);
    }

    #[test]
    fn with_config_uses_configured_namespace_and_domain() {
        let loopback = Arc::new(LoopbackMiddleware::new());
        let config = EnvConfig {
            domain_id: 12,
            namespace: "/fleet".to_string(),
            ..EnvConfig::default()
        };
        let node = Node::with_config(loopback.clone(), "talker", &config).expect("node");
        assert_eq!(node.namespace(), "/fleet");
        assert_eq!(node.domain_id(), 12);
        assert_eq!(loopback.node_domain(node.raw()), Some(12));
    }
}
