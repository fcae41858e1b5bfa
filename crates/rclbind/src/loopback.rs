// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process middleware.
//!
//! `LoopbackMiddleware` implements the native boundary without any transport:
//! payloads passed to [`LoopbackMiddleware::publish`] are copied into the
//! queue of every matching subscription in the same process. It validates
//! what a real middleware would reject (unknown nodes, unsupported types,
//! malformed topics), which makes it the reference fake for tests and demos.
//!
//! Nodes live on a domain and their subscriptions inherit it. Messages only
//! reach subscriptions on the domain they were published to.

use crate::env_config::{EnvConfig, DEFAULT_DOMAIN_ID};
use crate::handle::{HandleKind, RawHandle};
use crate::message::MessageTypeId;
use crate::middleware::{BufferWriter, Middleware, MiddlewareError};
use crate::msgs::builtin_type_ids;
use crate::names;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

/// Pending messages kept per subscription when nothing else is configured.
pub const DEFAULT_QUEUE_DEPTH: usize = 10;

// Raw values start well above zero so they read like addresses in logs.
const FIRST_HANDLE: u64 = 0x1000;

struct NodeEntry {
    name: String,
    namespace: String,
    domain_id: u32,
}

struct SubscriptionEntry {
    node: RawHandle,
    domain_id: u32,
    topic: String,
    type_id: MessageTypeId,
    queue: VecDeque<Vec<u8>>,
}

struct LoopbackState {
    next_handle: u64,
    types: HashSet<MessageTypeId>,
    nodes: HashMap<RawHandle, NodeEntry>,
    // Ordered by handle, i.e. by creation.
    subscriptions: BTreeMap<RawHandle, SubscriptionEntry>,
}

impl LoopbackState {
    fn allocate(&mut self) -> Result<RawHandle, MiddlewareError> {
        self.next_handle += 1;
        RawHandle::new(self.next_handle).ok_or(MiddlewareError::Unavailable)
    }
}

/// Middleware that delivers within the current process.
pub struct LoopbackMiddleware {
    state: Mutex<LoopbackState>,
    queue_depth: usize,
    domain_id: u32,
    available: AtomicBool,
}

impl Default for LoopbackMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackMiddleware {
    /// Create a loopback with the built-in `std_msgs` types registered.
    #[must_use]
    pub fn new() -> Self {
        Self::with_queue_depth(DEFAULT_QUEUE_DEPTH)
    }

    /// Create a loopback keeping at most `depth` pending messages per
    /// subscription (at least one).
    #[must_use]
    pub fn with_queue_depth(depth: usize) -> Self {
        Self {
            state: Mutex::new(LoopbackState {
                next_handle: FIRST_HANDLE,
                types: builtin_type_ids().into_iter().collect(),
                nodes: HashMap::new(),
                subscriptions: BTreeMap::new(),
            }),
            queue_depth: depth.max(1),
            domain_id: DEFAULT_DOMAIN_ID,
            available: AtomicBool::new(true),
        }
    }

    /// Publish to `domain_id` by default instead of the default domain.
    #[must_use]
    pub fn with_domain(mut self, domain_id: u32) -> Self {
        self.domain_id = domain_id;
        self
    }

    /// Build a loopback from runtime configuration.
    #[must_use]
    pub fn from_config(config: &EnvConfig) -> Self {
        let loopback = Self::with_queue_depth(config.queue_depth).with_domain(config.domain_id);
        for type_id in &config.message_types {
            loopback.register_type(type_id.clone());
        }
        loopback
    }

    /// Accept subscriptions of `type_id` from now on.
    pub fn register_type(&self, type_id: MessageTypeId) {
        log::debug!("[loopback] registered type {}", type_id);
        self.state.lock().types.insert(type_id);
    }

    /// Toggle availability. While unavailable, creation and take calls fail.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    #[must_use]
    pub fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    /// Domain [`LoopbackMiddleware::publish`] delivers to.
    #[must_use]
    pub fn domain_id(&self) -> u32 {
        self.domain_id
    }

    fn ensure_available(&self) -> Result<(), MiddlewareError> {
        if self.available.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(MiddlewareError::Unavailable)
        }
    }

    /// Deliver `payload` to every live subscription on `topic` with a
    /// matching type, on this loopback's domain. Returns the number of
    /// receivers.
    ///
    /// When a queue is full its oldest message is dropped.
    pub fn publish(
        &self,
        topic: &str,
        type_id: &MessageTypeId,
        payload: &[u8],
    ) -> Result<usize, MiddlewareError> {
        self.publish_in_domain(self.domain_id, topic, type_id, payload)
    }

    /// Same as [`LoopbackMiddleware::publish`], on `domain_id`.
    pub fn publish_in_domain(
        &self,
        domain_id: u32,
        topic: &str,
        type_id: &MessageTypeId,
        payload: &[u8],
    ) -> Result<usize, MiddlewareError> {
        self.ensure_available()?;
        names::validate_full_topic_name(topic).map_err(|err| {
            MiddlewareError::InvalidTopicName {
                name: err.name,
                reason: err.reason,
            }
        })?;

        let mut state = self.state.lock();
        let mut receivers = 0;
        for (raw, entry) in state
            .subscriptions
            .iter_mut()
            .filter(|(_, e)| {
                e.domain_id == domain_id && e.topic == topic && &e.type_id == type_id
            })
        {
            if entry.queue.len() >= self.queue_depth {
                entry.queue.pop_front();
                log::debug!("[loopback] queue full on {} ({}), dropped oldest", raw, topic);
            }
            entry.queue.push_back(payload.to_vec());
            receivers += 1;
        }
        if receivers == 0 {
            log::trace!("[loopback] no receivers for {} on domain {}", topic, domain_id);
        }
        Ok(receivers)
    }

    /// Subscriptions with pending messages, in creation order.
    #[must_use]
    pub fn ready_subscriptions(&self) -> Vec<RawHandle> {
        self.state
            .lock()
            .subscriptions
            .iter()
            .filter(|(_, e)| !e.queue.is_empty())
            .map(|(raw, _)| *raw)
            .collect()
    }

    /// Number of messages waiting for `subscription`.
    #[must_use]
    pub fn pending(&self, subscription: RawHandle) -> usize {
        self.state
            .lock()
            .subscriptions
            .get(&subscription)
            .map_or(0, |e| e.queue.len())
    }

    /// Fully expanded topic a subscription is bound to.
    #[must_use]
    pub fn subscription_topic(&self, subscription: RawHandle) -> Option<String> {
        self.state
            .lock()
            .subscriptions
            .get(&subscription)
            .map(|e| e.topic.clone())
    }

    /// Node a subscription was created on.
    #[must_use]
    pub fn subscription_node(&self, subscription: RawHandle) -> Option<RawHandle> {
        self.state
            .lock()
            .subscriptions
            .get(&subscription)
            .map(|e| e.node)
    }

    /// Domain a node was created on.
    #[must_use]
    pub fn node_domain(&self, node: RawHandle) -> Option<u32> {
        self.state.lock().nodes.get(&node).map(|e| e.domain_id)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.lock().nodes.len()
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.state.lock().subscriptions.len()
    }
}

impl Middleware for LoopbackMiddleware {
    fn create_node(
        &self,
        name: &str,
        namespace: &str,
        domain_id: u32,
    ) -> Result<RawHandle, MiddlewareError> {
        self.ensure_available()?;
        names::validate_node_name(name)
            .and_then(|()| names::validate_namespace(namespace))
            .map_err(|err| MiddlewareError::InvalidNodeName {
                name: err.name,
                reason: err.reason,
            })?;

        let mut state = self.state.lock();
        let raw = state.allocate()?;
        state.nodes.insert(
            raw,
            NodeEntry {
                name: name.to_string(),
                namespace: namespace.to_string(),
                domain_id,
            },
        );
        log::debug!(
            "[loopback] node {} created as {} on domain {}",
            name,
            raw,
            domain_id
        );
        Ok(raw)
    }

    fn create_subscription(
        &self,
        node: RawHandle,
        type_id: &MessageTypeId,
        topic: &str,
    ) -> Result<RawHandle, MiddlewareError> {
        self.ensure_available()?;

        let mut state = self.state.lock();
        let entry = state
            .nodes
            .get(&node)
            .ok_or(MiddlewareError::InvalidNode(node))?;
        if !state.types.contains(type_id) {
            return Err(MiddlewareError::UnknownMessageType(type_id.to_string()));
        }
        let domain_id = entry.domain_id;
        let expanded = names::expand_topic_name(topic, &entry.name, &entry.namespace).map_err(
            |err| MiddlewareError::InvalidTopicName {
                name: err.name,
                reason: err.reason,
            },
        )?;

        let raw = state.allocate()?;
        log::debug!(
            "[loopback] subscription {} on {} ({}) for node {}",
            raw,
            expanded,
            type_id,
            node
        );
        state.subscriptions.insert(
            raw,
            SubscriptionEntry {
                node,
                domain_id,
                topic: expanded,
                type_id: type_id.clone(),
                queue: VecDeque::with_capacity(self.queue_depth),
            },
        );
        Ok(raw)
    }

    fn take_message(
        &self,
        subscription: RawHandle,
        write: &mut BufferWriter<'_>,
    ) -> Result<bool, MiddlewareError> {
        self.ensure_available()?;

        let payload = {
            let mut state = self.state.lock();
            let entry = state
                .subscriptions
                .get_mut(&subscription)
                .ok_or(MiddlewareError::InvalidHandle(subscription))?;
            entry.queue.pop_front()
        };

        // The buffer is written outside the lock.
        let Some(payload) = payload else {
            return Ok(false);
        };
        write(payload.as_slice()).map_err(|err| MiddlewareError::Decode(err.to_string()))?;
        Ok(true)
    }

    fn destroy(
        &self,
        kind: HandleKind,
        raw: RawHandle,
        _parent: Option<RawHandle>,
    ) -> Result<(), MiddlewareError> {
        let mut state = self.state.lock();
        let removed = match kind {
            HandleKind::Node => state.nodes.remove(&raw).is_some(),
            HandleKind::Subscription => state.subscriptions.remove(&raw).is_some(),
            _ => false,
        };
        if removed {
            log::debug!("[loopback] destroyed {} {}", kind, raw);
            Ok(())
        } else {
            Err(MiddlewareError::InvalidHandle(raw))
        }
    }
}
