// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subscription handle adapter.
//!
//! A [`Subscription`] binds a middleware subscription handle to a message
//! type, a topic and a user callback. It owns one message buffer, allocated
//! at construction and reused for every delivery: the middleware writes each
//! taken message into it in place, then the callback sees a view of it.
//!
//! # Buffer aliasing
//!
//! [`Subscription::taken_msg`] is a view of live memory, not a snapshot. The
//! next delivery overwrites it. Callbacks that need to keep a message must
//! copy it out.
//!
//! # Threading
//!
//! Delivery is serialized per subscription by the caller. Writing the
//! buffer requires `&mut Subscription`, so it cannot overlap a read.

use crate::handle::{HandleKind, RclHandle};
use crate::message::{MessageType, MessageTypeId};
use crate::middleware::Middleware;
use crate::node::Node;
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// A live subscription to one topic.
pub struct Subscription<T: MessageType> {
    handle: RclHandle,
    topic: String,
    type_id: MessageTypeId,
    callback: Arc<dyn Fn(&T::View) + Send + Sync>,
    ros_msg: T::Message,
}

impl<T: MessageType> Subscription<T> {
    /// Ask the middleware for a new subscription on `topic` bound to `node`,
    /// and wrap the returned handle.
    ///
    /// Each call registers one new subscription with the middleware. If the
    /// middleware refuses (invalid node, malformed topic, unsupported type,
    /// transport unavailable) its error is returned inside
    /// [`Error::Creation`] and no subscription exists.
    pub fn create<F>(node: &Node, topic: &str, callback: F) -> Result<Self>
    where
        F: Fn(&T::View) + Send + Sync + 'static,
    {
        let type_id = T::type_id();
        let middleware = Arc::clone(node.middleware());

        let raw = middleware
            .create_subscription(node.raw(), &type_id, topic)
            .map_err(|source| Error::Creation {
                topic: topic.to_string(),
                type_name: type_id.to_string(),
                source,
            })?;
        log::debug!(
            "[subscription] {} on `{}` ({}) for node {}",
            raw,
            topic,
            type_id,
            node.name()
        );

        let handle = RclHandle::new(middleware, raw, HandleKind::Subscription, Some(node.raw()));
        Self::new(handle, topic, Arc::new(callback))
    }

    /// Wrap an existing subscription handle.
    ///
    /// Fails when `handle` is released, dismissed, or not a subscription.
    pub fn new(
        handle: RclHandle,
        topic: &str,
        callback: Arc<dyn Fn(&T::View) + Send + Sync>,
    ) -> Result<Self> {
        if !handle.is_live() || handle.kind() != HandleKind::Subscription {
            return Err(Error::NotSubscription(handle.kind()));
        }
        Ok(Self {
            handle,
            topic: topic.to_string(),
            type_id: T::type_id(),
            callback,
            ros_msg: T::Message::default(),
        })
    }

    /// Native handle, used by dispatch code to route events.
    pub fn handle(&self) -> &RclHandle {
        &self.handle
    }

    /// Topic as given at creation (before middleware expansion).
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn type_id(&self) -> &MessageTypeId {
        &self.type_id
    }

    /// Decoded view of the buffer's current contents.
    ///
    /// Before the first delivery this is the view of `T::Message::default()`.
    pub fn taken_msg(&self) -> &T::View {
        T::ref_buffer(&self.ros_msg)
    }

    /// The reusable buffer itself. Same buffer on every call.
    pub fn ros_msg(&self) -> &T::Message {
        &self.ros_msg
    }

    /// Mutable access to the buffer for the middleware write path.
    pub fn ros_msg_mut(&mut self) -> &mut T::Message {
        &mut self.ros_msg
    }

    /// Invoke the callback with `response`.
    ///
    /// No filtering or recovery: a panic raised by the callback propagates to
    /// the caller.
    pub fn process_response(&self, response: &T::View) {
        (self.callback)(response);
    }
}

impl<T: MessageType> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("handle", &self.handle)
            .field("topic", &self.topic)
            .field("type_id", &self.type_id)
            .finish_non_exhaustive()
    }
}

/// Type-erased view of a subscription used by dispatch loops.
pub trait SubscriptionBase {
    fn handle(&self) -> &RclHandle;

    fn topic(&self) -> &str;

    fn type_id(&self) -> &MessageTypeId;

    /// Take the next pending message into the buffer and run the callback.
    /// Returns `Ok(false)` when nothing was pending.
    fn take_and_process(&mut self) -> Result<bool>;
}

impl<T: MessageType> SubscriptionBase for Subscription<T> {
    fn handle(&self) -> &RclHandle {
        &self.handle
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn type_id(&self) -> &MessageTypeId {
        &self.type_id
    }

    fn take_and_process(&mut self) -> Result<bool> {
        let raw = self
            .handle
            .raw()
            .ok_or(Error::NotSubscription(self.handle.kind()))?;
        let middleware = Arc::clone(self.handle.middleware());

        // Payload errors from the message type are returned as is.
        let buffer = &mut self.ros_msg;
        let mut rejected = None;
        let taken = middleware.take_message(raw, &mut |payload: &[u8]| {
            T::write_buffer(buffer, payload).map_err(|err| {
                let reason = err.to_string();
                rejected = Some(err);
                Error::Decode(reason)
            })
        });
        if let Some(err) = rejected {
            return Err(err);
        }
        if taken? {
            log::trace!("[subscription] {} took message on `{}`", raw, self.topic);
            self.process_response(self.taken_msg());
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::LoopbackMiddleware;
    use crate::middleware::MiddlewareError;
    use crate::msgs::{Int32Message, StringMessage};
    use parking_lot::Mutex;

    fn setup() -> (Arc<LoopbackMiddleware>, Node) {
        let loopback = Arc::new(LoopbackMiddleware::new());
        let node = Node::new(loopback.clone(), "listener", "/").expect("node");
        (loopback, node)
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |msg: &str| sink.lock().push(msg.to_string()))
    }

    #[test]
    fn create_stores_supplied_values() {
        let (loopback, node) = setup();
        let sub = Subscription::<StringMessage>::create(&node, "chatter", |_| {})
            .expect("subscription");

        assert_eq!(sub.handle().kind(), HandleKind::Subscription);
        assert_eq!(sub.handle().parent(), Some(node.raw()));
        assert_eq!(sub.topic(), "chatter");
        assert_eq!(sub.type_id(), &StringMessage::type_id());
        assert!(sub.ros_msg().is_empty());

        let raw = sub.handle().raw().expect("live");
        assert_eq!(loopback.subscription_topic(raw).as_deref(), Some("/chatter"));
    }

    #[test]
    fn taken_msg_before_delivery_is_default_view() {
        let (_loopback, node) = setup();
        let text = Subscription::<StringMessage>::create(&node, "chatter", |_| {})
            .expect("text");
        let number = Subscription::<Int32Message>::create(&node, "count", |_| {})
            .expect("number");
        assert_eq!(text.taken_msg(), "");
        assert_eq!(*number.taken_msg(), 0);
    }

    #[test]
    fn ros_msg_is_stable_across_calls() {
        let (_loopback, node) = setup();
        let mut sub = Subscription::<StringMessage>::create(&node, "chatter", |_| {})
            .expect("subscription");

        let first: *const String = sub.ros_msg();
        let second: *const String = sub.ros_msg();
        assert_eq!(first, second);

        sub.ros_msg_mut().push_str("written in place");
        let third: *const String = sub.ros_msg();
        assert_eq!(first, third);
        assert_eq!(sub.taken_msg(), "written in place");
    }

    #[test]
    fn process_response_calls_back_once_in_order() {
        let (_loopback, node) = setup();
        let (seen, callback) = recorder();
        let sub = Subscription::<StringMessage>::create(&node, "chatter", callback)
            .expect("subscription");

        sub.process_response("first");
        assert_eq!(*seen.lock(), vec!["first".to_string()]);
        sub.process_response("second");
        assert_eq!(*seen.lock(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    #[should_panic(expected = "callback failed")]
    fn callback_panic_propagates() {
        let (_loopback, node) = setup();
        let sub = Subscription::<StringMessage>::create(&node, "chatter", |_| {
            panic!("callback failed")
        })
        .expect("subscription");
        sub.process_response("boom");
    }

    #[test]
    fn creation_failure_surfaces_middleware_error() {
        let (loopback, node) = setup();

        let err = Subscription::<StringMessage>::create(&node, "", |_| {}).unwrap_err();
        match err {
            Error::Creation {
                topic,
                type_name,
                source,
            } => {
                assert_eq!(topic, "");
                assert_eq!(type_name, "std_msgs/msg/String");
                assert!(matches!(source, MiddlewareError::InvalidTopicName { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        loopback.set_available(false);
        let err = Subscription::<StringMessage>::create(&node, "chatter", |_| {}).unwrap_err();
        assert!(matches!(
            err,
            Error::Creation {
                source: MiddlewareError::Unavailable,
                ..
            }
        ));
        assert_eq!(loopback.subscription_count(), 0);
    }

    #[test]
    fn take_and_process_writes_buffer_then_calls_back() {
        let (loopback, node) = setup();
        let (seen, callback) = recorder();
        let mut sub = Subscription::<StringMessage>::create(&node, "chatter", callback)
            .expect("subscription");
        let buffer: *const String = sub.ros_msg();

        assert!(!sub.take_and_process().expect("empty take"));
        assert!(seen.lock().is_empty());

        let type_id = StringMessage::type_id();
        loopback.publish("/chatter", &type_id, b"hello").expect("publish");
        loopback.publish("/chatter", &type_id, b"world").expect("publish");

        assert!(sub.take_and_process().expect("take"));
        assert_eq!(sub.taken_msg(), "hello");
        assert!(sub.take_and_process().expect("take"));
        assert_eq!(sub.taken_msg(), "world");
        assert!(!sub.take_and_process().expect("drained"));

        assert_eq!(*seen.lock(), vec!["hello".to_string(), "world".to_string()]);
        assert_eq!(buffer, sub.ros_msg() as *const String);
    }

    #[test]
    fn bad_payload_is_reported_without_callback() {
        let (loopback, node) = setup();
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let mut sub = Subscription::<Int32Message>::create(&node, "count", move |_| {
            *counter.lock() += 1;
        })
        .expect("subscription");

        loopback
            .publish("/count", &Int32Message::type_id(), &[1, 2, 3])
            .expect("publish");
        let err = sub.take_and_process().unwrap_err();
        match err {
            Error::Decode(reason) => assert_eq!(reason, "Int32 expects 4 bytes, got 3"),
            other => panic!("expected a decode error, got {other:?}"),
        }
        assert_eq!(*calls.lock(), 0);

        // The bad payload is consumed; later messages still arrive.
        loopback
            .publish("/count", &Int32Message::type_id(), &9i32.to_le_bytes())
            .expect("publish");
        assert!(sub.take_and_process().expect("take"));
        assert_eq!(*sub.taken_msg(), 9);
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn new_rejects_non_subscription_handles() {
        let (loopback, _node) = setup();
        let raw = loopback.create_node("other", "/", 0).expect("node");
        let handle = RclHandle::new(loopback.clone(), raw, HandleKind::Node, None);
        let callback: Arc<dyn Fn(&str) + Send + Sync> = Arc::new(|_: &str| {});
        let err = Subscription::<StringMessage>::new(handle, "chatter", callback).unwrap_err();
        assert!(matches!(err, Error::NotSubscription(HandleKind::Node)));
    }

    #[test]
    fn drop_releases_subscription() {
        let (loopback, node) = setup();
        let sub = Subscription::<StringMessage>::create(&node, "chatter", |_| {})
            .expect("subscription");
        assert_eq!(loopback.subscription_count(), 1);
        drop(sub);
        assert_eq!(loopback.subscription_count(), 0);
    }
}
