// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # rclbind - typed ROS 2 subscriptions over a middleware boundary
//!
//! `rclbind` binds a typed [`Subscription`] to an opaque subscription handle
//! owned by a ROS 2 style middleware. Transport, serialization, discovery and
//! scheduling stay inside the middleware; the crate reaches them only through
//! the [`Middleware`] trait.
//!
//! ## Quick Start
//!
//! ```rust
//! use rclbind::msgs::StringMessage;
//! use rclbind::{LoopbackMiddleware, MessageType, Node, Result, SubscriptionBase};
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let middleware = Arc::new(LoopbackMiddleware::new());
//!     let node = Node::new(middleware.clone(), "listener", "/")?;
//!
//!     let mut sub = node.create_subscription::<StringMessage, _>("chatter", |msg: &str| {
//!         println!("heard: {msg}");
//!     })?;
//!
//!     middleware.publish("/chatter", &StringMessage::type_id(), b"hello")?;
//!     assert!(sub.take_and_process()?);
//!     assert_eq!(sub.taken_msg(), "hello");
//!     Ok(())
//! }
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Subscription`] | Handle + topic + callback + reusable message buffer |
//! | [`RclHandle`] | Owned middleware resource, released on drop |
//! | [`MessageType`] | Descriptor: buffer layout, decoded view, type id |
//! | [`Middleware`] | Native call boundary |
//! | [`LoopbackMiddleware`] | In-process middleware for tests and demos |
//! | [`EnvConfig`] | Environment / YAML configuration |

/// Readiness routing for dispatch loops.
pub mod dispatch;
/// Runtime configuration (environment variables, YAML file).
pub mod env_config;
mod error;
/// Owned middleware handles.
pub mod handle;
/// In-process middleware implementation.
pub mod loopback;
/// Message type descriptors.
pub mod message;
/// Native call boundary.
pub mod middleware;
/// Built-in `std_msgs` descriptors.
pub mod msgs;
/// ROS 2 name validation and expansion.
pub mod names;
/// Node collaborator.
pub mod node;
/// Subscription handle adapter.
pub mod subscription;

pub use env_config::EnvConfig;
pub use error::{Error, Result};
pub use handle::{HandleKind, RawHandle, RclHandle};
pub use loopback::LoopbackMiddleware;
pub use message::{MessageType, MessageTypeId};
pub use middleware::{Middleware, MiddlewareError};
pub use node::Node;
pub use subscription::{Subscription, SubscriptionBase};
