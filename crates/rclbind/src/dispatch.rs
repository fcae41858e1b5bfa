// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Routing of middleware readiness back to subscriptions.
//!
//! A dispatch loop learns from the middleware which subscription handles
//! have data. These helpers map those handles back to subscription objects
//! and run one take-and-callback round. Scheduling (when to wait, how long,
//! which thread) stays with the caller.

use crate::handle::RawHandle;
use crate::subscription::SubscriptionBase;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Map ready handles back to their subscription indexes.
///
/// Indexes come out in order of first readiness, without duplicates. A
/// handle that belongs to none of `subscriptions` is an error.
pub fn ready_indices(
    subscriptions: &[&mut dyn SubscriptionBase],
    ready: &[RawHandle],
) -> Result<Vec<usize>> {
    let mut index_map = HashMap::with_capacity(subscriptions.len());
    for (idx, sub) in subscriptions.iter().enumerate() {
        if let Some(raw) = sub.handle().raw() {
            index_map.insert(raw, idx);
        }
    }

    let mut indices = Vec::with_capacity(ready.len());
    let mut seen = HashSet::with_capacity(ready.len());

    for &raw in ready {
        let Some(&index) = index_map.get(&raw) else {
            return Err(Error::UnknownHandle(raw));
        };
        if seen.insert(index) {
            indices.push(index);
        }
    }

    Ok(indices)
}

/// Take one message for every ready subscription and run its callback.
/// Returns how many callbacks ran.
///
/// Middleware errors stop the round and propagate. So do callback panics.
pub fn dispatch_ready(
    subscriptions: &mut [&mut dyn SubscriptionBase],
    ready: &[RawHandle],
) -> Result<usize> {
    let indices = ready_indices(subscriptions, ready)?;
    let mut delivered = 0;
    for index in indices {
        if subscriptions[index].take_and_process()? {
            delivered += 1;
        }
    }
    log::trace!("[dispatch] {} of {} ready subscriptions delivered", delivered, ready.len());
    Ok(delivered)
}
