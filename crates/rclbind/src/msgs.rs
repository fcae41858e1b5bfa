// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in `std_msgs` descriptors.
//!
//! Payload layouts are the ones [`crate::LoopbackMiddleware`] carries:
//! UTF-8 bytes for `String`, four little-endian bytes for `Int32`, nothing for
//! `Empty`.

use crate::message::{MessageType, MessageTypeId};
use crate::{Error, Result};

/// `std_msgs/msg/String`
pub struct StringMessage;

impl MessageType for StringMessage {
    type Message = String;
    type View = str;

    fn type_id() -> MessageTypeId {
        MessageTypeId::new("std_msgs", "msg", "String")
    }

    fn ref_buffer(msg: &String) -> &str {
        msg.as_str()
    }

    fn write_buffer(msg: &mut String, payload: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(payload).map_err(|e| Error::Decode(e.to_string()))?;
        msg.clear();
        msg.push_str(text);
        Ok(())
    }
}

/// `std_msgs/msg/Int32`
pub struct Int32Message;

impl MessageType for Int32Message {
    type Message = i32;
    type View = i32;

    fn type_id() -> MessageTypeId {
        MessageTypeId::new("std_msgs", "msg", "Int32")
    }

    fn ref_buffer(msg: &i32) -> &i32 {
        msg
    }

    fn write_buffer(msg: &mut i32, payload: &[u8]) -> Result<()> {
        let bytes: [u8; 4] = payload
            .try_into()
            .map_err(|_| Error::Decode(format!("Int32 expects 4 bytes, got {}", payload.len())))?;
        *msg = i32::from_le_bytes(bytes);
        Ok(())
    }
}

/// `std_msgs/msg/Empty`
pub struct EmptyMessage;

impl MessageType for EmptyMessage {
    type Message = ();
    type View = ();

    fn type_id() -> MessageTypeId {
        MessageTypeId::new("std_msgs", "msg", "Empty")
    }

    fn ref_buffer(msg: &()) -> &() {
        msg
    }

    fn write_buffer(_msg: &mut (), payload: &[u8]) -> Result<()> {
        if !payload.is_empty() {
            return Err(Error::Decode(format!(
                "Empty expects no bytes, got {}",
                payload.len()
            )));
        }
        Ok(())
    }
}

/// Type ids registered by default on a loopback middleware.
pub(crate) fn builtin_type_ids() -> [MessageTypeId; 3] {
    [
        StringMessage::type_id(),
        Int32Message::type_id(),
        EmptyMessage::type_id(),
    ]
}
