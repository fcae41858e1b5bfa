// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message type descriptors.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

const DEFAULT_SUBFOLDER: &str = "msg";

/// Identifies a generated message schema: `package/subfolder/Name`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageTypeId {
    pub package: String,
    pub subfolder: String,
    pub name: String,
}

impl MessageTypeId {
    pub fn new(package: &str, subfolder: &str, name: &str) -> Self {
        Self {
            package: package.to_string(),
            subfolder: subfolder.to_string(),
            name: name.to_string(),
        }
    }

    /// Parse `pkg/subfolder/Name` or `pkg/Name` (subfolder defaults to `msg`).
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidName {
            name: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split('/').collect();
        let (package, subfolder, name) = match parts.as_slice() {
            [package, name] => (*package, DEFAULT_SUBFOLDER, *name),
            [package, subfolder, name] => (*package, *subfolder, *name),
            _ => return Err(invalid("expected `package/subfolder/Name`")),
        };

        if [package, subfolder, name].iter().any(|p| p.is_empty()) {
            return Err(invalid("empty component"));
        }
        let valid_chars = |p: &str| p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if ![package, subfolder, name].iter().all(|p| valid_chars(*p)) {
            return Err(invalid("components may only contain [A-Za-z0-9_]"));
        }
        if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(invalid("message name must start with an uppercase letter"));
        }

        Ok(Self::new(package, subfolder, name))
    }
}

impl FromStr for MessageTypeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MessageTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.package, self.subfolder, self.name)
    }
}

/// Capability set describing how to allocate, fill and read one message
/// type.
///
/// `Message` is the buffer layout the middleware writes into. A subscription
/// allocates one buffer with `Default` and reuses it for every delivery, so
/// [`MessageType::write_buffer`] should overwrite in place and keep the
/// existing allocation where it can.
///
/// [`MessageType::ref_buffer`] returns a view that aliases the live buffer.
/// It is not a snapshot: the next delivery overwrites what it points at.
/// Callers that need to keep a message must copy it out.
pub trait MessageType: 'static {
    type Message: Default + Send;
    type View: ?Sized;

    fn type_id() -> MessageTypeId;

    fn ref_buffer(msg: &Self::Message) -> &Self::View;

    /// Overwrite `msg` with a payload taken from the middleware.
    fn write_buffer(msg: &mut Self::Message, payload: &[u8]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_form() {
        let id = MessageTypeId::parse("std_msgs/msg/String").expect("parse");
        assert_eq!(id.package, "std_msgs");
        assert_eq!(id.subfolder, "msg");
        assert_eq!(id.name, "String");
        assert_eq!(id.to_string(), "std_msgs/msg/String");
    }

    #[test]
    fn parse_short_form_defaults_subfolder() {
        let id: MessageTypeId = "geometry_msgs/Twist".parse().expect("parse");
        assert_eq!(id, MessageTypeId::new("geometry_msgs", "msg", "Twist"));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(MessageTypeId::parse("").is_err());
        assert!(MessageTypeId::parse("std_msgs").is_err());
        assert!(MessageTypeId::parse("std_msgs//String").is_err());
        assert!(MessageTypeId::parse("std_msgs/msg/string").is_err());
        assert!(MessageTypeId::parse("std-msgs/msg/String").is_err());
        assert!(MessageTypeId::parse("a/b/C/d").is_err());
    }
}
