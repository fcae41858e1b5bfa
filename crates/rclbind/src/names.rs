// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ROS 2 name validation and topic expansion.
//!
//! Rules:
//! - a full topic name is absolute, has no trailing or repeated `/`, uses
//!   only `[A-Za-z0-9_/]`, and no token starts with a digit
//! - a node name is a single token of `[A-Za-z0-9_]` not starting with a
//!   digit
//! - a namespace is `/` or a valid full name
//!
//! Topic expansion resolves `~` (private names), `{node}`, `{ns}` and
//! `{namespace}` substitutions, then prefixes relative names with the node
//! namespace.

use thiserror::Error;

/// Longest name accepted by the graph.
pub const MAX_NAME_LENGTH: usize = 255;

/// A name that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid name `{name}`: {reason}")]
pub struct InvalidName {
    pub name: String,
    pub reason: &'static str,
}

impl InvalidName {
    fn new(name: &str, reason: &'static str) -> Self {
        Self {
            name: name.to_string(),
            reason,
        }
    }
}

impl From<InvalidName> for crate::Error {
    fn from(err: InvalidName) -> Self {
        crate::Error::InvalidName {
            name: err.name,
            reason: err.reason,
        }
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Validate an absolute, fully expanded topic name.
pub fn validate_full_topic_name(name: &str) -> Result<(), InvalidName> {
    let fail = |reason| Err(InvalidName::new(name, reason));

    if name.is_empty() {
        return fail("must not be empty");
    }
    if !name.starts_with('/') {
        return fail("must be absolute");
    }
    if name.ends_with('/') {
        return fail("must not end with `/`");
    }
    if name.len() > MAX_NAME_LENGTH {
        return fail("too long");
    }
    if !name.chars().all(|c| is_token_char(c) || c == '/') {
        return fail("may only contain [A-Za-z0-9_/]");
    }
    if name.contains("//") {
        return fail("must not contain repeated `/`");
    }
    if name[1..]
        .split('/')
        .any(|token| token.starts_with(|c: char| c.is_ascii_digit()))
    {
        return fail("tokens must not start with a digit");
    }
    Ok(())
}

/// Validate a node name (single token).
pub fn validate_node_name(name: &str) -> Result<(), InvalidName> {
    let fail = |reason| Err(InvalidName::new(name, reason));

    if name.is_empty() {
        return fail("must not be empty");
    }
    if name.len() > MAX_NAME_LENGTH {
        return fail("too long");
    }
    if !name.chars().all(is_token_char) {
        return fail("may only contain [A-Za-z0-9_]");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return fail("must not start with a digit");
    }
    Ok(())
}

/// Validate a node namespace.
pub fn validate_namespace(namespace: &str) -> Result<(), InvalidName> {
    if namespace == "/" {
        return Ok(());
    }
    validate_full_topic_name(namespace)
}

fn join(namespace: &str, name: &str) -> String {
    if namespace.ends_with('/') {
        format!("{namespace}{name}")
    } else {
        format!("{namespace}/{name}")
    }
}

/// Expand `topic` relative to a node and validate the result.
pub fn expand_topic_name(
    topic: &str,
    node_name: &str,
    namespace: &str,
) -> Result<String, InvalidName> {
    if topic.is_empty() {
        return Err(InvalidName::new(topic, "must not be empty"));
    }

    let mut expanded = match topic.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{}", join(namespace, node_name), rest)
        }
        Some(_) => return Err(InvalidName::new(topic, "`~` must be followed by `/`")),
        None => topic.to_string(),
    };

    if expanded.contains('{') {
        let ns = namespace.trim_end_matches('/');
        expanded = expanded
            .replace("{node}", node_name)
            .replace("{namespace}", ns)
            .replace("{ns}", ns);
    }
    if expanded.contains(['{', '}']) {
        return Err(InvalidName::new(topic, "unknown substitution"));
    }

    if !expanded.starts_with('/') {
        expanded = join(namespace, &expanded);
    }

    validate_full_topic_name(&expanded).map_err(|err| InvalidName::new(topic, err.reason))?;
    Ok(expanded)
}
