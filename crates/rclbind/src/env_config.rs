// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime configuration from environment variables and an optional YAML
//! file.
//!
//! ## Environment
//! - `RCLBIND_DOMAIN_ID`: domain nodes are created on and the loopback
//!   publishes to (default: 0, or `ROS_DOMAIN_ID` if set)
//! - `RCLBIND_LOG_LEVEL`: logging level (default: "info")
//! - `RCLBIND_QUEUE_DEPTH`: pending messages kept per loopback subscription
//!   (default: 10)
//! - `RCLBIND_MESSAGE_TYPES`: comma-separated extra types for the loopback
//!   (e.g. "nav_msgs/msg/Odometry,geometry_msgs/Twist")
//! - `RCLBIND_CONFIG_FILE`: path to a YAML file with the same keys
//!
//! ## ROS 2 Compatibility
//! - `ROS_DOMAIN_ID`: fallback for `RCLBIND_DOMAIN_ID`
//! - `ROS_NAMESPACE`: default node namespace (default: "/")
//!
//! # Example file
//!
//! ```yaml
//! domain_id: 7
//! log_level: debug
//! queue_depth: 32
//! namespace: /robot
//! message_types:
//!   - nav_msgs/msg/Odometry
//! ```
//!
//! Environment values win over file values.

use crate::loopback::DEFAULT_QUEUE_DEPTH;
use crate::message::MessageTypeId;
use crate::names;
use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable names
pub const ENV_DOMAIN_ID: &str = "RCLBIND_DOMAIN_ID";
pub const ENV_LOG_LEVEL: &str = "RCLBIND_LOG_LEVEL";
pub const ENV_QUEUE_DEPTH: &str = "RCLBIND_QUEUE_DEPTH";
pub const ENV_MESSAGE_TYPES: &str = "RCLBIND_MESSAGE_TYPES";
pub const ENV_CONFIG_FILE: &str = "RCLBIND_CONFIG_FILE";

/// Domain used when nothing else is configured.
pub const DEFAULT_DOMAIN_ID: u32 = 0;

/// ROS 2 environment variable for domain ID (fallback)
pub const ENV_ROS_DOMAIN_ID: &str = "ROS_DOMAIN_ID";
/// ROS 2 default node namespace
pub const ENV_ROS_NAMESPACE: &str = "ROS_NAMESPACE";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    /// Domain nodes are created on and the loopback publishes to
    pub domain_id: u32,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Pending messages kept per loopback subscription
    pub queue_depth: usize,

    /// Namespace for nodes created without an explicit one
    pub namespace: String,

    /// Extra message types the loopback accepts
    pub message_types: Vec<MessageTypeId>,

    /// YAML file the configuration was read from
    pub config_file: Option<String>,
}

/// On-disk layout of the YAML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    domain_id: Option<u32>,
    log_level: Option<String>,
    queue_depth: Option<usize>,
    namespace: Option<String>,
    message_types: Vec<String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            domain_id: DEFAULT_DOMAIN_ID,
            log_level: "info".to_string(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            namespace: "/".to_string(),
            message_types: Vec::new(),
            config_file: None,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn normalize_namespace(namespace: &str) -> String {
    if namespace.starts_with('/') {
        namespace.to_string()
    } else {
        format!("/{namespace}")
    }
}

impl EnvConfig {
    /// Load configuration from environment variables only.
    ///
    /// Priority for domain ID:
    /// 1. RCLBIND_DOMAIN_ID
    /// 2. ROS_DOMAIN_ID
    /// 3. Default (0)
    ///
    /// Unparsable values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load the YAML file named by `RCLBIND_CONFIG_FILE` (if any), then
    /// apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match non_empty_var(ENV_CONFIG_FILE) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Read a YAML configuration file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let file: FileConfig = serde_yaml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        let mut config = Self {
            config_file: Some(path.display().to_string()),
            ..Self::default()
        };
        if let Some(domain_id) = file.domain_id {
            config.domain_id = domain_id;
        }
        if let Some(level) = file.log_level.filter(|s| !s.is_empty()) {
            config.log_level = level;
        }
        if let Some(depth) = file.queue_depth {
            if depth == 0 {
                return Err(Error::Config("queue_depth must be at least 1".to_string()));
            }
            config.queue_depth = depth;
        }
        if let Some(namespace) = file.namespace {
            let namespace = normalize_namespace(&namespace);
            names::validate_namespace(&namespace)
                .map_err(|e| Error::Config(format!("namespace: {e}")))?;
            config.namespace = namespace;
        }
        for entry in &file.message_types {
            let type_id = MessageTypeId::parse(entry)
                .map_err(|e| Error::Config(format!("message_types: {e}")))?;
            config.message_types.push(type_id);
        }
        Ok(config)
    }

    fn apply_env(&mut self) {
        let domain_id = non_empty_var(ENV_DOMAIN_ID)
            .and_then(|s| s.parse::<u32>().ok())
            .or_else(|| non_empty_var(ENV_ROS_DOMAIN_ID).and_then(|s| s.parse::<u32>().ok()));
        if let Some(domain_id) = domain_id {
            self.domain_id = domain_id;
        }

        if let Some(level) = non_empty_var(ENV_LOG_LEVEL) {
            self.log_level = level;
        }

        match non_empty_var(ENV_QUEUE_DEPTH).map(|s| s.parse::<usize>()) {
            Some(Ok(depth)) if depth > 0 => self.queue_depth = depth,
            Some(_) => log::warn!("[config] ignoring invalid {}", ENV_QUEUE_DEPTH),
            None => {}
        }

        if let Some(namespace) = non_empty_var(ENV_ROS_NAMESPACE) {
            let namespace = normalize_namespace(&namespace);
            match names::validate_namespace(&namespace) {
                Ok(()) => self.namespace = namespace,
                Err(e) => log::warn!("[config] ignoring {}: {}", ENV_ROS_NAMESPACE, e),
            }
        }

        if let Some(list) = non_empty_var(ENV_MESSAGE_TYPES) {
            for entry in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                match MessageTypeId::parse(entry) {
                    Ok(type_id) if !self.message_types.contains(&type_id) => {
                        self.message_types.push(type_id);
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("[config] ignoring message type: {}", e),
                }
            }
        }
    }

    /// Check if any custom configuration was provided
    #[must_use]
    pub fn is_custom(&self) -> bool {
        *self != Self::default()
    }

    /// Apply log level to the logging subsystem
    pub fn apply_log_level(&self) {
        if let Err(env::VarError::NotPresent) = env::var("RUST_LOG") {
            // Only set if RUST_LOG is not already set
            env::set_var("RUST_LOG", &self.log_level);
        }
    }
}
