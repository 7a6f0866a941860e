//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, addresses parse)
//! - Detect duplicate partitions
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SentinelConfig → Result<(), Vec<ValidationError>>
//! - Runs before any monitor loop starts

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{MonitorConfig, SentinelConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("at least one partition must be configured")]
    NoPartitions,

    #[error("partition names must not be blank")]
    BlankPartition,

    #[error("partition '{0}' is listed more than once")]
    DuplicatePartition(String),

    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate the monitor section on its own.
///
/// Used by `Monitor::new`, which may be handed a config that never went
/// through the file loader.
pub fn validate_monitor(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_monitor(config, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a complete configuration.
pub fn validate_config(config: &SentinelConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_monitor(&config.monitor, &mut errors);

    if Url::parse(&config.node.endpoint).is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "node.endpoint",
            value: config.node.endpoint.clone(),
        });
    }
    if config.node.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "node.request_timeout_secs" });
    }

    if config.server.enabled {
        check_socket_addr("server.bind_address", &config.server.bind_address, &mut errors);
        if config.server.request_timeout_secs == 0 {
            errors.push(ValidationError::ZeroValue { field: "server.request_timeout_secs" });
        }
    }

    if let Some(url) = &config.notifier.webhook_url {
        if Url::parse(url).is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: "notifier.webhook_url",
                value: url.clone(),
            });
        }
        if config.notifier.queue_capacity == 0 {
            errors.push(ValidationError::ZeroValue { field: "notifier.queue_capacity" });
        }
        if config.notifier.timeout_secs == 0 {
            errors.push(ValidationError::ZeroValue { field: "notifier.timeout_secs" });
        }
    }

    if config.observability.metrics_enabled {
        check_socket_addr(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_monitor(config: &MonitorConfig, errors: &mut Vec<ValidationError>) {
    if config.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroValue { field: "monitor.poll_interval_ms" });
    }
    if config.status_interval_ms == 0 {
        errors.push(ValidationError::ZeroValue { field: "monitor.status_interval_ms" });
    }
    if config.unhealthy_threshold_ms == 0 {
        errors.push(ValidationError::ZeroValue { field: "monitor.unhealthy_threshold_ms" });
    }

    if config.partitions.is_empty() {
        errors.push(ValidationError::NoPartitions);
    }
    let mut seen = HashSet::new();
    for name in &config.partitions {
        if name.trim().is_empty() {
            errors.push(ValidationError::BlankPartition);
        } else if !seen.insert(name.as_str()) {
            errors.push(ValidationError::DuplicatePartition(name.clone()));
        }
    }
}

fn check_socket_addr(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
