//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ToolConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is handed to the pipeline

use thiserror::Error;

use crate::blockchain::client::ApiInfo;
use crate::config::schema::ToolConfig;
use crate::observability::logging::LOG_LEVELS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required field {0} is missing")]
    MissingField(&'static str),

    #[error("repo.full_node_api is invalid: {0}")]
    InvalidEndpoint(String),

    #[error("node.rpc_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

pub fn validate_config(config: &ToolConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.repo.tool_path.trim().is_empty() {
        errors.push(ValidationError::MissingField("repo.tool_path"));
    }

    if !config.repo.full_node_api.trim().is_empty() {
        if let Err(e) = ApiInfo::parse(&config.repo.full_node_api) {
            errors.push(ValidationError::InvalidEndpoint(e.to_string()));
        }
    }

    if config.node.rpc_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
