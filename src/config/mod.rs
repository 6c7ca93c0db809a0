//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ToolConfig (validated, immutable)
//!     → passed explicitly to the node client, wallet and send service
//! ```
//!
//! # Design Decisions
//! - Config is loaded once per invocation and never cached globally
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ToolConfig, WalletSource};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "LOTUS_TOOLS_CONFIG";
