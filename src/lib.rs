//! Lotus message send tooling.
//!
//! Builds a message, validates it against a full node, lets the operator
//! resolve failed checks (fee negotiation included) and publishes it.

pub mod blockchain;
pub mod cli;
pub mod config;
pub mod observability;
pub mod send;

pub use config::schema::ToolConfig;
pub use send::{SendError, SendOptions, SendService};
