//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events on stderr)
//!
//! Consumers:
//!     → The operator's terminal or a log collector reading stderr
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of formatted strings
//! - Message ids and addresses are logged, keys and tokens never are

pub mod logging;

pub use logging::init_logging;
