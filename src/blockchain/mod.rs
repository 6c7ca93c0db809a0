//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! config (node endpoint, keystore path)
//!     → client.rs (JSON-RPC connection with timeouts)
//!     → address.rs / cid.rs / encoding.rs (wire forms, message CIDs)
//!     → wallet.rs (key loading, signing)
//!     → methods.rs (typed parameter encoding per actor method)
//!     → send pipeline (build, check, sign, push)
//! ```
//!
//! # Security Constraints
//! - Private keys never leave the keystore directory
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod address;
pub mod amount;
pub mod cid;
pub mod client;
pub mod encoding;
pub mod methods;
pub mod node;
pub mod types;
pub mod wallet;

pub use address::{Address, Protocol};
pub use amount::TokenAmount;
pub use cid::Cid;
pub use client::{ApiInfo, RpcNode};
pub use node::{FullNode, WalletApi};
pub use types::{
    Actor, CheckBatch, CheckStatus, CheckStatusCode, LedgerError, LedgerResult, Message,
    MessageId, MessagePrototype, MethodNum, Signature, SignatureType, SignedMessage,
};
pub use wallet::{LocalWallet, WalletBackend};
