//! Errors of a send attempt.

use thiserror::Error;

use crate::blockchain::address::Address;
use crate::blockchain::methods::MethodError;
use crate::blockchain::types::{CheckBatch, LedgerError};

/// Why a send attempt ended without a pushed message.
#[derive(Debug, Error)]
pub enum SendError {
    /// At least one check failed; carries both batches verbatim.
    #[error("check has failed")]
    ChecksFailed(Vec<CheckBatch>),

    /// The user declined a prompt or aborted the fee editor.
    #[error("aborted by user")]
    AbortedByUser,

    #[error("estimating gas: {0}")]
    GasEstimation(#[source] LedgerError),

    #[error("running checks: {0}")]
    CheckTransport(#[source] LedgerError),

    #[error("signing message: {0}")]
    Sign(#[source] LedgerError),

    #[error("pushing message: {0}")]
    Push(#[source] LedgerError),

    #[error("no default address configured in the wallet")]
    NoDefaultAddress,

    #[error("looking up default address: {0}")]
    WalletLookup(#[source] LedgerError),

    /// The node would sign, but its wallet does not hold the sender's key.
    #[error(
        "the node's wallet has no key for {0}, so it cannot sign and assign the nonce; \
         set an explicit nonce to sign with the local wallet"
    )]
    NodeKeyMissing(Address),

    #[error("querying node wallet: {0}")]
    NodeWallet(#[source] LedgerError),

    #[error("invalid fee input: {0}")]
    InvalidFeeInput(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(#[source] LedgerError),

    #[error("looking up actor: {0}")]
    ActorLookup(#[source] LedgerError),

    #[error(transparent)]
    Method(#[from] MethodError),

    #[error("terminal I/O: {0}")]
    Console(#[from] std::io::Error),
}

impl SendError {
    /// Failing check batches, when this is a check failure.
    pub fn failed_checks(&self) -> Option<&[CheckBatch]> {
        match self {
            Self::ChecksFailed(batches) => Some(batches),
            _ => None,
        }
    }
}

/// Result type for send operations.
pub type SendResult<T> = Result<T, SendError>;
