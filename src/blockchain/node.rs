//! Collaborator interfaces consumed by the send pipeline.

use crate::blockchain::address::Address;
use crate::blockchain::types::{
    Actor, CheckBatch, LedgerResult, Message, MessageId, MessagePrototype, SignedMessage,
};

/// Procedural API of a remote full node.
///
/// Every call is one round-trip; timeouts are the implementation's concern.
#[allow(async_fn_in_trait)]
pub trait FullNode {
    /// Look up actor state by address.
    async fn state_get_actor(&self, address: &Address) -> LedgerResult<Actor>;

    /// Validate a prototype in isolation.
    async fn check_message(&self, prototype: &MessagePrototype) -> LedgerResult<CheckBatch>;

    /// Validate every pending message of `from` currently in the mempool.
    async fn check_pending_messages(&self, from: &Address) -> LedgerResult<CheckBatch>;

    /// Fill premium, fee cap and gas limit for a draft message.
    async fn estimate_message_gas(&self, message: &Message) -> LedgerResult<Message>;

    /// Push an already signed message. The node must keep its nonce.
    async fn push_signed(&self, message: &SignedMessage) -> LedgerResult<MessageId>;

    /// Sign with the node's wallet and push, letting the node assign the nonce.
    async fn sign_and_push(&self, message: &Message) -> LedgerResult<SignedMessage>;

    /// Default address of the node's own wallet.
    async fn wallet_default_address(&self) -> LedgerResult<Option<Address>>;

    /// Whether the node's wallet holds the key for `address`.
    async fn wallet_has(&self, address: &Address) -> LedgerResult<bool>;
}

/// Key custody calls used by the pipeline.
#[allow(async_fn_in_trait)]
pub trait WalletApi {
    async fn list_addresses(&self) -> LedgerResult<Vec<Address>>;

    /// The configured default sending address, if any.
    async fn default_address(&self) -> LedgerResult<Option<Address>>;

    async fn sign_message(&self, from: &Address, message: &Message) -> LedgerResult<SignedMessage>;
}
