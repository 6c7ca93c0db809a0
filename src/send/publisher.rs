//! Gas estimation, validation, signing and push.
//!
//! # Responsibilities
//! - Let the node estimate gas for the prototype
//! - Refuse to publish while any check fails (unless forced)
//! - Sign locally and push when the caller fixed the nonce
//! - Otherwise let the node sign, assign the nonce and push, provided its
//!   wallet holds the sender's key

use crate::blockchain::node::{FullNode, WalletApi};
use crate::blockchain::types::{MessageId, MessagePrototype, SignedMessage};
use crate::send::checks::{all_passed, run_checks};
use crate::send::error::{SendError, SendResult};

/// A message accepted by the node's mempool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedMessage {
    /// Id under which the node tracks the message.
    pub id: MessageId,
    pub signed: SignedMessage,
}

/// Publishes prototypes through a node and a wallet.
pub struct Publisher<'a, N, W> {
    node: &'a N,
    wallet: &'a W,
}

impl<'a, N: FullNode, W: WalletApi> Publisher<'a, N, W> {
    pub fn new(node: &'a N, wallet: &'a W) -> Self {
        Self { node, wallet }
    }

    /// Estimate, check and push a prototype.
    ///
    /// The estimate overwrites premium, fee cap and gas limit. With `force`
    /// the checks are skipped entirely. Nothing is retried.
    pub async fn publish(
        &self,
        prototype: &mut MessagePrototype,
        force: bool,
    ) -> SendResult<PushedMessage> {
        self.ensure_signer(prototype).await?;

        let estimated = self
            .node
            .estimate_message_gas(&prototype.message)
            .await
            .map_err(SendError::GasEstimation)?;

        prototype.message.gas_premium = estimated.gas_premium;
        prototype.message.gas_fee_cap = estimated.gas_fee_cap;
        prototype.message.gas_limit = estimated.gas_limit;

        tracing::debug!(
            gas_limit = prototype.message.gas_limit,
            fee_cap = %prototype.message.gas_fee_cap,
            premium = %prototype.message.gas_premium,
            "Gas estimated"
        );

        if !force {
            let batches = run_checks(self.node, prototype).await?;
            if !all_passed(&batches) {
                return Err(SendError::ChecksFailed(batches));
            }
        }

        self.submit(prototype).await
    }

    /// Sign and push a prototype as is.
    pub async fn push(&self, prototype: &MessagePrototype) -> SendResult<PushedMessage> {
        self.ensure_signer(prototype).await?;
        self.submit(prototype).await
    }

    /// Without a fixed nonce the node signs, so it must hold the sender's key.
    async fn ensure_signer(&self, prototype: &MessagePrototype) -> SendResult<()> {
        if prototype.valid_nonce {
            return Ok(());
        }
        let from = &prototype.message.from;
        let held = self
            .node
            .wallet_has(from)
            .await
            .map_err(SendError::NodeWallet)?;
        if !held {
            tracing::warn!(from = %from, "Node wallet does not hold the sender key");
            return Err(SendError::NodeKeyMissing(from.clone()));
        }
        Ok(())
    }

    async fn submit(&self, prototype: &MessagePrototype) -> SendResult<PushedMessage> {
        let message = &prototype.message;

        let pushed = if prototype.valid_nonce {
            let signed = self
                .wallet
                .sign_message(&message.from, message)
                .await
                .map_err(SendError::Sign)?;
            let id = self
                .node
                .push_signed(&signed)
                .await
                .map_err(SendError::Push)?;
            PushedMessage { id, signed }
        } else {
            let signed = self
                .node
                .sign_and_push(message)
                .await
                .map_err(SendError::Push)?;
            PushedMessage {
                id: signed.cid(),
                signed,
            }
        };

        tracing::info!(
            id = %pushed.id,
            from = %pushed.signed.message.from,
            to = %pushed.signed.message.to,
            nonce = pushed.signed.message.nonce,
            "Message pushed"
        );

        Ok(pushed)
    }
}
