//! Message prototype construction.
//!
//! The default sender comes from whichever wallet will sign: the node's when
//! the node assigns the nonce, the local one when the caller fixed it.

use crate::blockchain::address::Address;
use crate::blockchain::amount::TokenAmount;
use crate::blockchain::node::{FullNode, WalletApi};
use crate::blockchain::types::{Message, MessagePrototype, MethodNum};
use crate::send::error::{SendError, SendResult};

/// User supplied parameters of a send.
#[derive(Debug, Clone, Default)]
pub struct SendParams {
    pub to: Address,
    /// Sender; the signing wallet's default address when `None`.
    pub from: Option<Address>,
    pub value: TokenAmount,
    pub method: MethodNum,
    pub params: Vec<u8>,
    pub gas_premium: Option<TokenAmount>,
    pub gas_fee_cap: Option<TokenAmount>,
    pub gas_limit: Option<u64>,
    /// Explicit nonce; pushed verbatim when set.
    pub nonce: Option<u64>,
}

/// Build the prototype for a send.
///
/// Only touches a wallet, and only when no sender was given.
pub async fn message_for_send<N: FullNode, W: WalletApi>(
    node: &N,
    wallet: &W,
    params: SendParams,
) -> SendResult<MessagePrototype> {
    let from = match params.from {
        Some(from) => from,
        None => {
            let default = if params.nonce.is_some() {
                wallet.default_address().await
            } else {
                node.wallet_default_address().await
            };
            default
                .map_err(SendError::WalletLookup)?
                .ok_or(SendError::NoDefaultAddress)?
        }
    };

    let message = Message {
        from,
        to: params.to,
        value: params.value,
        method: params.method,
        params: params.params,
        gas_premium: params.gas_premium.unwrap_or_default(),
        gas_fee_cap: params.gas_fee_cap.unwrap_or_default(),
        gas_limit: params.gas_limit.unwrap_or(0),
        nonce: params.nonce.unwrap_or(0),
        ..Default::default()
    };

    Ok(MessagePrototype {
        message,
        valid_nonce: params.nonce.is_some(),
    })
}
