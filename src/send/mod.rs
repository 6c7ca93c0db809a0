//! Message send pipeline.
//!
//! # Data Flow
//! ```text
//! SendParams
//!     → prototype.rs (fill defaults, resolve sender)
//!     → publisher.rs (gas estimate)
//!     → checks.rs (own batch + pending batch)
//!     → [failed, interactive] resolver.rs ⇄ editor.rs (fee negotiation)
//!     → publisher.rs (sign + push)
//! ```
//!
//! # Design Decisions
//! - One attempt in flight; every node call is awaited in sequence
//! - Check failure is a tagged error carrying both batches
//! - A declined prompt or aborted editor never reaches the node's mempool

pub mod checks;
pub mod console;
pub mod editor;
pub mod error;
pub mod fee;
pub mod prototype;
pub mod publisher;
pub mod resolver;

use crate::blockchain::address::Address;
use crate::blockchain::methods::MethodTable;
use crate::blockchain::node::{FullNode, WalletApi};
use crate::blockchain::types::{CheckBatch, MessagePrototype, MethodNum};

pub use console::{Console, StdConsole};
pub use error::{SendError, SendResult};
pub use prototype::SendParams;
pub use publisher::{PushedMessage, Publisher};

/// Mode switches of a send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Skip all checks and prompts.
    pub force: bool,
    /// Resolve failed checks with the user instead of failing.
    pub interactive: bool,
}

/// Entry point tying node, wallet and method table together.
pub struct SendService<N, W> {
    node: N,
    wallet: W,
    methods: MethodTable,
}

impl<N: FullNode, W: WalletApi> SendService<N, W> {
    pub fn new(node: N, wallet: W, methods: MethodTable) -> Self {
        Self {
            node,
            wallet,
            methods,
        }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn publisher(&self) -> Publisher<'_, N, W> {
        Publisher::new(&self.node, &self.wallet)
    }

    pub async fn message_for_send(&self, params: SendParams) -> SendResult<MessagePrototype> {
        prototype::message_for_send(&self.node, &self.wallet, params).await
    }

    pub async fn run_checks(&self, prototype: &MessagePrototype) -> SendResult<Vec<CheckBatch>> {
        checks::run_checks(&self.node, prototype).await
    }

    pub async fn publish(
        &self,
        prototype: &mut MessagePrototype,
        force: bool,
    ) -> SendResult<PushedMessage> {
        self.publisher().publish(prototype, force).await
    }

    pub async fn push(&self, prototype: &MessagePrototype) -> SendResult<PushedMessage> {
        self.publisher().push(prototype).await
    }

    /// Encode JSON call parameters for `method` on the actor at `to`.
    pub async fn decode_params(
        &self,
        to: &Address,
        method: MethodNum,
        json: &str,
    ) -> SendResult<Vec<u8>> {
        let actor = self
            .node
            .state_get_actor(to)
            .await
            .map_err(SendError::ActorLookup)?;
        tracing::debug!(address = %to, code = %actor.code, method = method, "Actor resolved");
        Ok(self
            .methods
            .encode_params(&actor.code.to_string(), method, json)?)
    }

    /// Publish a prototype, resolving failed checks with the user if asked to.
    pub async fn interactive_send<C: Console>(
        &self,
        mut prototype: MessagePrototype,
        options: SendOptions,
        console: &mut C,
    ) -> SendResult<PushedMessage> {
        let publisher = self.publisher();

        match publisher.publish(&mut prototype, options.force).await {
            Err(SendError::ChecksFailed(batches)) if options.interactive => {
                resolver::resolve_checks(&self.node, console, &mut prototype, batches).await?;
                // The resolved fee cap must survive, so no second estimate.
                publisher.push(&prototype).await
            }
            Err(SendError::ChecksFailed(batches)) => {
                console.print("Following checks have failed:")?;
                checks::print_checks(console, &batches, &prototype.message.cid())?;
                Err(SendError::ChecksFailed(batches))
            }
            other => other,
        }
    }
}
