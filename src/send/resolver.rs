//! Interactive resolution of failed checks.
//!
//! ```text
//! Report ──(fee-adjustable failure)──▶ Offer ──yes──▶ Edit ──commit──▶ ReCheck
//!   │                                    │              │                 │
//!   │                                    no           abort           passed/failed
//!   ▼                                    ▼              ▼                 ▼
//! Confirm ◀──────────────────────────────┘        AbortedByUser   Confirm / Report
//!   ├─ yes ─▶ resolved
//!   └─ no  ─▶ AbortedByUser
//! ```

use crate::blockchain::amount::TokenAmount;
use crate::blockchain::node::FullNode;
use crate::blockchain::types::{CheckBatch, MessagePrototype};
use crate::send::checks::{all_passed, print_checks, run_checks};
use crate::send::console::Console;
use crate::send::editor::{run_fee_editor, FeeNegotiation};
use crate::send::error::{SendError, SendResult};
use crate::send::fee;

const ADJUST_QUESTION: &str = "Do you wish to do that? [Yes/no]: ";
const SEND_QUESTION: &str = "Do you wish to send this message? [yes/No]: ";

#[derive(Debug)]
enum Stage {
    Report {
        batches: Vec<CheckBatch>,
        rechecked: bool,
    },
    Offer {
        base_fee: TokenAmount,
    },
    Edit {
        base_fee: TokenAmount,
    },
    ReCheck,
    Confirm,
}

/// Walk the user through failed checks.
///
/// On success the prototype (possibly with a rewritten fee cap) is cleared
/// for publishing; otherwise the attempt ends with [`SendError::AbortedByUser`]
/// or a transport error from re-checking.
pub async fn resolve_checks<N: FullNode, C: Console>(
    node: &N,
    console: &mut C,
    prototype: &mut MessagePrototype,
    batches: Vec<CheckBatch>,
) -> SendResult<()> {
    let mut stage = Stage::Report {
        batches,
        rechecked: false,
    };

    loop {
        stage = match stage {
            Stage::Report { batches, rechecked } => {
                console.print(if rechecked {
                    "Following checks still failed:"
                } else {
                    "Following checks have failed:"
                })?;
                let current = prototype.message.cid();
                print_checks(console, &batches, &current)?;

                match fee::fee_adjustment(&batches, &current) {
                    Some(base_fee) => Stage::Offer { base_fee },
                    None => Stage::Confirm,
                }
            }
            Stage::Offer { base_fee } => {
                console.print("Fee of the message can be adjusted")?;
                if console.ask(ADJUST_QUESTION, true)? {
                    Stage::Edit { base_fee }
                } else {
                    Stage::Confirm
                }
            }
            Stage::Edit { base_fee } => {
                let negotiation = FeeNegotiation::new(
                    base_fee,
                    prototype.message.gas_limit,
                    &prototype.message.gas_fee_cap,
                );
                let agreed = run_fee_editor(console, negotiation)?;
                let fee_cap = agreed.fee_cap();

                tracing::info!(
                    old_fee_cap = %prototype.message.gas_fee_cap,
                    new_fee_cap = %fee_cap,
                    "Fee cap adjusted"
                );
                prototype.message.gas_fee_cap = fee_cap;
                Stage::ReCheck
            }
            Stage::ReCheck => {
                let batches = run_checks(node, prototype).await?;
                if all_passed(&batches) {
                    console.print("All checks passed")?;
                    Stage::Confirm
                } else {
                    Stage::Report {
                        batches,
                        rechecked: true,
                    }
                }
            }
            Stage::Confirm => {
                if console.ask(SEND_QUESTION, false)? {
                    return Ok(());
                }
                return Err(SendError::AbortedByUser);
            }
        };
    }
}
