//! Pre-submission checks against the node.

use crate::blockchain::node::FullNode;
use crate::blockchain::types::{CheckBatch, CheckStatus, MessageId, MessagePrototype};
use crate::send::console::Console;
use crate::send::error::{SendError, SendResult};

/// Run both check batches for a prototype.
///
/// Returns `[own, pending]`: the prototype checked in isolation, then every
/// pending message of the sender. Batches are returned verbatim.
pub async fn run_checks<N: FullNode>(
    node: &N,
    prototype: &MessagePrototype,
) -> SendResult<Vec<CheckBatch>> {
    let own = node
        .check_message(prototype)
        .await
        .map_err(SendError::CheckTransport)?;

    let pending = node
        .check_pending_messages(&prototype.message.from)
        .await
        .map_err(SendError::CheckTransport)?;

    tracing::debug!(
        own = own.len(),
        pending = pending.len(),
        failed = own.iter().chain(&pending).filter(|c| !c.ok).count(),
        "Checks completed"
    );

    Ok(vec![own, pending])
}

pub fn all_passed(batches: &[CheckBatch]) -> bool {
    batches.iter().flatten().all(|c| c.ok)
}

/// Failing checks across all batches, in batch order.
pub fn failing(batches: &[CheckBatch]) -> impl Iterator<Item = &CheckStatus> {
    batches.iter().flatten().filter(|c| !c.ok)
}

/// One report line per failing check.
///
/// Checks about `current` are labelled as the current message; others carry
/// the id of the pending message they concern.
pub fn describe_failures(batches: &[CheckBatch], current: &MessageId) -> Vec<String> {
    failing(batches)
        .map(|c| {
            let name = if c.subject == *current {
                "current".to_string()
            } else {
                c.subject.to_string()
            };
            format!("{} message failed a check {}: {}", name, c.code, c.message)
        })
        .collect()
}

pub fn print_checks<C: Console>(
    console: &mut C,
    batches: &[CheckBatch],
    current: &MessageId,
) -> std::io::Result<()> {
    for line in describe_failures(batches, current) {
        tracing::warn!(check = %line, "Message check failed");
        console.print(&line)?;
    }
    Ok(())
}
