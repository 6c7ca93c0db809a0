//! Interactive resolution of failed checks.

mod common;

use lotus_tools::blockchain::{Cid, CheckStatus, CheckStatusCode};
use lotus_tools::send::{SendError, SendOptions};
use num_bigint::BigUint;
use std::sync::{Arc, Mutex};

use common::*;

const OFFER: &str = "Fee of the message can be adjusted";
const EDITOR: &str = "Current Maximum Fee:";

const INTERACTIVE: SendOptions = SendOptions {
    force: false,
    interactive: true,
};

fn balance_failure() -> Verdict {
    Verdict::Fail(CheckStatusCode::MessageBalance, "not enough funds")
}

fn own_checks(log: &Arc<Mutex<Vec<Call>>>) -> Vec<BigUint> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|c| match c {
            Call::CheckMessage { fee_cap } => Some(fee_cap.clone()),
            _ => None,
        })
        .collect()
}

fn pushed(log: &Arc<Mutex<Vec<Call>>>) -> Option<Call> {
    log.lock()
        .unwrap()
        .iter()
        .find(|c| matches!(c, Call::SignAndPush { .. } | Call::PushSigned { .. }))
        .cloned()
}

async fn send(node: MockNode, lines: &[&str]) -> (Result<(), SendError>, ScriptedConsole) {
    let service = service(node);
    let proto = service.message_for_send(transfer(5)).await.unwrap();
    let mut console = ScriptedConsole::new(lines);
    let result = service
        .interactive_send(proto, INTERACTIVE, &mut console)
        .await
        .map(|_| ());
    (result, console)
}

#[tokio::test]
async fn test_unfixable_failure_goes_to_confirmation() {
    let node = MockNode::new().script_checks(vec![balance_failure()]);
    let log = node.call_log();

    let (result, console) = send(node, &["y"]).await;

    result.unwrap();
    assert!(console.printed("Following checks have failed:"));
    assert!(!console.printed(OFFER));
    assert!(!console.printed(EDITOR));
    assert_eq!(own_checks(&log).len(), 1);
    assert_eq!(
        pushed(&log),
        Some(Call::SignAndPush {
            fee_cap: BigUint::from(ESTIMATED_FEE_CAP)
        })
    );
}

#[tokio::test]
async fn test_both_batches_failing_without_fee_codes() {
    let pending = Cid::from_cbor(&[0x43]);
    let node = MockNode::new()
        .script_checks(vec![
            Verdict::Fail(CheckStatusCode::MessageNonce, "nonce too low"),
            balance_failure(),
        ])
        .with_pending(vec![CheckStatus::failed(
            pending.clone(),
            CheckStatusCode::MessageGetStateBalance,
            "actor not found",
        )]);
    let log = node.call_log();

    let (result, console) = send(node, &["y"]).await;

    result.unwrap();
    assert!(console.printed("current message failed a check MessageNonce: nonce too low"));
    assert!(console.printed("current message failed a check MessageBalance: not enough funds"));
    assert!(console.printed(&format!(
        "{} message failed a check MessageGetStateBalance: actor not found",
        pending
    )));
    assert!(!console.printed(OFFER));
    assert!(!console.printed(EDITOR));
    assert!(console.printed("Do you wish to send this message? [yes/No]: "));
    assert_eq!(own_checks(&log).len(), 1);
    assert_eq!(
        pushed(&log),
        Some(Call::SignAndPush {
            fee_cap: BigUint::from(ESTIMATED_FEE_CAP)
        })
    );
}

#[tokio::test]
async fn test_confirmation_defaults_to_no() {
    let node = MockNode::new().script_checks(vec![balance_failure()]);
    let log = node.call_log();

    let (result, console) = send(node, &[""]).await;

    assert!(matches!(result, Err(SendError::AbortedByUser)));
    assert!(console.printed("Do you wish to send this message? [yes/No]: "));
    assert_eq!(pushed(&log), None);
}

#[tokio::test]
async fn test_end_of_input_declines_sending() {
    let node = MockNode::new().script_checks(vec![balance_failure()]);
    let (result, _) = send(node, &[]).await;
    assert!(matches!(result, Err(SendError::AbortedByUser)));
}

#[tokio::test]
async fn test_safe_fee_is_applied_and_rechecked() {
    let node = MockNode::new().script_checks(vec![Verdict::BaseFee(200)]);
    let log = node.call_log();

    // accept the offer by default, pick the safe fee, commit, send
    let (result, console) = send(node, &["", "s", "", "y"]).await;

    result.unwrap();
    assert!(console.printed(OFFER));
    assert!(console.printed("Do you wish to do that? [Yes/no]: "));
    assert_eq!(console.count(EDITOR), 2);
    assert!(console.printed("All checks passed"));

    // safe = 10 × 200 × 1M, spread over the 1M gas limit
    let adjusted = BigUint::from(2_000u32);
    assert_eq!(
        own_checks(&log),
        vec![BigUint::from(ESTIMATED_FEE_CAP), adjusted.clone()]
    );
    assert_eq!(pushed(&log), Some(Call::SignAndPush { fee_cap: adjusted }));
    // No second gas estimate after the edit.
    assert_eq!(
        log.lock()
            .unwrap()
            .iter()
            .filter(|c| **c == Call::Estimate)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_missing_hint_uses_minimum_base_fee() {
    let node = MockNode::new().script_checks(vec![Verdict::Fail(
        CheckStatusCode::MessageMinBaseFee,
        "fee cap below the minimum base fee",
    )]);
    let log = node.call_log();

    let (result, console) = send(node, &["y", "s", "", "y"]).await;

    result.unwrap();
    assert!(console.printed("Current Base Fee is: 0.0000001 nFIL"));
    assert_eq!(
        pushed(&log),
        Some(Call::SignAndPush {
            fee_cap: BigUint::from(1_000u32)
        })
    );
}

#[tokio::test]
async fn test_invalid_text_commits_last_valid_fee() {
    let node = MockNode::new().script_checks(vec![Verdict::BaseFee(100)]);
    let log = node.call_log();

    let (result, console) = send(node, &["", "not a number", "", "y"]).await;

    result.unwrap();
    assert!(console.printed("invalid price"));
    let estimated = BigUint::from(ESTIMATED_FEE_CAP);
    assert_eq!(own_checks(&log), vec![estimated.clone(), estimated.clone()]);
    assert_eq!(pushed(&log), Some(Call::SignAndPush { fee_cap: estimated }));
}

#[tokio::test]
async fn test_editor_abort() {
    let node = MockNode::new().script_checks(vec![Verdict::BaseFee(100)]);
    let log = node.call_log();

    let (result, _) = send(node, &["", "q"]).await;

    assert!(matches!(result, Err(SendError::AbortedByUser)));
    assert_eq!(own_checks(&log).len(), 1);
    assert_eq!(pushed(&log), None);
}

#[tokio::test]
async fn test_editor_end_of_input_aborts() {
    let node = MockNode::new().script_checks(vec![Verdict::BaseFee(100)]);
    let (result, _) = send(node, &[""]).await;
    assert!(matches!(result, Err(SendError::AbortedByUser)));
}

#[tokio::test]
async fn test_declined_offer_skips_recheck() {
    let node = MockNode::new().script_checks(vec![Verdict::BaseFee(100)]);
    let log = node.call_log();

    let (result, console) = send(node, &["n", "y"]).await;

    result.unwrap();
    assert!(!console.printed(EDITOR));
    assert_eq!(own_checks(&log).len(), 1);
    assert_eq!(
        pushed(&log),
        Some(Call::SignAndPush {
            fee_cap: BigUint::from(ESTIMATED_FEE_CAP)
        })
    );
}

#[tokio::test]
async fn test_still_failing_after_recheck() {
    let node = MockNode::new()
        .script_checks(vec![Verdict::BaseFee(100)])
        .script_checks(vec![Verdict::BaseFee(100)]);
    let log = node.call_log();

    let (result, console) = send(node, &["", "s", "", "n", "y"]).await;

    result.unwrap();
    assert!(console.printed("Following checks still failed:"));
    assert_eq!(console.count(OFFER), 2);
    assert_eq!(own_checks(&log).len(), 2);
    assert_eq!(
        pushed(&log),
        Some(Call::SignAndPush {
            fee_cap: BigUint::from(1_000u32)
        })
    );
}

#[tokio::test]
async fn test_recheck_transport_error() {
    let node = MockNode::new()
        .script_checks(vec![Verdict::BaseFee(100)])
        .script_check_transport_error();
    let log = node.call_log();

    let (result, _) = send(node, &["", "s", ""]).await;

    assert!(matches!(result, Err(SendError::CheckTransport(_))));
    assert_eq!(pushed(&log), None);
}

#[tokio::test]
async fn test_fee_failure_of_other_message_is_not_offered() {
    let other = Cid::from_cbor(&[0x42]);
    let node = MockNode::new().with_pending(vec![CheckStatus::failed(
        other,
        CheckStatusCode::MessageBaseFee,
        "fee cap below the current base fee",
    )
    .with_hint("baseFee", "300")]);

    let (result, console) = send(node, &["y"]).await;

    result.unwrap();
    assert!(!console.printed(OFFER));
}

#[tokio::test]
async fn test_gas_estimation_failure_is_not_resolved() {
    let node = MockNode::new().failing_estimate();
    let (result, console) = send(node, &["y"]).await;

    assert!(matches!(result, Err(SendError::GasEstimation(_))));
    assert!(console.output.is_empty());
}
