//! Fee thresholds and adjustment steps.
//!
//! Pure functions over arbitrary-precision integers. `increase` and
//! `decrease` are approximate ±10% steps; under integer truncation they are
//! not exact inverses of each other.

use num_bigint::BigUint;
use num_traits::Zero;
use serde_json::{Map, Value};

use crate::blockchain::amount::TokenAmount;
use crate::blockchain::types::{CheckBatch, CheckStatusCode, MessageId};

/// Network minimum base fee in atto units, used when no check hints one.
pub const MINIMUM_BASE_FEE: u64 = 100;

/// Hint key under which the node reports the observed base fee.
pub const BASE_FEE_HINT: &str = "baseFee";

pub fn minimum_base_fee() -> TokenAmount {
    BigUint::from(MINIMUM_BASE_FEE)
}

/// Smallest total fee that covers `gas_limit` at `base_fee`.
pub fn required(base_fee: &TokenAmount, gas_limit: u64) -> TokenAmount {
    base_fee * gas_limit
}

/// Total fee with headroom for base fee growth.
pub fn safe(required: &TokenAmount) -> TokenAmount {
    required * 10u32
}

pub fn increase(fee: &TokenAmount) -> TokenAmount {
    fee * 11u32 / 10u32
}

pub fn decrease(fee: &TokenAmount) -> TokenAmount {
    fee * 10u32 / 11u32
}

/// Whether raising the fee cap can fix a failure of this kind.
pub fn is_fee_adjustable(code: CheckStatusCode) -> bool {
    matches!(
        code,
        CheckStatusCode::MessageMinBaseFee
            | CheckStatusCode::MessageBaseFee
            | CheckStatusCode::MessageBaseFeeLowerBound
            | CheckStatusCode::MessageBaseFeeUpperBound
    )
}

/// Observed base fee from a check hint, zero when absent or malformed.
pub fn base_fee_from_hint(hint: Option<&Map<String, Value>>) -> TokenAmount {
    hint.and_then(|h| h.get(BASE_FEE_HINT))
        .and_then(Value::as_str)
        .and_then(|s| BigUint::parse_bytes(s.as_bytes(), 10))
        .unwrap_or_default()
}

/// Decide whether a fee adjustment should be offered for `subject`.
///
/// Returns the base fee to negotiate against: the first non-zero hinted
/// base fee among fee-adjustable failures of `subject` in batch order,
/// falling back to [`MINIMUM_BASE_FEE`].
pub fn fee_adjustment(batches: &[CheckBatch], subject: &MessageId) -> Option<TokenAmount> {
    let mut adjustable = false;
    let mut base_fee = TokenAmount::zero();

    let relevant = batches
        .iter()
        .flatten()
        .filter(|c| !c.ok && c.subject == *subject && is_fee_adjustable(c.code));
    for check in relevant {
        adjustable = true;
        if base_fee.is_zero() {
            base_fee = base_fee_from_hint(check.hint.as_ref());
        }
    }

    if !adjustable {
        return None;
    }
    // Only a min-base-fee failure comes without a hint.
    if base_fee.is_zero() {
        base_fee = minimum_base_fee();
    }
    Some(base_fee)
}
