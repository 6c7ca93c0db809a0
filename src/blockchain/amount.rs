//! Token amounts in atto units and their decimal text forms.
//!
//! All amount math stays in arbitrary-precision integers; the decimal
//! representation only exists at the edges (user input, display, wire).

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serializer};

use crate::blockchain::types::{LedgerError, LedgerResult};

/// Amount of the native token in atto units (10^-18 FIL).
pub type TokenAmount = BigUint;

/// Number of decimal places between FIL and attoFIL.
pub const FIL_DECIMALS: usize = 18;

const NANO_DECIMALS: usize = 9;

/// Parse a user supplied FIL amount.
///
/// Accepts `1`, `0.25`, `1.5 FIL` and integer atto amounts such as `100 attofil`.
pub fn parse_fil(text: &str) -> LedgerResult<TokenAmount> {
    let lower = text.trim().to_ascii_lowercase();

    if let Some(atto) = lower.strip_suffix("attofil") {
        let atto = atto.trim();
        if atto.is_empty() || !atto.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(text, "expected an integer atto amount"));
        }
        return BigUint::parse_bytes(atto.as_bytes(), 10)
            .ok_or_else(|| invalid(text, "expected an integer atto amount"));
    }

    let number = lower.strip_suffix("fil").unwrap_or(&lower).trim();
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid(text, "empty amount"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(text, "not a decimal number"));
    }
    if fraction.len() > FIL_DECIMALS {
        return Err(invalid(text, "more than 18 decimal places"));
    }

    let digits = format!("{}{:0<width$}", whole, fraction, width = FIL_DECIMALS);
    BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| invalid(text, "not a decimal number"))
}

/// Render an amount as unitless FIL, e.g. `1.5` or `0`.
pub fn format_fil(amount: &TokenAmount) -> String {
    format_decimal(amount, FIL_DECIMALS)
}

/// Render an amount in nanoFIL, e.g. `0.0000001 nFIL` for 100 attoFIL.
pub fn format_nano(amount: &TokenAmount) -> String {
    format!("{} nFIL", format_decimal(amount, NANO_DECIMALS))
}

fn format_decimal(amount: &TokenAmount, decimals: usize) -> String {
    let digits = amount.to_str_radix(10);
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

fn invalid(text: &str, reason: &str) -> LedgerError {
    LedgerError::InvalidAmount(format!("'{}': {}", text.trim(), reason))
}

/// Serde adapter carrying amounts as decimal atto strings on the wire.
pub mod serde_amount {
    use super::*;

    pub fn serialize<S: Serializer>(amount: &TokenAmount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TokenAmount, D::Error> {
        let text = String::deserialize(deserializer)?;
        BigUint::parse_bytes(text.as_bytes(), 10)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount '{}'", text)))
    }
}
