//! Static method table for typed call parameters.
//!
//! Maps `(actor code, method number)` to the method's name and the schema of
//! its parameters and return value. Parameters given as JSON on the command
//! line are validated against the schema and re-encoded as DAG-CBOR, the
//! form actors read their parameters in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::address::Address;
use crate::blockchain::amount::{serde_amount, TokenAmount};
use crate::blockchain::encoding::CborWriter;
use crate::blockchain::types::MethodNum;

/// Code id of the storage miner actor.
pub const MINER_ACTOR_CODE: &str = "bafk2bzacebkjnjp5okqjhjxzft5qkuv36u4tz7inawseiwi2kw4j43xpxvhpm";

/// Shape of a method's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSchema {
    Empty,
    Address,
    WithdrawBalance,
}

/// Shape of a method's return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnSchema {
    Empty,
    TokenAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodMeta {
    pub name: &'static str,
    pub params: ParamSchema,
    pub ret: ReturnSchema,
}

const MINER_METHODS: &[(MethodNum, MethodMeta)] = &[
    (
        16,
        MethodMeta {
            name: "WithdrawBalance",
            params: ParamSchema::WithdrawBalance,
            ret: ReturnSchema::TokenAmount,
        },
    ),
    (
        23,
        MethodMeta {
            name: "ChangeOwnerAddress",
            params: ParamSchema::Address,
            ret: ReturnSchema::Empty,
        },
    ),
];

/// Parameters of the miner's `WithdrawBalance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct WithdrawBalanceParams {
    #[serde(with = "serde_amount")]
    pub amount_requested: TokenAmount,
}

#[derive(Debug, Error)]
pub enum MethodError {
    #[error("method {method} not found on actor {code}")]
    UnknownMethod { code: String, method: MethodNum },

    #[error("unmarshaling input into params type: {0}")]
    InvalidParams(String),
}

/// Lookup table keyed by actor code.
#[derive(Debug, Clone)]
pub struct MethodTable {
    miner_codes: Vec<String>,
}

impl Default for MethodTable {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl MethodTable {
    /// Build the table; `extra_miner_codes` are treated as miner actors too.
    pub fn new(extra_miner_codes: &[String]) -> Self {
        let mut miner_codes = vec![MINER_ACTOR_CODE.to_string()];
        for code in extra_miner_codes {
            if !miner_codes.contains(code) {
                miner_codes.push(code.clone());
            }
        }
        Self { miner_codes }
    }

    pub fn lookup(&self, code: &str, method: MethodNum) -> Option<&'static MethodMeta> {
        if !self.miner_codes.iter().any(|c| c == code) {
            return None;
        }
        MINER_METHODS
            .iter()
            .find(|(num, _)| *num == method)
            .map(|(_, meta)| meta)
    }

    /// Validate JSON parameters for a method and encode them.
    pub fn encode_params(
        &self,
        code: &str,
        method: MethodNum,
        json: &str,
    ) -> Result<Vec<u8>, MethodError> {
        let meta = self.lookup(code, method).ok_or_else(|| MethodError::UnknownMethod {
            code: code.to_string(),
            method,
        })?;

        let invalid = |e: serde_json::Error| MethodError::InvalidParams(e.to_string());
        let encoded = match meta.params {
            ParamSchema::Empty => {
                let value: serde_json::Value = serde_json::from_str(json).map_err(invalid)?;
                if !(value.is_null() || value.as_object().is_some_and(|o| o.is_empty())) {
                    return Err(MethodError::InvalidParams(format!(
                        "{} takes no parameters",
                        meta.name
                    )));
                }
                Vec::new()
            }
            ParamSchema::Address => {
                let address: Address = serde_json::from_str(json).map_err(invalid)?;
                CborWriter::new().bytes(&address.to_bytes()).finish()
            }
            ParamSchema::WithdrawBalance => {
                let params: WithdrawBalanceParams = serde_json::from_str(json).map_err(invalid)?;
                CborWriter::new()
                    .array(1)
                    .bigint(&params.amount_requested)
                    .finish()
            }
        };

        tracing::debug!(method = meta.name, bytes = encoded.len(), "Encoded call parameters");
        Ok(encoded)
    }
}
