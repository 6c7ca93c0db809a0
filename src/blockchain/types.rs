//! Ledger message types and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::blockchain::address::Address;
use crate::blockchain::amount::{serde_amount, TokenAmount};
use crate::blockchain::cid::Cid;
use crate::blockchain::encoding::{serde_base64, CborWriter};

/// Numeric selector of an actor method. `0` is a plain value transfer.
pub type MethodNum = u64;

/// Content identifier of a message.
pub type MessageId = Cid;

/// An unsigned message as understood by the node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub version: u64,
    pub to: Address,
    pub from: Address,
    pub nonce: u64,
    #[serde(with = "serde_amount")]
    pub value: TokenAmount,
    pub gas_limit: u64,
    #[serde(with = "serde_amount")]
    pub gas_fee_cap: TokenAmount,
    #[serde(with = "serde_amount")]
    pub gas_premium: TokenAmount,
    pub method: MethodNum,
    #[serde(with = "serde_base64", default)]
    pub params: Vec<u8>,
}

impl Message {
    /// DAG-CBOR tuple encoding, the bytes the message CID is taken over.
    pub fn cbor(&self) -> Vec<u8> {
        CborWriter::new()
            .array(10)
            .uint(self.version)
            .bytes(&self.to.to_bytes())
            .bytes(&self.from.to_bytes())
            .uint(self.nonce)
            .bigint(&self.value)
            .uint(self.gas_limit)
            .bigint(&self.gas_fee_cap)
            .bigint(&self.gas_premium)
            .uint(self.method)
            .bytes(&self.params)
            .finish()
    }

    pub fn cid(&self) -> MessageId {
        Cid::from_cbor(&self.cbor())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SignatureType {
    Secp256k1 = 1,
    Bls = 2,
    Delegated = 3,
}

impl TryFrom<u8> for SignatureType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Secp256k1),
            2 => Ok(Self::Bls),
            3 => Ok(Self::Delegated),
            other => Err(format!("unknown signature type {}", other)),
        }
    }
}

impl From<SignatureType> for u8 {
    fn from(kind: SignatureType) -> Self {
        kind as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(rename = "Type")]
    pub kind: SignatureType,
    #[serde(rename = "Data", with = "serde_base64")]
    pub data: Vec<u8>,
}

impl Signature {
    pub fn new_secp256k1(data: Vec<u8>) -> Self {
        Self {
            kind: SignatureType::Secp256k1,
            data,
        }
    }

    /// Type byte followed by the signature data.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.data.len());
        bytes.push(self.kind.into());
        bytes.extend_from_slice(&self.data);
        bytes
    }
}

/// A message together with the sender's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignedMessage {
    pub message: Message,
    pub signature: Signature,
}

impl SignedMessage {
    /// Content identifier under which the node tracks the message.
    ///
    /// BLS messages are aggregated in blocks and keep the unsigned CID.
    pub fn cid(&self) -> MessageId {
        if self.signature.kind == SignatureType::Bls {
            return self.message.cid();
        }
        let encoded = CborWriter::new()
            .array(2)
            .raw(&self.message.cbor())
            .bytes(&self.signature.to_bytes())
            .finish();
        Cid::from_cbor(&encoded)
    }
}

/// An unsigned draft of a message waiting to be published.
///
/// When `valid_nonce` is set the nonce was chosen by the caller and must be
/// pushed verbatim; otherwise the node assigns it at push time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessagePrototype {
    pub message: Message,
    pub valid_nonce: bool,
}

/// On-chain actor state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Actor {
    /// Code CID of the actor type.
    pub code: Cid,
    pub nonce: u64,
    #[serde(with = "serde_amount")]
    pub balance: TokenAmount,
}

/// Kind of a message check, numbered as the node numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum CheckStatusCode {
    MessageSerialize,
    MessageSize,
    MessageValidity,
    MessageMinGas,
    MessageMinBaseFee,
    MessageBaseFee,
    MessageBaseFeeLowerBound,
    MessageBaseFeeUpperBound,
    MessageGetStateNonce,
    MessageNonce,
    MessageGetStateBalance,
    MessageBalance,
    Unknown(u8),
}

impl From<u8> for CheckStatusCode {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::MessageSerialize,
            2 => Self::MessageSize,
            3 => Self::MessageValidity,
            4 => Self::MessageMinGas,
            5 => Self::MessageMinBaseFee,
            6 => Self::MessageBaseFee,
            7 => Self::MessageBaseFeeLowerBound,
            8 => Self::MessageBaseFeeUpperBound,
            9 => Self::MessageGetStateNonce,
            10 => Self::MessageNonce,
            11 => Self::MessageGetStateBalance,
            12 => Self::MessageBalance,
            other => Self::Unknown(other),
        }
    }
}

impl From<CheckStatusCode> for u8 {
    fn from(code: CheckStatusCode) -> Self {
        match code {
            CheckStatusCode::MessageSerialize => 1,
            CheckStatusCode::MessageSize => 2,
            CheckStatusCode::MessageValidity => 3,
            CheckStatusCode::MessageMinGas => 4,
            CheckStatusCode::MessageMinBaseFee => 5,
            CheckStatusCode::MessageBaseFee => 6,
            CheckStatusCode::MessageBaseFeeLowerBound => 7,
            CheckStatusCode::MessageBaseFeeUpperBound => 8,
            CheckStatusCode::MessageGetStateNonce => 9,
            CheckStatusCode::MessageNonce => 10,
            CheckStatusCode::MessageGetStateBalance => 11,
            CheckStatusCode::MessageBalance => 12,
            CheckStatusCode::Unknown(other) => other,
        }
    }
}

impl fmt::Display for CheckStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MessageSerialize => "MessageSerialize",
            Self::MessageSize => "MessageSize",
            Self::MessageValidity => "MessageValidity",
            Self::MessageMinGas => "MessageMinGas",
            Self::MessageMinBaseFee => "MessageMinBaseFee",
            Self::MessageBaseFee => "MessageBaseFee",
            Self::MessageBaseFeeLowerBound => "MessageBaseFeeLowerBound",
            Self::MessageBaseFeeUpperBound => "MessageBaseFeeUpperBound",
            Self::MessageGetStateNonce => "MessageGetStateNonce",
            Self::MessageNonce => "MessageNonce",
            Self::MessageGetStateBalance => "MessageGetStateBalance",
            Self::MessageBalance => "MessageBalance",
            Self::Unknown(code) => return write!(f, "CheckStatusCode({})", code),
        };
        f.write_str(name)
    }
}

/// Outcome of one validation rule, as reported by the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckStatus {
    /// Message the check concerns; not necessarily the prototype itself.
    #[serde(rename = "Cid")]
    pub subject: MessageId,
    #[serde(rename = "OK")]
    pub ok: bool,
    #[serde(rename = "Code")]
    pub code: CheckStatusCode,
    #[serde(rename = "Err", default)]
    pub message: String,
    #[serde(rename = "Hint", default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<Map<String, Value>>,
}

impl CheckStatus {
    pub fn passed(subject: MessageId, code: CheckStatusCode) -> Self {
        Self {
            subject,
            ok: true,
            code,
            message: String::new(),
            hint: None,
        }
    }

    pub fn failed(subject: MessageId, code: CheckStatusCode, message: impl Into<String>) -> Self {
        Self {
            subject,
            ok: false,
            code,
            message: message.into(),
            hint: None,
        }
    }

    /// Attach an auxiliary hint value.
    pub fn with_hint(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.hint
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }
}

/// Results of one validation call, in node order.
pub type CheckBatch = Vec<CheckStatus>;

/// Errors that can occur while talking to the node or the key store.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The node answered with a JSON-RPC error.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Connection or HTTP level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The node's answer could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Key loading or signing failed.
    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid amount {0}")]
    InvalidAmount(String),

    #[error("Invalid address {0}")]
    InvalidAddress(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
