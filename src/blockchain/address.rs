//! Ledger addresses.
//!
//! # Formats
//! ```text
//! bytes:  protocol byte || payload
//! text:   f0<id>                                 ID
//!         f1|f2|f3 base32(payload || checksum)   secp256k1, actor, BLS
//!         f4<namespace>f base32(sub || checksum) delegated
//! ```
//! The checksum is a 4-byte blake2b over the byte form. Text is rendered
//! with the mainnet `f` prefix; `t` is accepted on input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::blockchain::encoding::{
    base32_decode, base32_encode, blake2b_160, blake2b_32, read_varint, write_varint,
};
use crate::blockchain::types::LedgerError;

const MAINNET_PREFIX: char = 'f';
const TESTNET_PREFIX: char = 't';
const CHECKSUM_LEN: usize = 4;
const HASH_PAYLOAD_LEN: usize = 20;
const BLS_PAYLOAD_LEN: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Id = 0,
    Secp256k1 = 1,
    Actor = 2,
    Bls = 3,
    Delegated = 4,
}

impl Protocol {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Id),
            1 => Some(Self::Secp256k1),
            2 => Some(Self::Actor),
            3 => Some(Self::Bls),
            4 => Some(Self::Delegated),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    protocol: Protocol,
    payload: Vec<u8>,
}

fn invalid(text: &str, reason: &str) -> LedgerError {
    LedgerError::InvalidAddress(format!("'{}': {}", text, reason))
}

impl Address {
    pub fn new_id(id: u64) -> Self {
        let mut payload = Vec::with_capacity(10);
        write_varint(&mut payload, id);
        Self {
            protocol: Protocol::Id,
            payload,
        }
    }

    /// Address of an uncompressed (65-byte) secp256k1 public key.
    pub fn new_secp256k1(public_key: &[u8]) -> Self {
        Self {
            protocol: Protocol::Secp256k1,
            payload: blake2b_160(public_key).to_vec(),
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Actor id, for ID addresses.
    pub fn id(&self) -> Option<u64> {
        match self.protocol {
            Protocol::Id => read_varint(&self.payload).map(|(id, _)| id),
            _ => None,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.payload.len());
        bytes.push(self.protocol as u8);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let (&first, payload) = bytes
            .split_first()
            .ok_or_else(|| LedgerError::InvalidAddress("empty address bytes".into()))?;
        let protocol = Protocol::from_byte(first).ok_or_else(|| {
            LedgerError::InvalidAddress(format!("unknown address protocol {}", first))
        })?;
        Self::from_parts(protocol, payload.to_vec())
            .map_err(|reason| LedgerError::InvalidAddress(reason.to_string()))
    }

    fn from_parts(protocol: Protocol, payload: Vec<u8>) -> Result<Self, &'static str> {
        let valid = match protocol {
            Protocol::Id => read_varint(&payload).is_some_and(|(_, len)| len == payload.len()),
            Protocol::Secp256k1 | Protocol::Actor => payload.len() == HASH_PAYLOAD_LEN,
            Protocol::Bls => payload.len() == BLS_PAYLOAD_LEN,
            Protocol::Delegated => read_varint(&payload).is_some(),
        };
        if !valid {
            return Err("payload has the wrong length");
        }
        Ok(Self { protocol, payload })
    }

    fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        blake2b_32(&self.to_bytes())
    }
}

/// The system actor, `f00`.
impl Default for Address {
    fn default() -> Self {
        Self::new_id(0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", MAINNET_PREFIX, self.protocol as u8)?;
        match self.protocol {
            Protocol::Id => write!(f, "{}", self.id().unwrap_or_default()),
            Protocol::Delegated => {
                let (namespace, len) = read_varint(&self.payload).unwrap_or_default();
                let mut data = self.payload[len..].to_vec();
                data.extend_from_slice(&self.checksum());
                write!(f, "{}{}{}", namespace, MAINNET_PREFIX, base32_encode(&data))
            }
            _ => {
                let mut data = self.payload.clone();
                data.extend_from_slice(&self.checksum());
                f.write_str(&base32_encode(&data))
            }
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut chars = text.chars();
        match chars.next() {
            Some(MAINNET_PREFIX) | Some(TESTNET_PREFIX) => {}
            _ => return Err(invalid(text, "unknown network prefix")),
        }
        let protocol = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .and_then(|d| Protocol::from_byte(d as u8))
            .ok_or_else(|| invalid(text, "unknown protocol"))?;
        let rest = &text[2..];
        if rest.is_empty() {
            return Err(invalid(text, "missing payload"));
        }

        let (payload, encoded) = match protocol {
            Protocol::Id => {
                let id: u64 = rest.parse().map_err(|_| invalid(text, "bad actor id"))?;
                return Ok(Self::new_id(id));
            }
            Protocol::Delegated => {
                let (namespace, encoded) = rest
                    .split_once(MAINNET_PREFIX)
                    .ok_or_else(|| invalid(text, "missing namespace separator"))?;
                let namespace: u64 = namespace
                    .parse()
                    .map_err(|_| invalid(text, "bad namespace"))?;
                let mut payload = Vec::new();
                write_varint(&mut payload, namespace);
                (payload, encoded)
            }
            _ => (Vec::new(), rest),
        };

        let mut data = base32_decode(encoded).ok_or_else(|| invalid(text, "invalid base32"))?;
        if data.len() < CHECKSUM_LEN {
            return Err(invalid(text, "too short"));
        }
        let checksum = data.split_off(data.len() - CHECKSUM_LEN);
        let mut full = payload;
        full.extend_from_slice(&data);

        let address = Self::from_parts(protocol, full).map_err(|reason| invalid(text, reason))?;
        if address.checksum()[..] != checksum[..] {
            return Err(invalid(text, "checksum mismatch"));
        }
        Ok(address)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
