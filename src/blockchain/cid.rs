//! Content identifiers.
//!
//! Only CIDv1 is handled, which is what the node produces for messages and
//! actor code. Text form is multibase base32 (`b` prefix); on the JSON wire
//! a CID is the link object `{"/": "bafy..."}`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::blockchain::encoding::{base32_decode, base32_encode, blake2b_256, read_varint, write_varint};
use crate::blockchain::types::LedgerError;

const CID_V1: u64 = 1;
const DAG_CBOR: u64 = 0x71;
const BLAKE2B_256: u64 = 0xb220;
const MULTIBASE_BASE32: char = 'b';

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid(Vec<u8>);

impl Cid {
    /// CID of a DAG-CBOR block, hashed with blake2b-256.
    pub fn from_cbor(block: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(38);
        write_varint(&mut bytes, CID_V1);
        write_varint(&mut bytes, DAG_CBOR);
        write_varint(&mut bytes, BLAKE2B_256);
        write_varint(&mut bytes, 32);
        bytes.extend_from_slice(&blake2b_256(block));
        Self(bytes)
    }

    /// Parse binary CIDv1: version, codec, then a multihash whose length
    /// must cover the rest of the input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let invalid = |reason: &str| LedgerError::Decode(format!("invalid CID: {}", reason));

        let mut offset = 0;
        let mut next = || -> Result<u64, LedgerError> {
            let (value, len) = read_varint(&bytes[offset..]).ok_or_else(|| invalid("truncated"))?;
            offset += len;
            Ok(value)
        };
        if next()? != CID_V1 {
            return Err(invalid("only version 1 is supported"));
        }
        let _codec = next()?;
        let _hash = next()?;
        let digest_len = next()?;
        if bytes.len() - offset != digest_len as usize {
            return Err(invalid("digest length mismatch"));
        }
        Ok(Self(bytes.to_vec()))
    }

    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", MULTIBASE_BASE32, base32_encode(&self.0))
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({})", self)
    }
}

impl FromStr for Cid {
    type Err = LedgerError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let encoded = text.strip_prefix(MULTIBASE_BASE32).ok_or_else(|| {
            LedgerError::Decode(format!("unsupported CID encoding '{}'", text))
        })?;
        let bytes = base32_decode(encoded)
            .ok_or_else(|| LedgerError::Decode(format!("invalid base32 in CID '{}'", text)))?;
        Self::from_bytes(&bytes)
    }
}

#[derive(Serialize, Deserialize)]
struct CidLink {
    #[serde(rename = "/")]
    link: String,
}

impl Serialize for Cid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CidLink {
            link: self.to_string(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let link = CidLink::deserialize(deserializer)?;
        link.link.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lotus message CID of a 1 FIL transfer f01000 -> f01001, nonce 7.
    const MESSAGE_CID: &str = "bafy2bzacebctau5r2x4ssyy6j3kk3exfxbdl5artv6lvlrtkhd5livqycehw6";

    #[test]
    fn test_text_form() {
        let cid: Cid = MESSAGE_CID.parse().unwrap();
        assert_eq!(cid.to_string(), MESSAGE_CID);
        assert_eq!(&cid.to_bytes()[..6], &[0x01, 0x71, 0xa0, 0xe4, 0x02, 0x20]);
        assert_eq!(cid.to_bytes().len(), 38);
    }

    #[test]
    fn test_link_object() {
        let json = serde_json::json!({ "/": MESSAGE_CID });
        let cid: Cid = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(serde_json::to_value(&cid).unwrap(), json);
    }

    #[test]
    fn test_rejects_foreign_forms() {
        assert!("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG".parse::<Cid>().is_err());
        assert!("bafy2bzace".parse::<Cid>().is_err());
        assert!(serde_json::from_str::<Cid>(&format!("\"{}\"", MESSAGE_CID)).is_err());
    }

    #[test]
    fn test_from_cbor() {
        let a = Cid::from_cbor(&[0x80]);
        assert_eq!(a, Cid::from_cbor(&[0x80]));
        assert_ne!(a, Cid::from_cbor(&[0x81]));
        assert!(a.to_string().starts_with("bafy2bzace"));
    }
}
