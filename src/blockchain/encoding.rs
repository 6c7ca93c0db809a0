//! Byte-level encodings shared by addresses, CIDs and messages.
//!
//! - RFC 4648 base32 (lowercase, unpadded), the text form of addresses and CIDs
//! - unsigned LEB128 varints, used by ID addresses and multiformats
//! - blake2b digests at the widths the ledger uses
//! - a minimal DAG-CBOR writer for tuple-encoded structures
//! - base64 serde for byte fields on the JSON-RPC wire

use blake2::digest::consts::{U20, U32, U4};
use blake2::{Blake2b, Digest};

use crate::blockchain::amount::TokenAmount;

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

pub fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Decode unpadded base32 in either case; `None` on a foreign character.
pub fn base32_decode(text: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for c in text.bytes() {
        let value = match c {
            b'a'..=b'z' => c - b'a',
            b'A'..=b'Z' => c - b'A',
            b'2'..=b'7' => c - b'2' + 26,
            _ => return None,
        };
        buffer = (buffer << 5) | u32::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }
    Some(out)
}

pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Read a varint from the front of `data`, returning the value and its length.
pub fn read_varint(data: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in data.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

pub fn blake2b_160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Blake2b::<U20>::new();
    hasher.update(data);
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// 4-byte blake2b, the address checksum.
pub fn blake2b_32(data: &[u8]) -> [u8; 4] {
    let mut hasher = Blake2b::<U4>::new();
    hasher.update(data);
    let mut hash = [0u8; 4];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

const MAJOR_UINT: u8 = 0;
const MAJOR_BYTES: u8 = 2;
const MAJOR_ARRAY: u8 = 4;

/// Append-only DAG-CBOR encoder covering unsigned integers, byte strings
/// and arrays, which is all the ledger's tuple encodings need.
#[derive(Debug, Default)]
pub struct CborWriter {
    buf: Vec<u8>,
}

impl CborWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn head(&mut self, major: u8, n: u64) {
        let major = major << 5;
        match n {
            0..=23 => self.buf.push(major | n as u8),
            24..=0xff => self.buf.extend_from_slice(&[major | 24, n as u8]),
            0x100..=0xffff => {
                self.buf.push(major | 25);
                self.buf.extend_from_slice(&(n as u16).to_be_bytes());
            }
            0x1_0000..=0xffff_ffff => {
                self.buf.push(major | 26);
                self.buf.extend_from_slice(&(n as u32).to_be_bytes());
            }
            _ => {
                self.buf.push(major | 27);
                self.buf.extend_from_slice(&n.to_be_bytes());
            }
        }
    }

    pub fn uint(&mut self, n: u64) -> &mut Self {
        self.head(MAJOR_UINT, n);
        self
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.head(MAJOR_BYTES, data.len() as u64);
        self.buf.extend_from_slice(data);
        self
    }

    pub fn array(&mut self, len: usize) -> &mut Self {
        self.head(MAJOR_ARRAY, len as u64);
        self
    }

    /// Big integer as a byte string: empty for zero, else a sign byte and
    /// the big-endian magnitude.
    pub fn bigint(&mut self, value: &TokenAmount) -> &mut Self {
        if value.bits() == 0 {
            return self.bytes(&[]);
        }
        let mut data = vec![0u8];
        data.extend_from_slice(&value.to_bytes_be());
        self.bytes(&data)
    }

    /// Splice in an already encoded item.
    pub fn raw(&mut self, encoded: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(encoded);
        self
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

/// Byte fields as base64 strings; `null` reads as empty.
pub mod serde_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<T: AsRef<[u8]>, S: Serializer>(
        data: &T,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data.as_ref()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Vec::new()),
            Some(text) => STANDARD
                .decode(text.as_bytes())
                .map_err(|e| serde::de::Error::custom(format!("invalid base64: {}", e))),
        }
    }
}
