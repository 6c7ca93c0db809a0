//! Local key custody and message signing.
//!
//! # Security
//! - Private keys are loaded ONLY from the keystore directory
//! - Keys are never logged or serialized
//!
//! # Layout
//! ```text
//! <tool_path>/keystore/<anything>.key   hex secp256k1 private key, one per file
//! <tool_path>/keystore/default          f1 address of the default key
//! ```
//!
//! Messages are signed over the blake2b-256 digest of their CID bytes; the
//! signature data is `r || s || v` with a recovery id of 0 or 1.

use alloy::signers::local::PrivateKeySigner;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::blockchain::address::Address;
use crate::blockchain::client::RpcNode;
use crate::blockchain::encoding::blake2b_256;
use crate::blockchain::node::WalletApi;
use crate::blockchain::types::{LedgerError, LedgerResult, Message, Signature, SignedMessage};

/// Keystore directory below the tool path.
pub const KEYSTORE_DIR: &str = "keystore";

const KEY_EXTENSION: &str = "key";
const DEFAULT_KEY_FILE: &str = "default";

/// Wallet backed by key files on disk.
#[derive(Debug, Clone, Default)]
pub struct LocalWallet {
    signers: BTreeMap<Address, PrivateKeySigner>,
    default: Option<Address>,
}

impl LocalWallet {
    /// Open the keystore below `tool_path`.
    ///
    /// A missing keystore directory yields an empty wallet.
    pub fn open(tool_path: &Path) -> LedgerResult<Self> {
        let dir = tool_path.join(KEYSTORE_DIR);
        let mut wallet = Self::default();

        if !dir.is_dir() {
            tracing::warn!(path = %dir.display(), "Keystore directory not found, wallet is empty");
            return Ok(wallet);
        }

        let entries = fs::read_dir(&dir).map_err(|e| keystore_error(&dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| keystore_error(&dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(KEY_EXTENSION) {
                continue;
            }
            let key = fs::read_to_string(&path).map_err(|e| keystore_error(&path, e))?;
            wallet.insert(Self::signer_from_hex(&key)?);
        }

        let default_path = dir.join(DEFAULT_KEY_FILE);
        if default_path.is_file() {
            let text = fs::read_to_string(&default_path).map_err(|e| keystore_error(&default_path, e))?;
            let address: Address = text.trim().parse().map_err(|e: LedgerError| {
                LedgerError::Wallet(format!("Invalid default address '{}': {}", text.trim(), e))
            })?;
            wallet.set_default(address)?;
        }

        tracing::info!(
            path = %dir.display(),
            keys = wallet.signers.len(),
            "Keystore opened"
        );

        Ok(wallet)
    }

    /// Parse a hex-encoded private key (with or without 0x prefix).
    pub fn signer_from_hex(private_key_hex: &str) -> LedgerResult<PrivateKeySigner> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        key_hex
            .parse()
            .map_err(|e| LedgerError::Wallet(format!("Invalid private key format: {}", e)))
    }

    /// The f1 address of a key.
    pub fn address_of(signer: &PrivateKeySigner) -> Address {
        let public_key = signer
            .credential()
            .verifying_key()
            .as_affine()
            .to_encoded_point(false);
        Address::new_secp256k1(public_key.as_bytes())
    }

    /// Add a key to the wallet, returning its address.
    pub fn insert(&mut self, signer: PrivateKeySigner) -> Address {
        let address = Self::address_of(&signer);
        self.signers.insert(address.clone(), signer);
        address
    }

    /// Mark a held key as the default sender.
    pub fn set_default(&mut self, address: Address) -> LedgerResult<()> {
        if !self.signers.contains_key(&address) {
            return Err(LedgerError::Wallet(format!(
                "Default address {} has no key in the keystore",
                address
            )));
        }
        self.default = Some(address);
        Ok(())
    }

    /// Sign raw bytes with the key of `address`.
    pub fn sign_bytes(&self, address: &Address, data: &[u8]) -> LedgerResult<Signature> {
        let signer = self
            .signers
            .get(address)
            .ok_or_else(|| LedgerError::Wallet(format!("No key for address {}", address)))?;
        let digest = blake2b_256(data);
        let (signature, recovery_id): (EcdsaSignature, RecoveryId) = signer
            .credential()
            .sign_prehash(&digest)
            .map_err(|e| LedgerError::Wallet(format!("Signing failed: {}", e)))?;

        let mut data = signature.to_bytes().to_vec();
        data.push(recovery_id.to_byte());
        Ok(Signature::new_secp256k1(data))
    }
}

fn keystore_error(path: &Path, err: std::io::Error) -> LedgerError {
    LedgerError::Wallet(format!("Keystore {}: {}", path.display(), err))
}

impl WalletApi for LocalWallet {
    async fn list_addresses(&self) -> LedgerResult<Vec<Address>> {
        Ok(self.signers.keys().cloned().collect())
    }

    async fn default_address(&self) -> LedgerResult<Option<Address>> {
        if self.default.is_some() {
            return Ok(self.default.clone());
        }
        // A single key is its own default.
        if self.signers.len() == 1 {
            return Ok(self.signers.keys().next().cloned());
        }
        Ok(None)
    }

    async fn sign_message(&self, from: &Address, message: &Message) -> LedgerResult<SignedMessage> {
        let signature = self.sign_bytes(from, message.cid().to_bytes())?;
        Ok(SignedMessage {
            message: message.clone(),
            signature,
        })
    }
}

/// Wallet chosen by configuration: local keystore or the node's own wallet.
#[derive(Debug, Clone)]
pub enum WalletBackend {
    Local(LocalWallet),
    Node(RpcNode),
}

impl WalletApi for WalletBackend {
    async fn list_addresses(&self) -> LedgerResult<Vec<Address>> {
        match self {
            Self::Local(wallet) => wallet.list_addresses().await,
            Self::Node(node) => node.list_addresses().await,
        }
    }

    async fn default_address(&self) -> LedgerResult<Option<Address>> {
        match self {
            Self::Local(wallet) => wallet.default_address().await,
            Self::Node(node) => node.default_address().await,
        }
    }

    async fn sign_message(&self, from: &Address, message: &Message) -> LedgerResult<SignedMessage> {
        match self {
            Self::Local(wallet) => wallet.sign_message(from, message).await,
            Self::Node(node) => node.sign_message(from, message).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::VerifyingKey;

    // Well-known test private keys (Anvil's first two accounts)
    const TEST_KEY_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_KEY_1: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const ADDRESS_0: &str = "f1nqjokbjze2a2nx36kz6oq54wns4w5jcwhzuzy2i";
    const ADDRESS_1: &str = "f1ufwmkte5zlr7okxak6hhmfhufyoxtzs4sooptri";

    fn write_keystore(keys: &[&str], default: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let keystore = dir.path().join(KEYSTORE_DIR);
        fs::create_dir_all(&keystore).unwrap();
        for (i, key) in keys.iter().enumerate() {
            fs::write(keystore.join(format!("k{}.key", i)), key).unwrap();
        }
        if let Some(default) = default {
            fs::write(keystore.join(DEFAULT_KEY_FILE), default).unwrap();
        }
        dir
    }

    #[test]
    fn test_signer_address() {
        let signer = LocalWallet::signer_from_hex(&format!("0x{}\n", TEST_KEY_0)).unwrap();
        assert_eq!(LocalWallet::address_of(&signer).to_string(), ADDRESS_0);
        let signer = LocalWallet::signer_from_hex(TEST_KEY_1).unwrap();
        assert_eq!(LocalWallet::address_of(&signer).to_string(), ADDRESS_1);
        assert!(LocalWallet::signer_from_hex("invalid_key").is_err());
    }

    #[tokio::test]
    async fn test_open_missing_keystore() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = LocalWallet::open(dir.path()).unwrap();
        assert!(wallet.list_addresses().await.unwrap().is_empty());
        assert_eq!(wallet.default_address().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_single_key_is_default() {
        let dir = write_keystore(&[TEST_KEY_0], None);
        let wallet = LocalWallet::open(dir.path()).unwrap();
        let default = wallet.default_address().await.unwrap().unwrap();
        assert_eq!(default.to_string(), ADDRESS_0);
    }

    #[tokio::test]
    async fn test_default_file_selects_key() {
        let dir = write_keystore(&[TEST_KEY_0, TEST_KEY_1], Some(ADDRESS_1));
        let wallet = LocalWallet::open(dir.path()).unwrap();
        assert_eq!(wallet.list_addresses().await.unwrap().len(), 2);
        assert_eq!(
            wallet.default_address().await.unwrap(),
            Some(ADDRESS_1.parse().unwrap())
        );
    }

    #[tokio::test]
    async fn test_ambiguous_default() {
        let dir = write_keystore(&[TEST_KEY_0, TEST_KEY_1], None);
        let wallet = LocalWallet::open(dir.path()).unwrap();
        assert_eq!(wallet.default_address().await.unwrap(), None);
    }

    #[test]
    fn test_default_must_be_held() {
        let mut wallet = LocalWallet::default();
        assert!(wallet.set_default(Address::new_id(1000)).is_err());
    }

    #[tokio::test]
    async fn test_sign_message() {
        let mut wallet = LocalWallet::default();
        let signer = LocalWallet::signer_from_hex(TEST_KEY_0).unwrap();
        let public_key = *signer.credential().verifying_key();
        let from = wallet.insert(signer);
        let message = Message {
            to: Address::new_id(1001),
            from: from.clone(),
            nonce: 7,
            ..Default::default()
        };

        let signed = wallet.sign_message(&from, &message).await.unwrap();
        assert_eq!(signed.message, message);
        assert_eq!(signed.signature.data.len(), 65);

        // The signature recovers to the sender's key over the CID digest.
        let data = &signed.signature.data;
        let signature = EcdsaSignature::from_slice(&data[..64]).unwrap();
        let recovery_id = RecoveryId::from_byte(data[64]).unwrap();
        let digest = blake2b_256(message.cid().to_bytes());
        let recovered = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id).unwrap();
        assert_eq!(recovered, public_key);

        let unknown = wallet.sign_message(&Address::new_id(1000), &message).await;
        assert!(unknown.unwrap_err().to_string().contains("No key"));
    }
}
