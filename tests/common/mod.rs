//! Shared utilities for pipeline integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use lotus_tools::blockchain::methods::{MethodTable, MINER_ACTOR_CODE};
use lotus_tools::blockchain::{
    Actor, Address, CheckBatch, CheckStatus, CheckStatusCode, FullNode, LedgerError,
    LedgerResult, LocalWallet, Message, MessageId, MessagePrototype, Signature, SignedMessage,
};
use lotus_tools::send::{Console, SendParams, SendService};
use num_bigint::BigUint;

// Anvil's first two accounts.
pub const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const OTHER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const ESTIMATED_GAS_LIMIT: u64 = 1_000_000;
pub const ESTIMATED_FEE_CAP: u32 = 50;
pub const ESTIMATED_PREMIUM: u32 = 10;

/// Nonce the mock node assigns when it signs.
pub const NODE_NONCE: u64 = 7;

/// Every call the pipeline made, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    WalletDefault,
    WalletHas(Address),
    StateGetActor(Address),
    CheckMessage { fee_cap: BigUint },
    CheckPending(Address),
    Estimate,
    PushSigned { nonce: u64, fee_cap: BigUint },
    SignAndPush { fee_cap: BigUint },
}

/// Scripted outcome of one check about the prototype under test.
#[derive(Debug, Clone)]
pub enum Verdict {
    Pass(CheckStatusCode),
    Fail(CheckStatusCode, &'static str),
    /// Base fee failure carrying the observed base fee as a hint.
    BaseFee(u64),
}

impl Verdict {
    fn status(&self, subject: &MessageId) -> CheckStatus {
        let subject = subject.clone();
        match self {
            Self::Pass(code) => CheckStatus::passed(subject, *code),
            Self::Fail(code, message) => CheckStatus::failed(subject, *code, *message),
            Self::BaseFee(base_fee) => CheckStatus::failed(
                subject,
                CheckStatusCode::MessageBaseFee,
                "fee cap below the current base fee",
            )
            .with_hint("baseFee", base_fee.to_string()),
        }
    }
}

/// In-memory full node.
///
/// Own-message checks are answered from a queue, one entry per call; an
/// empty queue means every check passes. The node's wallet holds the test
/// key unless told otherwise; its first key is the default.
pub struct MockNode {
    calls: Arc<Mutex<Vec<Call>>>,
    own_checks: Mutex<VecDeque<Option<Vec<Verdict>>>>,
    pending: Mutex<CheckBatch>,
    estimate_fails: bool,
    keys: Vec<Address>,
    push_id: Option<MessageId>,
}

impl Default for MockNode {
    fn default() -> Self {
        Self {
            calls: Arc::default(),
            own_checks: Mutex::default(),
            pending: Mutex::default(),
            estimate_fails: false,
            keys: vec![key_address(TEST_KEY)],
            push_id: None,
        }
    }
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the keys held by the node's wallet.
    pub fn holding_keys(mut self, keys: Vec<Address>) -> Self {
        self.keys = keys;
        self
    }

    /// Answer pushes of signed messages with `id`.
    pub fn answering_push_with(mut self, id: MessageId) -> Self {
        self.push_id = Some(id);
        self
    }

    /// Queue the verdicts of the next own-message check.
    pub fn script_checks(self, verdicts: Vec<Verdict>) -> Self {
        self.own_checks.lock().unwrap().push_back(Some(verdicts));
        self
    }

    /// Make the next own-message check fail in transport.
    pub fn script_check_transport_error(self) -> Self {
        self.own_checks.lock().unwrap().push_back(None);
        self
    }

    pub fn with_pending(self, pending: CheckBatch) -> Self {
        *self.pending.lock().unwrap() = pending;
        self
    }

    pub fn failing_estimate(mut self) -> Self {
        self.estimate_fails = true;
        self
    }

    /// Handle to the call log, usable after the node moved into a service.
    pub fn call_log(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl FullNode for MockNode {
    async fn state_get_actor(&self, address: &Address) -> LedgerResult<Actor> {
        self.record(Call::StateGetActor(address.clone()));
        Ok(Actor {
            code: MINER_ACTOR_CODE.parse()?,
            nonce: 0,
            balance: BigUint::from(0u32),
        })
    }

    async fn check_message(&self, prototype: &MessagePrototype) -> LedgerResult<CheckBatch> {
        self.record(Call::CheckMessage {
            fee_cap: prototype.message.gas_fee_cap.clone(),
        });
        let subject = prototype.message.cid();
        match self.own_checks.lock().unwrap().pop_front() {
            Some(Some(verdicts)) => Ok(verdicts.iter().map(|v| v.status(&subject)).collect()),
            Some(None) => Err(LedgerError::Transport("connection reset".into())),
            None => Ok(vec![CheckStatus::passed(
                subject,
                CheckStatusCode::MessageValidity,
            )]),
        }
    }

    async fn check_pending_messages(&self, from: &Address) -> LedgerResult<CheckBatch> {
        self.record(Call::CheckPending(from.clone()));
        Ok(self.pending.lock().unwrap().clone())
    }

    async fn estimate_message_gas(&self, message: &Message) -> LedgerResult<Message> {
        self.record(Call::Estimate);
        if self.estimate_fails {
            return Err(LedgerError::Rpc("gas estimation failed: actor not found".into()));
        }
        Ok(Message {
            gas_limit: ESTIMATED_GAS_LIMIT,
            gas_fee_cap: BigUint::from(ESTIMATED_FEE_CAP),
            gas_premium: BigUint::from(ESTIMATED_PREMIUM),
            ..message.clone()
        })
    }

    async fn push_signed(&self, message: &SignedMessage) -> LedgerResult<MessageId> {
        self.record(Call::PushSigned {
            nonce: message.message.nonce,
            fee_cap: message.message.gas_fee_cap.clone(),
        });
        Ok(self.push_id.clone().unwrap_or_else(|| message.cid()))
    }

    async fn sign_and_push(&self, message: &Message) -> LedgerResult<SignedMessage> {
        self.record(Call::SignAndPush {
            fee_cap: message.gas_fee_cap.clone(),
        });
        Ok(SignedMessage {
            message: Message {
                nonce: NODE_NONCE,
                ..message.clone()
            },
            signature: Signature::new_secp256k1(vec![0u8; 65]),
        })
    }

    async fn wallet_default_address(&self) -> LedgerResult<Option<Address>> {
        self.record(Call::WalletDefault);
        Ok(self.keys.first().cloned())
    }

    async fn wallet_has(&self, address: &Address) -> LedgerResult<bool> {
        self.record(Call::WalletHas(address.clone()));
        Ok(self.keys.contains(address))
    }
}

/// Console answering from a fixed list of lines and capturing everything shown.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: VecDeque<String>,
    pub output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            input: lines.iter().map(|l| l.to_string()).collect(),
            output: Vec::new(),
        }
    }

    pub fn printed(&self, text: &str) -> bool {
        self.output.iter().any(|line| line.contains(text))
    }

    pub fn count(&self, text: &str) -> usize {
        self.output.iter().filter(|line| line.contains(text)).count()
    }

    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl Console for ScriptedConsole {
    fn print(&mut self, text: &str) -> io::Result<()> {
        self.output.push(text.to_string());
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        self.output.push(text.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }
}

pub fn key_address(key: &str) -> Address {
    LocalWallet::address_of(&LocalWallet::signer_from_hex(key).unwrap())
}

/// Address of the test key, held by both the node and the local wallet.
pub fn sender() -> Address {
    key_address(TEST_KEY)
}

pub fn wallet_with(key: &str) -> LocalWallet {
    let mut wallet = LocalWallet::default();
    wallet.insert(LocalWallet::signer_from_hex(key).unwrap());
    wallet
}

pub fn test_wallet() -> LocalWallet {
    wallet_with(TEST_KEY)
}

pub fn service(node: MockNode) -> SendService<MockNode, LocalWallet> {
    SendService::new(node, test_wallet(), MethodTable::default())
}

pub fn recipient() -> Address {
    Address::new_id(1001)
}

pub fn transfer(value: u32) -> SendParams {
    SendParams {
        to: recipient(),
        value: BigUint::from(value),
        ..Default::default()
    }
}
