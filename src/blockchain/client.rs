//! JSON-RPC full node client with timeout and error handling.
//!
//! # Responsibilities
//! - Resolve the node endpoint from an API info string
//! - Issue JSON-RPC 2.0 calls over HTTP with a bearer token
//! - Bound every call with the configured timeout
//! - Map node replies onto the ledger types

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;
use url::Url;
use uuid::Uuid;

use crate::blockchain::address::Address;
use crate::blockchain::node::{FullNode, WalletApi};
use crate::blockchain::types::{
    Actor, CheckBatch, LedgerError, LedgerResult, Message, MessageId, MessagePrototype,
    SignedMessage,
};

/// Environment variable holding `TOKEN:/ip4/<host>/tcp/<port>/http`.
pub const API_INFO_ENV_VAR: &str = "FULLNODE_API_INFO";

const RPC_PATH: &str = "/rpc/v1";

/// Node endpoint and optional auth token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiInfo {
    pub url: Url,
    pub token: Option<String>,
}

impl ApiInfo {
    /// Parse either a plain `http(s)://` URL or a `TOKEN:/multiaddr` pair.
    pub fn parse(info: &str) -> LedgerResult<Self> {
        let info = info.trim();
        if info.starts_with("http://") || info.starts_with("https://") {
            let mut url: Url = info
                .parse()
                .map_err(|e| LedgerError::Transport(format!("Invalid node URL '{}': {}", info, e)))?;
            if url.path().is_empty() || url.path() == "/" {
                url.set_path(RPC_PATH);
            }
            return Ok(Self { url, token: None });
        }

        let (token, multiaddr) = match info.split_once(':') {
            Some((token, rest)) if rest.starts_with('/') => (Some(token.to_string()), rest),
            _ => (None, info),
        };

        let parts: Vec<&str> = multiaddr.trim_start_matches('/').split('/').collect();
        let (host, port, transport) = match parts.as_slice() {
            [proto, host, "tcp", port, rest @ ..] if rest.len() <= 1 => {
                let host = match *proto {
                    "ip4" | "dns" | "dns4" | "dns6" => host.to_string(),
                    "ip6" => format!("[{}]", host),
                    other => {
                        return Err(LedgerError::Transport(format!(
                            "Unsupported address protocol '{}' in '{}'",
                            other, info
                        )))
                    }
                };
                (host, *port, rest.first().copied().unwrap_or("http"))
            }
            _ => {
                return Err(LedgerError::Transport(format!(
                    "Invalid API info '{}', expected TOKEN:/ip4/<host>/tcp/<port>/http",
                    info
                )))
            }
        };

        let scheme = match transport {
            "http" | "ws" => "http",
            "https" | "wss" => "https",
            other => {
                return Err(LedgerError::Transport(format!(
                    "Unsupported transport '{}' in '{}'",
                    other, info
                )))
            }
        };

        let url: Url = format!("{}://{}:{}{}", scheme, host, port, RPC_PATH)
            .parse()
            .map_err(|e| LedgerError::Transport(format!("Invalid API info '{}': {}", info, e)))?;

        Ok(Self {
            url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Read the API info from `FULLNODE_API_INFO`.
    pub fn from_env() -> LedgerResult<Self> {
        let info = std::env::var(API_INFO_ENV_VAR).map_err(|_| {
            LedgerError::Transport(format!("Environment variable {} not set", API_INFO_ENV_VAR))
        })?;
        Self::parse(&info)
    }
}

#[derive(Deserialize)]
struct RpcReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    message: String,
}

/// Full node client speaking JSON-RPC over HTTP.
#[derive(Clone)]
pub struct RpcNode {
    http: reqwest::Client,
    api: ApiInfo,
    timeout_secs: u64,
}

impl RpcNode {
    /// Create a new node client.
    ///
    /// No request is made until the first call.
    pub fn new(api: ApiInfo, timeout_secs: u64) -> LedgerResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| LedgerError::Transport(format!("HTTP client setup failed: {}", e)))?;

        tracing::info!(
            endpoint = %api.url,
            authenticated = api.token.is_some(),
            timeout_secs = timeout_secs,
            "Using full node API endpoint"
        );

        Ok(Self {
            http,
            api,
            timeout_secs,
        })
    }

    /// Perform one JSON-RPC call.
    async fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> LedgerResult<R> {
        let request_id = Uuid::new_v4();
        let body = json!({
            "jsonrpc": "2.0",
            "id": request_id.to_string(),
            "method": method,
            "params": params,
        });

        let mut request = self.http.post(self.api.url.clone()).json(&body);
        if let Some(token) = &self.api.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        tracing::debug!(method = method, request_id = %request_id, "RPC call");

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| LedgerError::Transport(format!("{}: {}", method, e)))?;
            let status = response.status();
            if !status.is_success() {
                return Err(LedgerError::Transport(format!(
                    "{}: node returned HTTP {}",
                    method, status
                )));
            }
            response
                .json::<RpcReply>()
                .await
                .map_err(|e| LedgerError::Decode(format!("{}: {}", method, e)))
        };

        let reply = match timeout(timeout_duration, exchange).await {
            Ok(reply) => reply?,
            Err(_) => {
                tracing::warn!(method = method, request_id = %request_id, "RPC timeout");
                return Err(LedgerError::Timeout(self.timeout_secs));
            }
        };

        if let Some(error) = reply.error {
            return Err(LedgerError::Rpc(format!(
                "{} ({}): {}",
                method, error.code, error.message
            )));
        }

        serde_json::from_value(reply.result.unwrap_or(Value::Null))
            .map_err(|e| LedgerError::Decode(format!("{}: {}", method, e)))
    }

    /// The endpoint this client talks to.
    pub fn api(&self) -> &ApiInfo {
        &self.api
    }
}

fn flatten(batches: Option<Vec<CheckBatch>>) -> CheckBatch {
    batches.unwrap_or_default().into_iter().flatten().collect()
}

/// The node answers `"<empty>"` when no default address is set.
fn default_from_reply(reply: Option<String>) -> LedgerResult<Option<Address>> {
    match reply.as_deref().map(str::trim) {
        None | Some("") | Some("<empty>") => Ok(None),
        Some(text) => text.parse().map(Some),
    }
}

impl FullNode for RpcNode {
    async fn state_get_actor(&self, address: &Address) -> LedgerResult<Actor> {
        let actor: Option<Actor> = self
            .call("Filecoin.StateGetActor", json!([address, []]))
            .await?;
        actor.ok_or_else(|| LedgerError::NotFound(format!("actor {}", address)))
    }

    async fn check_message(&self, prototype: &MessagePrototype) -> LedgerResult<CheckBatch> {
        let batches = self
            .call("Filecoin.MpoolCheckMessages", json!([[prototype]]))
            .await?;
        Ok(flatten(batches))
    }

    async fn check_pending_messages(&self, from: &Address) -> LedgerResult<CheckBatch> {
        let batches = self
            .call("Filecoin.MpoolCheckPendingMessages", json!([from]))
            .await?;
        Ok(flatten(batches))
    }

    async fn estimate_message_gas(&self, message: &Message) -> LedgerResult<Message> {
        self.call("Filecoin.GasEstimateMessageGas", json!([message, null, []]))
            .await
    }

    async fn push_signed(&self, message: &SignedMessage) -> LedgerResult<MessageId> {
        self.call("Filecoin.MpoolPush", json!([message])).await
    }

    async fn sign_and_push(&self, message: &Message) -> LedgerResult<SignedMessage> {
        self.call("Filecoin.MpoolPushMessage", json!([message, null]))
            .await
    }

    async fn wallet_default_address(&self) -> LedgerResult<Option<Address>> {
        let reply: Option<String> = self
            .call("Filecoin.WalletDefaultAddress", json!([]))
            .await?;
        default_from_reply(reply)
    }

    async fn wallet_has(&self, address: &Address) -> LedgerResult<bool> {
        self.call("Filecoin.WalletHas", json!([address])).await
    }
}

impl WalletApi for RpcNode {
    async fn list_addresses(&self) -> LedgerResult<Vec<Address>> {
        let addresses: Option<Vec<Address>> = self.call("Filecoin.WalletList", json!([])).await?;
        Ok(addresses.unwrap_or_default())
    }

    async fn default_address(&self) -> LedgerResult<Option<Address>> {
        self.wallet_default_address().await
    }

    async fn sign_message(&self, from: &Address, message: &Message) -> LedgerResult<SignedMessage> {
        self.call("Filecoin.WalletSignMessage", json!([from, message]))
            .await
    }
}

impl std::fmt::Debug for RpcNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcNode")
            .field("url", &self.api.url.as_str())
            .field("authenticated", &self.api.token.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
