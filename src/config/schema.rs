//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from `config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration of the tool.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ToolConfig {
    /// Local repository and node endpoint.
    pub repo: RepoConfig,

    /// Node transport settings.
    pub node: NodeConfig,

    /// Which key custody signs messages.
    pub wallet: WalletConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Extra actor code ids understood by the method table.
    pub actor: ActorConfig,
}

/// Repository configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RepoConfig {
    /// Directory holding the keystore. `~/` expands to the home directory.
    pub tool_path: String,

    /// Node API info (`TOKEN:/ip4/<host>/tcp/<port>/http`) or URL.
    /// Empty means `FULLNODE_API_INFO` from the environment.
    pub full_node_api: String,
}

impl RepoConfig {
    /// `tool_path` with a leading `~/` expanded.
    pub fn tool_dir(&self) -> PathBuf {
        match (self.tool_path.strip_prefix("~/"), std::env::var_os("HOME")) {
            (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
            _ => PathBuf::from(&self.tool_path),
        }
    }
}

/// Node transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Timeout of a single RPC call in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_timeout_secs: 30,
        }
    }
}

/// Key custody used for signing and default address lookup.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WalletSource {
    /// Keystore below `repo.tool_path`.
    #[default]
    Local,
    /// The node's own wallet.
    Node,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    pub source: WalletSource,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ActorConfig {
    pub cids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolConfig::default();
        assert_eq!(config.node.rpc_timeout_secs, 30);
        assert_eq!(config.wallet.source, WalletSource::Local);
        assert_eq!(config.observability.log_level, "info");
        assert!(config.actor.cids.is_empty());
    }

    #[test]
    fn test_partial_file() {
        let config: ToolConfig = toml::from_str(
            r#"
            [repo]
            tool_path = "/var/lib/lotus-tools"

            [wallet]
            source = "node"
            "#,
        )
        .unwrap();
        assert_eq!(config.repo.tool_path, "/var/lib/lotus-tools");
        assert_eq!(config.wallet.source, WalletSource::Node);
        assert_eq!(config.node.rpc_timeout_secs, 30);
    }

    #[test]
    fn test_tool_dir_plain_path() {
        let repo = RepoConfig {
            tool_path: "/opt/tools".into(),
            full_node_api: String::new(),
        };
        assert_eq!(repo.tool_dir(), PathBuf::from("/opt/tools"));
    }
}
