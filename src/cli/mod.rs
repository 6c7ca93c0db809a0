//! Command line surface.
//!
//! # Data Flow
//! ```text
//! argv
//!     → Cli (clap)
//!     → config::load_config + observability::init_logging
//!     → build_service (node client, wallet backend, method table)
//!     → send / wallet subcommands
//! ```

pub mod send;
pub mod wallet;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

use crate::blockchain::client::{ApiInfo, RpcNode};
use crate::blockchain::methods::MethodTable;
use crate::blockchain::types::LedgerError;
use crate::blockchain::wallet::{LocalWallet, WalletBackend};
use crate::config::{load_config, ConfigError, ToolConfig, WalletSource, CONFIG_ENV_VAR};
use crate::observability::init_logging;
use crate::send::{SendError, SendService};

#[derive(Parser, Debug)]
#[command(name = "lotus-tools")]
#[command(about = "Build, check and send messages through a Lotus full node", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = CONFIG_ENV_VAR, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Override observability.log_level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send funds or invoke an actor method
    Send(send::SendArgs),
    /// Inspect the signing wallet
    #[command(subcommand)]
    Wallet(wallet::WalletCommand),
}

/// Anything that ends a command with a non-zero exit.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Send(#[from] SendError),

    #[error("{0}")]
    Args(String),
}

pub type Service = SendService<RpcNode, WalletBackend>;

/// Resolve the node endpoint: configured value first, then the environment.
pub fn api_info(config: &ToolConfig) -> Result<ApiInfo, LedgerError> {
    if config.repo.full_node_api.trim().is_empty() {
        ApiInfo::from_env()
    } else {
        ApiInfo::parse(&config.repo.full_node_api)
    }
}

/// Wire node client, wallet and method table from configuration.
pub fn build_service(config: &ToolConfig) -> Result<Service, CliError> {
    let node = RpcNode::new(api_info(config)?, config.node.rpc_timeout_secs)?;

    let wallet = match config.wallet.source {
        WalletSource::Local => WalletBackend::Local(LocalWallet::open(&config.repo.tool_dir())?),
        WalletSource::Node => WalletBackend::Node(node.clone()),
    };

    Ok(SendService::new(
        node,
        wallet,
        MethodTable::new(&config.actor.cids),
    ))
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli.config)?;
    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    init_logging(level);

    tracing::debug!(config = %cli.config.display(), "Configuration loaded");

    let service = build_service(&config)?;

    match cli.command {
        Commands::Send(args) => send::run(&service, args).await,
        Commands::Wallet(command) => wallet::run(&service, command).await,
    }
}
