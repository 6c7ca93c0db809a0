//! `send` subcommand.

use alloy::primitives::hex;
use clap::Args;
use num_bigint::BigUint;

use crate::blockchain::address::Address;
use crate::blockchain::amount::{parse_fil, TokenAmount};
use crate::blockchain::types::MethodNum;
use crate::cli::{CliError, Service};
use crate::send::{SendError, SendOptions, SendParams, StdConsole};

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Recipient address
    pub target: Address,

    /// Amount in FIL, e.g. `1.5` or `100 attofil`
    pub amount: String,

    /// Sender; the default of the signing wallet when omitted
    #[arg(long)]
    pub from: Option<Address>,

    /// Gas premium in attoFIL
    #[arg(long)]
    pub gas_premium: Option<String>,

    /// Gas fee cap in attoFIL
    #[arg(long)]
    pub gas_feecap: Option<String>,

    #[arg(long)]
    pub gas_limit: Option<u64>,

    /// Explicit nonce; the message is then signed locally
    #[arg(long)]
    pub nonce: Option<u64>,

    #[arg(long, default_value_t = 0)]
    pub method: MethodNum,

    /// Method parameters as JSON, encoded for the target actor
    #[arg(long, conflicts_with = "params_hex")]
    pub params_json: Option<String>,

    /// Raw method parameters as hex
    #[arg(long)]
    pub params_hex: Option<String>,

    /// Skip checks and send anyway
    #[arg(long, alias = "force-send")]
    pub force: bool,

    /// Resolve failed checks interactively
    #[arg(long)]
    pub interactive: bool,
}

fn parse_atto(flag: &str, text: &str) -> Result<TokenAmount, SendError> {
    BigUint::parse_bytes(text.trim().as_bytes(), 10)
        .ok_or_else(|| SendError::InvalidFeeInput(format!("--{} '{}'", flag, text)))
}

impl SendArgs {
    fn fee(flag: &str, value: &Option<String>) -> Result<Option<TokenAmount>, SendError> {
        value.as_deref().map(|text| parse_atto(flag, text)).transpose()
    }
}

async fn params_bytes(service: &Service, args: &SendArgs) -> Result<Vec<u8>, CliError> {
    if let Some(json) = &args.params_json {
        return Ok(service.decode_params(&args.target, args.method, json).await?);
    }
    if let Some(raw) = &args.params_hex {
        return hex::decode(raw.trim())
            .map_err(|e| CliError::Args(format!("--params-hex: {}", e)));
    }
    Ok(Vec::new())
}

pub async fn run(service: &Service, args: SendArgs) -> Result<(), CliError> {
    let value = parse_fil(&args.amount).map_err(SendError::InvalidAmount)?;
    let params = SendParams {
        params: params_bytes(service, &args).await?,
        to: args.target,
        from: args.from,
        value,
        method: args.method,
        gas_premium: SendArgs::fee("gas-premium", &args.gas_premium)?,
        gas_fee_cap: SendArgs::fee("gas-feecap", &args.gas_feecap)?,
        gas_limit: args.gas_limit,
        nonce: args.nonce,
    };

    let prototype = service.message_for_send(params).await?;
    let options = SendOptions {
        force: args.force,
        interactive: args.interactive,
    };

    let mut console = StdConsole::new();
    let pushed = service
        .interactive_send(prototype, options, &mut console)
        .await?;

    println!("{}", pushed.id);
    Ok(())
}
