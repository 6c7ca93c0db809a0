use clap::Subcommand;

use crate::blockchain::node::WalletApi;
use crate::cli::{CliError, Service};

#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    /// List addresses held by the wallet
    List,
    /// Print the default sending address
    Default,
}

pub async fn run(service: &Service, command: WalletCommand) -> Result<(), CliError> {
    let wallet = service.wallet();
    match command {
        WalletCommand::List => {
            for address in wallet.list_addresses().await? {
                println!("{}", address);
            }
        }
        WalletCommand::Default => match wallet.default_address().await? {
            Some(address) => println!("{}", address),
            None => return Err(CliError::Args("no default address is set".into())),
        },
    }
    Ok(())
}
