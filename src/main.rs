//! Lotus message send tool.
//!
//! ```text
//!   lotus-tools send <target> <amount>
//!        │
//!        ▼
//!   ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐
//!   │prototype │──▶│ estimate │──▶│  checks  │──▶│ sign+push │──▶ message id
//!   └──────────┘   └──────────┘   └────┬─────┘   └───────────┘
//!                                      │ failed (--interactive)
//!                                      ▼
//!                                 ┌──────────┐
//!                                 │ resolver │ ⇄ fee editor
//!                                 └──────────┘
//! ```

use clap::Parser;
use std::process::ExitCode;

use lotus_tools::cli::{run, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}
