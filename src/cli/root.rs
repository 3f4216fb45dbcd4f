use anyhow::Result;
use clap::Parser;

use crate::cli::args::{Args, validate_args};
use crate::cli::commands::run_analysis_command;
use crate::config::TaraflowConfig;

pub struct RootCommand;

impl RootCommand {
    pub async fn execute() -> Result<()> {
        println!(
            r#"
      ┌─────────────┐
      │  ▲  ▲  ▲  ▲ │
      │  █  █  █  █ │
      │  ▀──▀──▀──▀ │
      └──────┬──────┘
             │
      T A R A F L O W
             │
          v{}
"#,
            env!("CARGO_PKG_VERSION")
        );

        let args = Args::parse();

        if args.generate_config {
            println!("{}", TaraflowConfig::generate_default_config());
            return Ok(());
        }

        validate_args(&args)?;
        run_analysis_command(args).await
    }
}
