use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::ExecutionMode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None
)]
pub struct Args {
    /// Asset definition file: a JSON array of asset records
    pub assets: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Model identifier sent to the reasoning service
    #[arg(short, long)]
    pub model: Option<String>,

    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Maximum attempts per stage call, including the first
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Per-call timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Output-token budget for routine stages
    #[arg(long)]
    pub max_output_tokens: Option<u32>,

    /// Maximum number of assets analyzed concurrently
    #[arg(long)]
    pub max_concurrent_assets: Option<usize>,

    /// Maximum number of property units analyzed concurrently per asset
    #[arg(long)]
    pub max_concurrent_properties: Option<usize>,

    /// Scheduling backend for stage calls
    #[arg(long, value_enum)]
    pub mode: Option<ExecutionMode>,

    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[arg(long, global = true)]
    pub debug: bool,

    /// Print a default configuration file and exit
    #[arg(long)]
    pub generate_config: bool,
}

pub fn validate_args(args: &Args) -> Result<()> {
    if let Some(assets) = &args.assets {
        if !assets.exists() {
            return Err(anyhow::anyhow!(
                "asset file does not exist: {}",
                assets.display()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_minimal_invocation() {
        let args = Args::parse_from(["taraflow", "assets.json"]);
        assert_eq!(args.assets, Some(PathBuf::from("assets.json")));
        assert!(args.model.is_none());
        assert!(!args.generate_config);
    }

    #[test]
    fn test_parses_mode_values() {
        let args = Args::parse_from(["taraflow", "assets.json", "--mode", "multiplexed"]);
        assert_eq!(args.mode, Some(ExecutionMode::Multiplexed));
        let args = Args::parse_from(["taraflow", "assets.json", "--mode", "worker-pool"]);
        assert_eq!(args.mode, Some(ExecutionMode::WorkerPool));
    }

    #[test]
    fn test_validate_missing_file() {
        let args = Args::parse_from(["taraflow", "/definitely/not/there.json"]);
        assert!(validate_args(&args).is_err());
    }
}
