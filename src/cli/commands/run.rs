use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};

use taraflow_client::HttpCompletionClient;
use taraflow_core::UnitStatus;

use crate::assembler::assemble;
use crate::assets::load_assets;
use crate::cli::args::Args;
use crate::config::TaraflowConfig;
use crate::orchestrator::TaraPipeline;
use crate::reports::write_reports;

pub async fn run_analysis_command(args: Args) -> Result<()> {
    // Load configuration with precedence: CLI args > env vars > config file
    let env_vars: HashMap<String, String> = std::env::vars().collect();
    let config = TaraflowConfig::load_with_precedence(args.config.clone(), &args, &env_vars)?;
    config.validate()?;

    let assets_file = config
        .paths
        .assets_file
        .clone()
        .context("asset file is required")?;
    let assets = load_assets(&assets_file)?;
    let total_units: usize = assets.iter().map(|a| a.relevant_properties().len()).sum();

    println!(
        "📋 Loaded {} assets ({} property units) from {}",
        assets.len(),
        total_units,
        assets_file.display()
    );
    log::info!(
        "analysis starts with model {} via {}, mode {:?}",
        config.api.model,
        config.api.base_url,
        config.concurrency.mode
    );

    let client = Arc::new(
        HttpCompletionClient::new(config.client_config())
            .context("failed to construct completion client")?,
    );

    let progress_bar = ProgressBar::new(total_units as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    progress_bar.set_message("Analyzing assets...");

    let bar = progress_bar.clone();
    let verbose = args.verbosity > 0;
    let debug = args.debug;
    let pipeline = TaraPipeline::new(client, &config).with_progress(Arc::new(move |outcome| {
        bar.set_message(format!(
            "{} [{}] {}",
            outcome.unit.asset.asset_id,
            outcome.unit.property,
            outcome.status.as_str()
        ));
        if verbose {
            bar.println(format!(
                "📄 {} [{}] finished as {}",
                outcome.unit.asset.asset_id,
                outcome.unit.property,
                outcome.status.as_str()
            ));
        }
        if debug {
            log::debug!("unit results: {:?}", outcome.results);
        }
        bar.inc(1);
    }));

    let started_at = Utc::now();
    let outcomes = pipeline.run(assets.clone()).await;
    progress_bar.finish_with_message("Analysis completed");

    let complete = outcomes
        .iter()
        .filter(|o| o.status == UnitStatus::Complete)
        .count();
    let partial = outcomes
        .iter()
        .filter(|o| o.status == UnitStatus::PartiallyComplete)
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| o.status == UnitStatus::Failed)
        .count();
    println!(
        "✅ {} units complete, {} partially complete, {} failed",
        complete, partial, failed
    );

    let (tara, csr) = assemble(&assets, &outcomes);
    write_reports(&config.paths.output_dir, &tara, &csr, started_at)?;
    println!(
        "📊 Reports written to {}",
        config.paths.output_dir.display()
    );

    Ok(())
}
