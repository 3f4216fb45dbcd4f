//! The staged analysis pipeline: drives every (asset, property) unit through
//! the five-stage chain under governed concurrency.
//!
//! Per unit the chain is strictly sequential; across units the governor's
//! two ceilings are the only ordering constraint. A unit's first stage
//! failure sends it to its terminal status and never aborts the batch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, StreamExt};
use tokio::task::JoinSet;

use taraflow_client::CompletionService;
use taraflow_core::{Asset, SecurityProperty, StageKind, StageResults, UnitStatus};

use crate::config::{ExecutionMode, TaraflowConfig};
use crate::governor::{AssetLease, ConcurrencyGovernor};
use crate::stages::{StageExecutor, StageFailure, StageLimits};

/// One security-property analysis thread for one asset.
#[derive(Debug, Clone)]
pub struct PropertyUnit {
    pub asset: Arc<Asset>,
    pub property: SecurityProperty,
}

/// Terminal record of one unit's trip through the stage chain.
#[derive(Debug)]
pub struct UnitOutcome {
    pub unit: PropertyUnit,
    pub results: StageResults,
    pub status: UnitStatus,
    pub failure: Option<StageFailure>,
}

/// Run-level cancellation handle: stops admission of new units while letting
/// in-flight stage calls finish or hit their own timeout.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub type UnitProgress = Arc<dyn Fn(&UnitOutcome) + Send + Sync>;

#[derive(Clone)]
pub struct TaraPipeline {
    executor: Arc<StageExecutor>,
    governor: Arc<ConcurrencyGovernor>,
    mode: ExecutionMode,
    cancel: CancelToken,
    progress: Option<UnitProgress>,
}

impl TaraPipeline {
    pub fn new(service: Arc<dyn CompletionService>, config: &TaraflowConfig) -> Self {
        let limits = StageLimits {
            temperature: config.analysis.temperature,
            max_output_tokens: config.analysis.max_output_tokens,
            long_output_tokens: config.analysis.long_output_tokens,
        };
        Self {
            executor: Arc::new(StageExecutor::new(service, limits)),
            governor: Arc::new(ConcurrencyGovernor::new(
                config.concurrency.max_concurrent_assets,
                config.concurrency.max_concurrent_properties,
            )),
            mode: config.concurrency.mode,
            cancel: CancelToken::default(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: UnitProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Analyze every asset's property units to a terminal status. Returns
    /// one outcome per admitted unit; cancellation only shortens the list by
    /// units that were never admitted.
    pub async fn run(&self, assets: Vec<Arc<Asset>>) -> Vec<UnitOutcome> {
        match self.mode {
            ExecutionMode::Multiplexed => {
                let width = assets.len().max(1);
                stream::iter(assets)
                    .map(|asset| self.process_asset(asset))
                    .buffer_unordered(width)
                    .collect::<Vec<_>>()
                    .await
                    .into_iter()
                    .flatten()
                    .collect()
            }
            ExecutionMode::WorkerPool => {
                let mut set = JoinSet::new();
                for asset in assets {
                    let pipeline = self.clone();
                    set.spawn(async move { pipeline.process_asset(asset).await });
                }
                let mut outcomes = Vec::new();
                while let Some(joined) = set.join_next().await {
                    match joined {
                        Ok(batch) => outcomes.extend(batch),
                        Err(err) => log::error!("asset task panicked: {err}"),
                    }
                }
                outcomes
            }
        }
    }

    async fn process_asset(&self, asset: Arc<Asset>) -> Vec<UnitOutcome> {
        if self.cancel.is_cancelled() {
            log::info!("run cancelled, not admitting asset {}", asset.asset_id);
            return Vec::new();
        }

        let lease = match self.governor.admit_asset().await {
            Ok(lease) => Arc::new(lease),
            Err(_) => return Vec::new(),
        };

        let units: Vec<PropertyUnit> = asset
            .relevant_properties()
            .into_iter()
            .map(|property| PropertyUnit {
                asset: asset.clone(),
                property,
            })
            .collect();
        log::info!(
            "analyzing asset {} ({}) across {} properties",
            asset.asset_id,
            asset.asset_name,
            units.len()
        );

        match self.mode {
            ExecutionMode::Multiplexed => {
                let width = units.len().max(1);
                stream::iter(units)
                    .map(|unit| self.process_unit(lease.clone(), unit))
                    .buffer_unordered(width)
                    .collect::<Vec<_>>()
                    .await
                    .into_iter()
                    .flatten()
                    .collect()
            }
            ExecutionMode::WorkerPool => {
                let mut set = JoinSet::new();
                for unit in units {
                    let pipeline = self.clone();
                    let lease = lease.clone();
                    set.spawn(async move { pipeline.process_unit(lease, unit).await });
                }
                let mut outcomes = Vec::new();
                while let Some(joined) = set.join_next().await {
                    match joined {
                        Ok(Some(outcome)) => outcomes.push(outcome),
                        Ok(None) => {}
                        Err(err) => log::error!("unit task panicked: {err}"),
                    }
                }
                outcomes
            }
        }
    }

    /// A unit occupies one property slot (and transitively its asset's slot)
    /// for the entire chain; slots are not released between stages.
    async fn process_unit(&self, lease: Arc<AssetLease>, unit: PropertyUnit) -> Option<UnitOutcome> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let _slot = lease.admit_property().await.ok()?;

        let outcome = self.run_unit_chain(unit).await;
        if let Some(progress) = &self.progress {
            progress(&outcome);
        }
        Some(outcome)
    }

    async fn run_unit_chain(&self, unit: PropertyUnit) -> UnitOutcome {
        let mut results = StageResults::default();
        let mut failure = None;

        for stage in StageKind::ALL {
            // In-flight calls finish on their own; cancellation only stops
            // the next stage call from being issued.
            if self.cancel.is_cancelled() {
                log::info!(
                    "run cancelled, stopping asset {} property {} before {}",
                    unit.asset.asset_id,
                    unit.property,
                    stage
                );
                break;
            }
            match self.executor.run_stage(&unit, stage, &results).await {
                Ok(output) => results.record(output),
                Err(err) => {
                    log::warn!(
                        "asset {} property {}: {}",
                        unit.asset.asset_id,
                        unit.property,
                        err
                    );
                    failure = Some(err);
                    break;
                }
            }
        }

        let status = if results.is_complete() {
            UnitStatus::Complete
        } else if results.attribute.is_some() {
            UnitStatus::PartiallyComplete
        } else {
            UnitStatus::Failed
        };

        UnitOutcome {
            unit,
            results,
            status,
            failure,
        }
    }
}
