pub mod assembler;
pub mod assets;
pub mod cli;
pub mod config;
pub mod governor;
pub mod orchestrator;
pub mod prompts;
pub mod reports;
pub mod stages;

// Re-export core types for convenience
pub use taraflow_core::{Asset, AssetKind, SecurityProperty, StageKind, UnitStatus};
