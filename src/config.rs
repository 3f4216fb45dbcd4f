use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use taraflow_client::ClientConfig;

use crate::cli::args::Args;

/// Run configuration, assembled with precedence CLI args > environment
/// (`TARAFLOW_*`) > TOML config file > defaults. The orchestrator and the
/// completion client receive explicit structures built from this; nothing
/// downstream reads process state on its own.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct TaraflowConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub concurrency: ConcurrencyConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiConfig {
    /// API key for the reasoning service. Usually supplied via the
    /// TARAFLOW_API_KEY environment variable rather than the config file.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "Pro/deepseek-ai/DeepSeek-V3.2-Exp".to_string()
}

fn default_base_url() -> String {
    "https://api.siliconflow.cn/v1".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AnalysisConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Output-token budget for routine stages.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Output-token budget for the stages producing long structured output
    /// (threat scenarios, control requirements).
    #[serde(default = "default_long_output_tokens")]
    pub long_output_tokens: u32,

    /// Hard upper bound on any stage's output-token budget.
    #[serde(default = "default_output_token_ceiling")]
    pub output_token_ceiling: u32,
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    8000
}

fn default_long_output_tokens() -> u32 {
    12_000
}

fn default_output_token_ceiling() -> u32 {
    16_000
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            long_output_tokens: default_long_output_tokens(),
            output_token_ceiling: default_output_token_ceiling(),
        }
    }
}

/// Scheduling backend for stage calls. Both modes honor the same ordering
/// and ceiling guarantees; they differ only in how tasks are multiplexed.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// All stage calls multiplexed on one cooperative context.
    #[default]
    Multiplexed,
    /// One spawned task per asset and per unit.
    WorkerPool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ConcurrencyConfig {
    #[serde(default = "default_max_concurrent_assets")]
    pub max_concurrent_assets: usize,

    /// Property-unit ceiling, scoped per asset: every asset gets its own
    /// budget of this size.
    #[serde(default = "default_max_concurrent_properties")]
    pub max_concurrent_properties: usize,

    #[serde(default)]
    pub mode: ExecutionMode,
}

fn default_max_concurrent_assets() -> usize {
    5
}

fn default_max_concurrent_properties() -> usize {
    10
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_concurrent_assets: default_max_concurrent_assets(),
            max_concurrent_properties: default_max_concurrent_properties(),
            mode: ExecutionMode::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PathsConfig {
    /// Asset definition file (JSON array of asset records).
    pub assets_file: Option<PathBuf>,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./reports")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            assets_file: None,
            output_dir: default_output_dir(),
        }
    }
}

impl TaraflowConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with precedence: CLI args > environment variables >
    /// config file > defaults.
    pub fn load_with_precedence(
        config_path: Option<PathBuf>,
        args: &Args,
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(env);
        config.apply_args(args);
        Ok(config)
    }

    fn apply_env(&mut self, env: &HashMap<String, String>) {
        if let Some(key) = env.get("TARAFLOW_API_KEY") {
            self.api.api_key = key.clone();
        }
        if let Some(model) = env.get("TARAFLOW_MODEL") {
            self.api.model = model.clone();
        }
        if let Some(url) = env.get("TARAFLOW_BASE_URL") {
            self.api.base_url = url.clone();
        }
        if let Some(retries) = env.get("TARAFLOW_MAX_RETRIES") {
            match retries.parse() {
                Ok(value) => self.api.max_retries = value,
                Err(_) => log::warn!("ignoring non-numeric TARAFLOW_MAX_RETRIES: {retries}"),
            }
        }
        if let Some(timeout) = env.get("TARAFLOW_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(value) => self.api.timeout_secs = value,
                Err(_) => log::warn!("ignoring non-numeric TARAFLOW_TIMEOUT_SECS: {timeout}"),
            }
        }
        if let Some(tokens) = env.get("TARAFLOW_MAX_OUTPUT_TOKENS") {
            match tokens.parse() {
                Ok(value) => self.analysis.max_output_tokens = value,
                Err(_) => {
                    log::warn!("ignoring non-numeric TARAFLOW_MAX_OUTPUT_TOKENS: {tokens}")
                }
            }
        }
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(assets) = &args.assets {
            self.paths.assets_file = Some(assets.clone());
        }
        if let Some(model) = &args.model {
            self.api.model = model.clone();
        }
        if let Some(url) = &args.api_base_url {
            self.api.base_url = url.clone();
        }
        if let Some(retries) = args.max_retries {
            self.api.max_retries = retries;
        }
        if let Some(timeout) = args.timeout_secs {
            self.api.timeout_secs = timeout;
        }
        if let Some(tokens) = args.max_output_tokens {
            self.analysis.max_output_tokens = tokens;
        }
        if let Some(assets) = args.max_concurrent_assets {
            self.concurrency.max_concurrent_assets = assets;
        }
        if let Some(properties) = args.max_concurrent_properties {
            self.concurrency.max_concurrent_properties = properties;
        }
        if let Some(mode) = args.mode {
            self.concurrency.mode = mode;
        }
        if let Some(output_dir) = &args.output_dir {
            self.paths.output_dir = output_dir.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.paths.assets_file.is_none() {
            return Err(anyhow!(
                "an asset file must be given on the command line or configured under [paths]"
            ));
        }
        if self.concurrency.max_concurrent_assets == 0 {
            return Err(anyhow!("max_concurrent_assets must be at least 1"));
        }
        if self.concurrency.max_concurrent_properties == 0 {
            return Err(anyhow!("max_concurrent_properties must be at least 1"));
        }
        if self.analysis.max_output_tokens == 0
            || self.analysis.max_output_tokens > self.analysis.output_token_ceiling
        {
            return Err(anyhow!(
                "max_output_tokens must be in 1..={}",
                self.analysis.output_token_ceiling
            ));
        }
        if self.analysis.long_output_tokens > self.analysis.output_token_ceiling {
            return Err(anyhow!(
                "long_output_tokens must not exceed the output token ceiling {}",
                self.analysis.output_token_ceiling
            ));
        }
        Ok(())
    }

    /// The explicit client configuration handed to the completion client.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_api_key(self.api.api_key.clone())
            .with_model(self.api.model.clone())
            .with_api_base_url(self.api.base_url.clone())
            .with_max_retries(self.api.max_retries)
            .with_timeout(self.api.timeout_secs)
            .with_output_token_ceiling(self.analysis.output_token_ceiling)
    }

    /// A commented default config suitable for `--generate-config`.
    pub fn generate_default_config() -> String {
        let mut config = Self::default();
        config.paths.assets_file = Some(PathBuf::from("assets.json"));
        match toml::to_string_pretty(&config) {
            Ok(rendered) => format!(
                "# taraflow configuration\n# API key is usually supplied via TARAFLOW_API_KEY\n{rendered}"
            ),
            Err(_) => String::new(),
        }
    }
}
