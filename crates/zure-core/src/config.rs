//! Configuration types for zure.
//!
//! [`Config::load`] reads `~/.config/zure/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::load_from`] reads an
//! explicit file instead. Both apply `ZURE__SECTION__KEY` environment
//! overrides last. [`Config::defaults`] returns the built-in defaults without
//! touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::search::EscalationPolicy;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[server]
bind = "127.0.0.1:3000"

[upstream]
mirrors = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.openstreetmap.ru/api/interpreter",
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter",
]
per_request_timeout_ms = 8000
query_timeout_s        = 20
user_agent             = "zure/0.1 (proximity place discovery)"

[search]
default_radius_m    = 3000
max_radius_m        = 5000
radius_step_m       = 2000
target_count        = 5
max_results         = 10
direction_range_deg = 45.0
overall_deadline_ms = 20000

[client]
endpoint             = "http://127.0.0.1:3000"
refetch_threshold_m  = 300.0
capacity_max         = 150
location_throttle_ms = 3000
request_timeout_ms   = 25000
"#;

const ENV_PREFIX: &str = "ZURE";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// `[server]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "127.0.0.1:3000".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

/// `[upstream]` section: the interchangeable Overpass mirrors.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_mirrors")]
    pub mirrors: Vec<String>,
    #[serde(default = "default_per_request_timeout_ms")]
    pub per_request_timeout_ms: u64,
    /// Server-side `[timeout:N]` placed in the query itself.
    #[serde(default = "default_query_timeout_s")]
    pub query_timeout_s: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_mirrors() -> Vec<String> {
    vec![
        "https://overpass-api.de/api/interpreter".to_string(),
        "https://overpass.openstreetmap.ru/api/interpreter".to_string(),
        "https://maps.mail.ru/osm/tools/overpass/api/interpreter".to_string(),
    ]
}
fn default_per_request_timeout_ms() -> u64 { 8_000 }
fn default_query_timeout_s() -> u32 { 20 }
fn default_user_agent() -> String { "zure/0.1 (proximity place discovery)".to_string() }

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            mirrors: default_mirrors(),
            per_request_timeout_ms: default_per_request_timeout_ms(),
            query_timeout_s: default_query_timeout_s(),
            user_agent: default_user_agent(),
        }
    }
}

impl UpstreamConfig {
    pub fn per_request_timeout(&self) -> Duration {
        Duration::from_millis(self.per_request_timeout_ms)
    }
}

/// `[search]` section: radius escalation and ranking defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_radius_m")]
    pub default_radius_m: u32,
    #[serde(default = "default_max_radius_m")]
    pub max_radius_m: u32,
    #[serde(default = "default_radius_step_m")]
    pub radius_step_m: u32,
    #[serde(default = "default_target_count")]
    pub target_count: usize,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_direction_range_deg")]
    pub direction_range_deg: f64,
    /// `0` disables the overall deadline.
    #[serde(default = "default_overall_deadline_ms")]
    pub overall_deadline_ms: u64,
}

fn default_radius_m() -> u32 { 3_000 }
fn default_max_radius_m() -> u32 { 5_000 }
fn default_radius_step_m() -> u32 { 2_000 }
fn default_target_count() -> usize { 5 }
fn default_max_results() -> usize { 10 }
fn default_direction_range_deg() -> f64 { 45.0 }
fn default_overall_deadline_ms() -> u64 { 20_000 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_m: default_radius_m(),
            max_radius_m: default_max_radius_m(),
            radius_step_m: default_radius_step_m(),
            target_count: default_target_count(),
            max_results: default_max_results(),
            direction_range_deg: default_direction_range_deg(),
            overall_deadline_ms: default_overall_deadline_ms(),
        }
    }
}

impl SearchConfig {
    pub fn escalation_policy(&self) -> EscalationPolicy {
        EscalationPolicy {
            target_count: self.target_count,
            max_results: self.max_results,
            overall_deadline: (self.overall_deadline_ms > 0)
                .then(|| Duration::from_millis(self.overall_deadline_ms)),
        }
    }
}

/// `[client]` section: the device-side result cache.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_refetch_threshold_m")]
    pub refetch_threshold_m: f64,
    #[serde(default = "default_capacity_max")]
    pub capacity_max: usize,
    #[serde(default = "default_location_throttle_ms")]
    pub location_throttle_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_endpoint() -> String { "http://127.0.0.1:3000".to_string() }
fn default_refetch_threshold_m() -> f64 { 300.0 }
fn default_capacity_max() -> usize { 150 }
fn default_location_throttle_ms() -> u64 { 3_000 }
fn default_request_timeout_ms() -> u64 { 25_000 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            refetch_threshold_m: default_refetch_threshold_m(),
            capacity_max: default_capacity_max(),
            location_throttle_ms: default_location_throttle_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/zure/config.toml`, layered on top of the built-in
    /// defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load from an explicit file, layered on top of the built-in defaults.
    /// A missing file is an error here, unlike [`Config::load`].
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        Self::load_layered(path, env_overrides())
    }

    fn load_layered(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(true))
            .add_source(env)
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Reject settings the search pipeline cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.upstream.mirrors.is_empty() {
            anyhow::bail!("upstream.mirrors must list at least one mirror");
        }
        if self.upstream.per_request_timeout_ms == 0 {
            anyhow::bail!("upstream.per_request_timeout_ms must be positive");
        }
        let s = &self.search;
        if s.default_radius_m == 0 || s.max_radius_m == 0 || s.radius_step_m == 0 {
            anyhow::bail!("search radii and step must be positive");
        }
        if s.max_results == 0 || s.target_count > s.max_results {
            anyhow::bail!(
                "search.target_count ({}) must not exceed search.max_results ({})",
                s.target_count,
                s.max_results
            );
        }
        if !(s.direction_range_deg > 0.0 && s.direction_range_deg <= 180.0) {
            anyhow::bail!("search.direction_range_deg must be in (0, 180]");
        }
        if self.client.capacity_max == 0 {
            anyhow::bail!("client.capacity_max must be positive");
        }
        if !(self.client.refetch_threshold_m >= 0.0) {
            anyhow::bail!("client.refetch_threshold_m must be non-negative");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Path and environment helpers
// ---------------------------------------------------------------------------

/// `ZURE__SECTION__KEY` overrides; `upstream.mirrors` is comma-separated.
fn env_overrides() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("upstream.mirrors")
}

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("zure")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
