use crate::core::rates::{ExchangeKind, RateSampling};
use anyhow::{Context, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_RATE_DAY: u32 = 5;
pub const SECRET_KEY_ENV: &str = "REALGAIN_SECRET_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderEndpoint {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default = "default_bluelytics")]
    pub bluelytics: ProviderEndpoint,
    #[serde(default = "default_bcra")]
    pub bcra: ProviderEndpoint,
    #[serde(default = "default_retries")]
    pub retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_bluelytics() -> ProviderEndpoint {
    ProviderEndpoint {
        base_url: "https://api.bluelytics.com.ar/v2".to_string(),
    }
}

fn default_bcra() -> ProviderEndpoint {
    ProviderEndpoint {
        base_url: "https://api.bcra.gob.ar".to_string(),
    }
}

fn default_retries() -> usize {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            bluelytics: default_bluelytics(),
            bcra: default_bcra(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AutofillConfig {
    #[serde(default)]
    pub exchange_kind: ExchangeKind,
    #[serde(default)]
    pub sampling: SamplingMode,
    #[serde(default = "default_rate_day")]
    pub rate_day: u32,
}

fn default_rate_day() -> u32 {
    DEFAULT_RATE_DAY
}

impl Default for AutofillConfig {
    fn default() -> Self {
        AutofillConfig {
            exchange_kind: ExchangeKind::default(),
            sampling: SamplingMode::default(),
            rate_day: DEFAULT_RATE_DAY,
        }
    }
}

/// How a month's exchange rate is sampled, as written in the config file.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    #[default]
    Day,
    Average,
}

impl AutofillConfig {
    /// Resolves the sampling, falling back to the default day when the
    /// configured one is outside 1..=28.
    pub fn rate_sampling(&self, mode: Option<SamplingMode>) -> RateSampling {
        match mode.unwrap_or(self.sampling) {
            SamplingMode::Average => RateSampling::MonthlyAverage,
            SamplingMode::Day => {
                if (1..=28).contains(&self.rate_day) {
                    RateSampling::Day(self.rate_day)
                } else {
                    debug!(
                        "Configured rate day {} is out of range, using {}",
                        self.rate_day, DEFAULT_RATE_DAY
                    );
                    RateSampling::Day(DEFAULT_RATE_DAY)
                }
            }
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub autofill: AutofillConfig,
    pub data_path: Option<String>,
    pub secret_key: Option<String>,
}

impl AppConfig {
    /// Loads the config from the default location, or the defaults when no
    /// file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "realgain", "realgain")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "realgain", "realgain")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// The storage key, with the environment taking precedence over the file.
    pub fn secret_key(&self) -> Option<String> {
        std::env::var(SECRET_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.secret_key.clone())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
