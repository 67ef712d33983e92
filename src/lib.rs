pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::autofill::FillScope;
use crate::core::cache::QuoteCache;
use crate::core::config::{AppConfig, SamplingMode};
use crate::core::month::MonthLabel;
use crate::core::period::MonthField;
use crate::core::rates::ExchangeKind;
use crate::providers::util::RetryPolicy;
use crate::providers::{BcraInflationProvider, BluelyticsProvider};
use crate::store::PeriodStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Commands that operate on stored periods.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    List,
    Show {
        id: String,
    },
    Create {
        name: String,
        description: Option<String>,
        start: MonthLabel,
        end: MonthLabel,
    },
    Duplicate {
        id: String,
    },
    Delete {
        id: String,
    },
    AddMonth {
        id: String,
        label: MonthLabel,
    },
    RepeatMonth {
        id: String,
        label: Option<MonthLabel>,
    },
    /// `row` is 1-based, as printed by `show`.
    EditMonth {
        id: String,
        row: usize,
        field: MonthField,
        value: String,
    },
    DeleteMonth {
        id: String,
        row: usize,
    },
    FillExchange {
        id: String,
        kind: Option<ExchangeKind>,
        sampling: Option<SamplingMode>,
        scope: FillScope,
    },
    FillInflation {
        id: String,
        scope: FillScope,
    },
}

/// Everything a command needs, built once per invocation.
pub struct App {
    pub config: AppConfig,
    pub store: PeriodStore,
    quote_cache: Arc<QuoteCache>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = PeriodStore::from_config(&config)?;
        Ok(Self {
            config,
            store,
            quote_cache: Arc::new(QuoteCache::new()),
        })
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.config.providers.retries,
            delay_ms: self.config.providers.retry_delay_ms,
        }
    }

    pub fn exchange_provider(&self) -> Result<BluelyticsProvider> {
        Ok(BluelyticsProvider::new(
            &self.config.providers.bluelytics.base_url,
            Arc::clone(&self.quote_cache),
        )?
        .with_retry_policy(self.retry_policy()))
    }

    pub fn inflation_provider(&self) -> Result<BcraInflationProvider> {
        Ok(
            BcraInflationProvider::new(&self.config.providers.bcra.base_url)?
                .with_retry_policy(self.retry_policy()),
        )
    }

    pub async fn execute(&self, command: AppCommand) -> Result<()> {
        debug!(?command, "Executing command");
        match command {
            AppCommand::List => cli::periods::list(&self.store),
            AppCommand::Show { id } => cli::detail::show(&self.store, &id),
            AppCommand::Create {
                name,
                description,
                start,
                end,
            } => cli::periods::create(&self.store, &name, description, start, end).map(|_| ()),
            AppCommand::Duplicate { id } => cli::periods::duplicate(&self.store, &id).map(|_| ()),
            AppCommand::Delete { id } => cli::periods::delete(&self.store, &id),
            AppCommand::AddMonth { id, label } => cli::detail::add_month(&self.store, &id, label),
            AppCommand::RepeatMonth { id, label } => {
                cli::detail::repeat_month(&self.store, &id, label)
            }
            AppCommand::EditMonth {
                id,
                row,
                field,
                value,
            } => cli::detail::edit_month(&self.store, &id, row, field, &value),
            AppCommand::DeleteMonth { id, row } => {
                cli::detail::delete_month(&self.store, &id, row)
            }
            AppCommand::FillExchange {
                id,
                kind,
                sampling,
                scope,
            } => {
                let provider = self.exchange_provider()?;
                let kind = kind.unwrap_or(self.config.autofill.exchange_kind);
                let sampling = self.config.autofill.rate_sampling(sampling);
                cli::autofill::fill_exchange(&self.store, &provider, &id, kind, sampling, scope)
                    .await?;
                let (hits, misses) = self.quote_cache.stats();
                debug!(hits, misses, "Quote cache usage");
                Ok(())
            }
            AppCommand::FillInflation { id, scope } => {
                let provider = self.inflation_provider()?;
                cli::autofill::fill_inflation(&self.store, &provider, &id, scope)
                    .await
                    .map(|_| ())
            }
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("realgain starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        providers = ?config.providers,
        autofill = ?config.autofill,
        encrypted = config.secret_key().is_some(),
        "Loaded config"
    );

    App::new(config)?.execute(command).await
}
