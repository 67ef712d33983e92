pub mod cipher;

use crate::core::config::AppConfig;
use crate::core::period::Period;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use cipher::{RecordCipher, is_sealed};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::{debug, info};

const PERIODS_PARTITION: &str = "periods";

/// Periods persisted in a fjall keyspace, one JSON value per period id.
///
/// When a secret key is configured every value written is sealed with
/// [`RecordCipher`]. Plain values written before a key was set stay readable.
pub struct PeriodStore {
    keyspace: Keyspace,
    periods: PartitionHandle,
    cipher: Option<RecordCipher>,
}

impl PeriodStore {
    pub fn open(path: &Path, secret_key: Option<&str>) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open period store at {}", path.display()))?;
        let periods = keyspace
            .open_partition(PERIODS_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open periods partition")?;
        let cipher = secret_key.map(RecordCipher::from_secret).transpose()?;
        debug!(
            "Opened period store at {} (encrypted: {})",
            path.display(),
            cipher.is_some()
        );
        Ok(Self {
            keyspace,
            periods,
            cipher,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let path = config.data_dir()?.join("periods");
        Self::open(&path, config.secret_key().as_deref())
    }

    fn encode(&self, period: &Period) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(period)?;
        match &self.cipher {
            Some(cipher) => cipher.seal(&json),
            None => Ok(json),
        }
    }

    fn decode(&self, raw: &[u8]) -> Result<Period> {
        let json = if is_sealed(raw) {
            match &self.cipher {
                Some(cipher) => cipher.open(raw)?,
                None => bail!("Period is encrypted and no secret key is configured"),
            }
        } else {
            raw.to_vec()
        };
        serde_json::from_slice(&json).context("Failed to decode stored period")
    }

    fn write(&self, period: &Period) -> Result<()> {
        self.periods.insert(period.id.as_str(), self.encode(period)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    pub fn insert(&self, period: &Period) -> Result<()> {
        if self.periods.contains_key(&period.id)? {
            bail!("A period with id {} already exists", period.id);
        }
        self.write(period)?;
        info!("Stored period {} ({})", period.id, period.name);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<Period>> {
        self.periods
            .get(id)?
            .map(|raw| self.decode(&raw))
            .transpose()
    }

    /// Like [`PeriodStore::get`] but a missing id is an error.
    pub fn require(&self, id: &str) -> Result<Period> {
        self.get(id)?
            .with_context(|| format!("No period found with id {id}"))
    }

    /// All periods, oldest first.
    pub fn list(&self) -> Result<Vec<Period>> {
        let mut periods = self
            .periods
            .iter()
            .map(|entry| {
                let (_, raw) = entry?;
                self.decode(&raw)
            })
            .collect::<Result<Vec<_>>>()?;
        periods.sort_by_key(|p| p.created_at);
        Ok(periods)
    }

    /// Replaces a stored period and stamps its `updated_at`.
    pub fn update(&self, period: &mut Period) -> Result<()> {
        if !self.periods.contains_key(&period.id)? {
            bail!("No period found with id {}", period.id);
        }
        period.updated_at = Utc::now();
        self.write(period)?;
        debug!("Updated period {}", period.id);
        Ok(())
    }

    /// Returns whether a period was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        if !self.periods.contains_key(id)? {
            return Ok(false);
        }
        self.periods.remove(id)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        info!("Deleted period {}", id);
        Ok(true)
    }

    /// Stores a copy of the period `id` and returns it.
    pub fn duplicate(&self, id: &str) -> Result<Period> {
        let original = self.require(id)?;
        let mut copy = original.duplicated();
        let base = copy.id.clone();
        let mut suffix = 1;
        while self.periods.contains_key(&copy.id)? {
            copy.id = format!("{base}-{suffix}");
            suffix += 1;
        }
        self.insert(&copy)?;
        Ok(copy)
    }
}
