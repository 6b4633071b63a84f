//! Portfolio snapshot persistence.

use super::holdings::Holdings;
use super::registry::InstrumentRegistry;
use crate::types::PricedInstrument;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable overriding the snapshot location.
pub const PORTFOLIO_FILE_ENV: &str = "HOLDINGS_PORTFOLIO_FILE";

/// A position as stored on disk, referring to its instrument by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionEntry {
    pub instrument: String,
    pub quantity: f64,
}

/// Serializable form of a registry plus positions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PortfolioSnapshot {
    /// Instruments with their price histories
    #[serde(default)]
    pub instruments: Vec<PricedInstrument>,
    /// Positions in insertion order
    #[serde(default)]
    pub positions: Vec<PositionEntry>,
    /// When the snapshot was first saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the snapshot was last saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PortfolioSnapshot {
    /// Build a registry holding every stored instrument.
    pub fn registry(&self) -> Result<InstrumentRegistry> {
        let mut registry = InstrumentRegistry::new();
        for instrument in &self.instruments {
            registry.register(instrument.clone())?;
        }
        Ok(registry)
    }

    /// Rebuild holdings over `registry` from the stored positions.
    ///
    /// Repeated entries for one instrument accumulate.
    pub fn holdings<'r>(&self, registry: &'r InstrumentRegistry) -> Result<Holdings<'r>> {
        let mut holdings = Holdings::new(registry);
        for entry in &self.positions {
            let id = registry
                .find(&entry.instrument)
                .ok_or_else(|| Error::InstrumentNotFound(entry.instrument.clone()))?;
            holdings.add_position(id, entry.quantity)?;
        }
        Ok(holdings)
    }
}

/// Snapshot store that keeps instruments and positions in a JSON file.
#[derive(Debug)]
pub struct PortfolioStore {
    /// Path to the snapshot JSON file
    path: PathBuf,
    /// In-memory snapshot
    snapshot: PortfolioSnapshot,
    /// Set when the file on disk could not be loaded; blocks `save`
    load_failed: bool,
}

impl PortfolioStore {
    /// Open the store at the default path.
    ///
    /// Default path: `~/.holdings/portfolio.json`
    /// Can be overridden with `HOLDINGS_PORTFOLIO_FILE` environment variable.
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    /// Open the store at a custom path.
    ///
    /// An unreadable or corrupt file is logged and treated as empty for
    /// reads. [`save`](Self::save) refuses to overwrite it until a
    /// [`reload`](Self::reload) succeeds.
    pub fn with_path(path: PathBuf) -> Self {
        match Self::load_from_path(&path) {
            Ok(snapshot) => Self {
                path,
                snapshot,
                load_failed: false,
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable portfolio file");
                Self {
                    path,
                    snapshot: PortfolioSnapshot::default(),
                    load_failed: true,
                }
            }
        }
    }

    /// Open the store at `path`, failing on an unreadable or corrupt file.
    ///
    /// A missing file still opens as an empty snapshot.
    pub fn open(path: PathBuf) -> Result<Self> {
        let snapshot = Self::load_from_path(&path)?;
        Ok(Self {
            path,
            snapshot,
            load_failed: false,
        })
    }

    /// Create an in-memory store (no persistence).
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            snapshot: PortfolioSnapshot::default(),
            load_failed: false,
        }
    }

    /// Get the default snapshot file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(PORTFOLIO_FILE_ENV) {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".holdings/portfolio.json"))
            .unwrap_or_else(|| PathBuf::from("portfolio.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_path(path: &Path) -> Result<PortfolioSnapshot> {
        if !path.exists() {
            return Ok(PortfolioSnapshot::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the snapshot to disk.
    ///
    /// Fails with [`Error::UnreadableSnapshot`] if the file could not be
    /// loaded when the store was opened, leaving it untouched.
    pub fn save(&mut self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }
        if self.load_failed {
            return Err(Error::UnreadableSnapshot(self.path.display().to_string()));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        if self.snapshot.created_at.is_none() {
            self.snapshot.created_at = Some(Utc::now());
        }
        self.snapshot.updated_at = Some(Utc::now());

        let content = serde_json::to_string_pretty(&self.snapshot)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Reload the snapshot from disk, surfacing read and parse errors.
    pub fn reload(&mut self) -> Result<()> {
        self.snapshot = Self::load_from_path(&self.path)?;
        self.load_failed = false;
        Ok(())
    }

    pub fn snapshot(&self) -> &PortfolioSnapshot {
        &self.snapshot
    }

    /// Store a new instrument. Names must be unique.
    pub fn add_instrument(&mut self, instrument: PricedInstrument) -> Result<()> {
        if self.find_instrument(instrument.name()).is_some() {
            return Err(Error::DuplicateInstrument(instrument.name().to_string()));
        }
        self.snapshot.instruments.push(instrument);
        Ok(())
    }

    /// Find a stored instrument by name.
    pub fn find_instrument(&self, name: &str) -> Option<&PricedInstrument> {
        self.snapshot.instruments.iter().find(|i| i.name() == name)
    }

    /// Add shares of a stored instrument, accumulating onto any existing entry.
    ///
    /// Returns the new total quantity for that instrument.
    pub fn add_position(&mut self, instrument: &str, quantity: f64) -> Result<f64> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(Error::InvalidQuantity(quantity));
        }
        if self.find_instrument(instrument).is_none() {
            return Err(Error::InstrumentNotFound(instrument.to_string()));
        }

        match self
            .snapshot
            .positions
            .iter_mut()
            .find(|p| p.instrument == instrument)
        {
            Some(entry) => {
                entry.quantity += quantity;
                Ok(entry.quantity)
            }
            None => {
                self.snapshot.positions.push(PositionEntry {
                    instrument: instrument.to_string(),
                    quantity,
                });
                Ok(quantity)
            }
        }
    }
}

impl Default for PortfolioStore {
    fn default() -> Self {
        Self::new()
    }
}
