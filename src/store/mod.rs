// Control-surface and ledger persistence
//
// The dashboard owns the run/stop file and the risk settings file; the bot
// only reads them. The trade ledger is the bot's single durable output.

use crate::models::{BotState, LedgerEntry, RiskSettings};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// External run/stop switch and risk settings, polled every cycle
pub trait ControlSurface: Send + Sync {
    /// Current bot state; `Stopped` when the backing store is missing or unreadable
    fn bot_state(&self) -> BotState;

    /// Current risk settings; documented defaults when unreadable
    fn risk_settings(&self) -> RiskSettings;
}

/// Append-only trade ledger
pub trait TradeLedger: Send + Sync {
    /// Append one immutable row
    fn append(&mut self, entry: &LedgerEntry) -> anyhow::Result<()>;

    /// Full history, oldest first (the dashboard reads it the same way)
    fn load(&self) -> anyhow::Result<Vec<LedgerEntry>>;

    /// Durable-state hook run at the end of every cycle
    fn flush(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ControllerFile {
    #[serde(default = "ControllerFile::default_state")]
    state: BotState,
}

impl ControllerFile {
    fn default_state() -> BotState {
        BotState::Stopped
    }
}

/// File-backed control surface reading two dashboard-owned JSON files
pub struct FileControl {
    state_path: PathBuf,
    settings_path: PathBuf,
}

impl FileControl {
    pub fn new(state_path: impl Into<PathBuf>, settings_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            settings_path: settings_path.into(),
        }
    }
}

impl ControlSurface for FileControl {
    fn bot_state(&self) -> BotState {
        read_json::<ControllerFile>(&self.state_path)
            .map(|f| f.state)
            .unwrap_or(BotState::Stopped)
    }

    fn risk_settings(&self) -> RiskSettings {
        read_json::<RiskSettings>(&self.settings_path).unwrap_or_default()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

/// JSON-lines ledger file, one row per event
///
/// The file is opened per append and closed when the handle drops, so a
/// crash mid-cycle loses at most the in-flight row.
pub struct JsonlLedger {
    path: PathBuf,
}

impl JsonlLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TradeLedger for JsonlLedger {
    fn append(&mut self, entry: &LedgerEntry) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating ledger directory {}", parent.display()))?;
            }
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening ledger {}", self.path.display()))?;

        let line = serde_json::to_string(entry)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    fn load(&self) -> anyhow::Result<Vec<LedgerEntry>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("reading ledger"),
        };

        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).context("malformed ledger row"))
            .collect()
    }
}

/// In-memory ledger for tests and dry runs
#[derive(Default)]
pub struct MemoryLedger {
    entries: Vec<LedgerEntry>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TradeLedger for MemoryLedger {
    fn append(&mut self, entry: &LedgerEntry) -> anyhow::Result<()> {
        self.entries.push(entry.clone());
        Ok(())
    }

    fn load(&self) -> anyhow::Result<Vec<LedgerEntry>> {
        Ok(self.entries.clone())
    }
}
