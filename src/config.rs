use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Coins scanned each cycle, in priority order
pub const DEFAULT_COINS: &[&str] = &[
    "SOL-INR", "XRP-INR", "USDT-INR", "BUSD-INR", "DOT-INR", "ADA-INR", "MATIC-INR", "ETH-INR",
    "BTC-INR", "LINK-INR",
];

const SCAN_INTERVAL_SECS: u64 = 10;
const PAUSE_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Parser)]
#[command(name = "multibot", about = "Multi-strategy crypto trading bot")]
pub struct Cli {
    /// Path to the dashboard-owned run/stop file
    #[arg(long, default_value = "controller.json")]
    pub state_file: PathBuf,

    /// Path to the risk settings file
    #[arg(long, default_value = "settings.json")]
    pub settings_file: PathBuf,

    /// Path to the append-only trade ledger
    #[arg(long, default_value = "logs/trades.jsonl")]
    pub ledger_file: PathBuf,

    /// Submit real orders instead of paper fills
    #[arg(long)]
    pub real: bool,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub coins: Vec<String>,
    pub real_trading: bool,
    pub api_key: String,
    pub api_secret: String,
    pub state_file: PathBuf,
    pub settings_file: PathBuf,
    pub ledger_file: PathBuf,
    pub scan_interval: Duration,
    pub pause_interval: Duration,
}

impl BotConfig {
    /// Assemble configuration from CLI flags and environment variables
    pub fn from_env(cli: &Cli) -> Self {
        let real_env = std::env::var("REAL_TRADING")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            coins: DEFAULT_COINS.iter().map(|c| c.to_string()).collect(),
            real_trading: cli.real || real_env,
            api_key: env_trimmed("COINDCX_API_KEY"),
            api_secret: env_trimmed("COINDCX_API_SECRET"),
            state_file: cli.state_file.clone(),
            settings_file: cli.settings_file.clone(),
            ledger_file: cli.ledger_file.clone(),
            scan_interval: Duration::from_secs(SCAN_INTERVAL_SECS),
            pause_interval: Duration::from_secs(PAUSE_INTERVAL_SECS),
        }
    }

    /// Fails when real trading is enabled without API credentials; everything
    /// else has a workable default.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.real_trading && (self.api_key.is_empty() || self.api_secret.is_empty()) {
            anyhow::bail!(
                "real trading is enabled but COINDCX_API_KEY/COINDCX_API_SECRET are not set"
            );
        }
        Ok(())
    }
}

fn env_trimmed(key: &str) -> String {
    std::env::var(key).unwrap_or_default().trim().to_string()
}
