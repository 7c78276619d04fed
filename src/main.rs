use std::sync::Arc;

use clap::Parser;
use tokio::sync::Mutex;

use multibot::config::{BotConfig, Cli};
use multibot::engine::TradeLoop;
use multibot::execution::{
    CoinDcxOrders, ExecutionBackend, LiveExecution, PaperExecution, PositionTracker,
};
use multibot::market::CoinDcxFeed;
use multibot::store::{ControlSurface, FileControl, JsonlLedger};
use multibot::strategy::{default_strategies, MajorityVote};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let config = BotConfig::from_env(&cli);
    config.validate()?;

    tracing::info!(
        "multibot starting in {} mode",
        if config.real_trading { "real" } else { "paper" }
    );

    let control = FileControl::new(&config.state_file, &config.settings_file);
    let risk = control.risk_settings();
    tracing::info!(
        "Budget: {:.2} | SL: {}% | TP: {}% | {} coins",
        risk.budget,
        risk.sl_percent,
        risk.tp_percent,
        config.coins.len()
    );

    let ledger = JsonlLedger::new(&config.ledger_file);
    let tracker = Arc::new(Mutex::new(PositionTracker::new(&risk, Box::new(ledger))));
    let feed = Arc::new(CoinDcxFeed::new());

    let backend: Box<dyn ExecutionBackend> = if config.real_trading {
        let gateway = CoinDcxOrders::new(config.api_key.clone(), config.api_secret.clone());
        Box::new(LiveExecution::new(Box::new(gateway)))
    } else {
        Box::new(PaperExecution::new(tracker.clone()))
    };

    let mut trade_loop = TradeLoop::new(
        config.coins.clone(),
        feed,
        Box::new(control),
        tracker,
        backend,
        default_strategies(),
        Box::new(MajorityVote),
    )
    .with_intervals(config.scan_interval, config.pause_interval);

    let loop_task = tokio::spawn(async move {
        trade_loop.run().await;
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        result = loop_task => {
            tracing::error!("Trading loop exited: {:?}", result);
        }
    }

    tracing::info!("multibot stopped");
    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "multibot=info".into()),
        )
        .init();
}
