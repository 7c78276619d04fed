use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::orders::{OrderGateway, OrderReport};
use super::tracker::PositionTracker;
use crate::models::Side;

/// Outcome of dispatching an actionable signal
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub accepted: bool,
    pub detail: String,
}

/// One capability, two backends: simulate a fill or submit a real order
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn execute(&self, pair: &str, side: Side, price: f64, quantity: f64)
        -> ExecutionReport;
}

/// Paper backend: a fill is an opened tracked position
pub struct PaperExecution {
    tracker: Arc<Mutex<PositionTracker>>,
}

impl PaperExecution {
    pub fn new(tracker: Arc<Mutex<PositionTracker>>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl ExecutionBackend for PaperExecution {
    async fn execute(
        &self,
        pair: &str,
        side: Side,
        price: f64,
        _quantity: f64,
    ) -> ExecutionReport {
        // The tracker sizes the fill from its own budget
        let result = self.tracker.lock().await.open(pair, side, price);
        match result {
            Ok(id) => ExecutionReport {
                accepted: true,
                detail: format!("paper fill, position {}", id),
            },
            Err(e) => ExecutionReport {
                accepted: false,
                detail: e.to_string(),
            },
        }
    }
}

/// Live backend: submits a signed market order through the exchange gateway
///
/// Gateway failures end up in the report payload; nothing here is fatal to
/// the trading loop.
pub struct LiveExecution {
    gateway: Box<dyn OrderGateway>,
}

impl LiveExecution {
    pub fn new(gateway: Box<dyn OrderGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ExecutionBackend for LiveExecution {
    async fn execute(&self, pair: &str, side: Side, price: f64, quantity: f64) -> ExecutionReport {
        // The exchange rejects over-precise quantities
        let quantity = (quantity * 10_000.0).round() / 10_000.0;

        match self.gateway.submit_order(side, pair, price, quantity).await {
            OrderReport::Response(value) => ExecutionReport {
                accepted: true,
                detail: value.to_string(),
            },
            OrderReport::Failed(message) => ExecutionReport {
                accepted: false,
                detail: message,
            },
        }
    }
}
