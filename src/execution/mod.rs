// Order execution module
pub mod backend;
pub mod orders;
pub mod tracker;

pub use backend::{ExecutionBackend, ExecutionReport, LiveExecution, PaperExecution};
pub use orders::{CoinDcxOrders, OrderGateway, OrderReport};
pub use tracker::{PositionTracker, TrackerError, TradeState};
