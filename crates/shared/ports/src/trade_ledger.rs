use async_trait::async_trait;
use ticker_core::{Timestamp, TradeRecord};

use crate::error::StoreResult;

/// Read-only view of player trades, written by the order-entry subsystem
#[async_trait]
pub trait TradeLedger: Send + Sync {
    /// Trades with `from <= timestamp < to`
    async fn trades_in_window(&self, from: Timestamp, to: Timestamp)
    -> StoreResult<Vec<TradeRecord>>;
}
