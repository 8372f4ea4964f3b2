use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use ticker_core::{Timestamp, TradeRecord};
use ticker_ports::{StoreResult, TradeLedger};

/// In-memory trade ledger
///
/// Stands in for the order-entry subsystem's trade table.
pub struct InMemoryTradeLedger {
    trades: Arc<RwLock<Vec<TradeRecord>>>,
}

impl InMemoryTradeLedger {
    pub fn new() -> Self {
        InMemoryTradeLedger {
            trades: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append a trade
    pub fn record(&self, trade: TradeRecord) {
        self.trades.write().push(trade);
    }

    /// Drop trades older than `cutoff`, returning how many were removed
    pub fn prune_before(&self, cutoff: Timestamp) -> usize {
        let mut trades = self.trades.write();
        let before = trades.len();
        trades.retain(|t| t.timestamp >= cutoff);
        before - trades.len()
    }

    pub fn len(&self) -> usize {
        self.trades.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.read().is_empty()
    }
}

impl Default for InMemoryTradeLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemoryTradeLedger {
    fn clone(&self) -> Self {
        InMemoryTradeLedger {
            trades: Arc::clone(&self.trades),
        }
    }
}

#[async_trait]
impl TradeLedger for InMemoryTradeLedger {
    async fn trades_in_window(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> StoreResult<Vec<TradeRecord>> {
        Ok(self
            .trades
            .read()
            .iter()
            .filter(|t| t.timestamp >= from && t.timestamp < to)
            .cloned()
            .collect())
    }
}
