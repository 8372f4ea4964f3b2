//! Trade flow aggregation
//!
//! Reduces the player trades of a trailing window into per-token net
//! pressure. Amounts are summed exactly in `Decimal`.

use chrono::Duration;
use log::warn;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use ticker_core::{Timestamp, TokenId, TradeRecord};

/// Net signed trade value per token
///
/// Built once per tick before any price is touched and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PressureMap {
    pressures: HashMap<TokenId, Decimal>,
}

impl PressureMap {
    /// Net pressure for a token; tokens without trades have none
    pub fn net(&self, token_id: TokenId) -> Option<Decimal> {
        self.pressures.get(&token_id).copied()
    }

    /// Net pressure as the price model consumes it (0.0 when absent)
    pub fn pressure_for(&self, token_id: TokenId) -> f64 {
        self.net(token_id)
            .and_then(|net| net.to_f64())
            .unwrap_or(0.0)
    }

    pub fn contains(&self, token_id: TokenId) -> bool {
        self.pressures.contains_key(&token_id)
    }

    pub fn len(&self) -> usize {
        self.pressures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressures.is_empty()
    }
}

/// Aggregate trades inside `[now - window, now)` into net pressure
///
/// Buys add their total amount, sells subtract it. Trades outside the window
/// are ignored even if the ledger handed them over. A net that would leave
/// the `Decimal` range saturates at `Decimal::MAX` / `Decimal::MIN`.
pub fn aggregate_pressure(trades: &[TradeRecord], now: Timestamp, window: Duration) -> PressureMap {
    let start = now - window;
    let mut pressures: HashMap<TokenId, Decimal> = HashMap::new();

    for trade in trades
        .iter()
        .filter(|t| t.timestamp >= start && t.timestamp < now)
    {
        let amount = trade.signed_amount();
        let net = pressures.entry(trade.token_id).or_default();
        *net = net.checked_add(amount).unwrap_or_else(|| {
            warn!(
                "Net pressure for {} overflowed, saturating",
                trade.token_id
            );
            if amount.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        });
    }

    PressureMap { pressures }
}
