//! Price evolution model
//!
//! One tick of a token's price is the sum of four terms:
//!
//! ```text
//! total_change = base_volatility + drift + player_impact + momentum_effect
//! new_price    = max(price_floor, price * (1 + total_change))
//! ```
//!
//! `base_volatility` is drawn uniformly from `[-max_swing, +max_swing]`,
//! `player_impact` is net trade pressure relative to market cap (clamped) and
//! `momentum_effect` is a decaying, bounded memory of recent draws.

use crate::config::TierParams;
use rand::Rng;
use ticker_core::{PriceSample, Timestamp, Token};

const VOLUME_TURNOVER_MIN: f64 = 0.05;
const VOLUME_TURNOVER_MAX: f64 = 0.15;

/// Global constants of the price model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    pub drift: f64,
    pub momentum_decay: f64,
    pub momentum_weight: f64,
    pub pressure_clamp: f64,
    pub price_floor: f64,
    pub volume_sensitivity: f64,
}

/// The next state of a token together with the terms that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStep {
    pub base_volatility: f64,
    pub drift: f64,
    pub player_impact: f64,
    pub momentum: f64,
    pub momentum_effect: f64,
    pub total_change: f64,
    pub price: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
}

impl PriceStep {
    /// Write the step into the token and record one history sample
    pub fn apply(&self, token: &mut Token, at: Timestamp, history_capacity: usize) {
        token.current_price = self.price;
        token.volume_24h = self.volume_24h;
        token.market_cap = self.market_cap;
        token.trend_momentum = self.momentum;
        token
            .price_history
            .record(PriceSample::new(at, self.price), history_capacity);
        token.updated_at = at;
    }
}

/// Trade pressure relative to market cap, bounded to `±clamp_bound`
///
/// Exactly zero when there is no pressure or no meaningful market cap.
pub fn player_impact(pressure: f64, market_cap: f64, clamp_bound: f64) -> f64 {
    if pressure == 0.0 || !pressure.is_finite() || !(market_cap > 0.0) {
        return 0.0;
    }
    (pressure / market_cap).clamp(-clamp_bound, clamp_bound)
}

/// Compute a token's next price, volume, market cap and momentum
///
/// Pure apart from the injected RNG: the same token, parameters, pressure and
/// RNG state always produce the same step.
pub fn evolve_price<R: Rng + ?Sized>(
    token: &Token,
    tier: TierParams,
    pressure: f64,
    params: &ModelParams,
    rng: &mut R,
) -> PriceStep {
    let max_swing = tier.max_swing;
    let base_volatility = if max_swing > 0.0 {
        rng.gen_range(-max_swing..=max_swing)
    } else {
        0.0
    };

    let impact = player_impact(pressure, token.market_cap, params.pressure_clamp);

    let previous_momentum = if token.trend_momentum.is_finite() {
        token.trend_momentum
    } else {
        0.0
    };
    let momentum =
        (previous_momentum * params.momentum_decay + base_volatility).clamp(-1.0, 1.0);
    let momentum_effect = momentum * params.momentum_weight * max_swing;

    let total_change = base_volatility + params.drift + impact + momentum_effect;
    let price = (token.current_price * (1.0 + total_change)).max(params.price_floor);

    let market_cap = if token.current_price > 0.0 {
        token.market_cap.max(0.0) * price / token.current_price
    } else {
        token.market_cap.max(0.0)
    };
    let turnover = rng.gen_range(VOLUME_TURNOVER_MIN..VOLUME_TURNOVER_MAX);
    let volume_24h = market_cap * turnover * (1.0 + total_change.abs() * params.volume_sensitivity);

    PriceStep {
        base_volatility,
        drift: params.drift,
        player_impact: impact,
        momentum,
        momentum_effect,
        total_change,
        price,
        volume_24h,
        market_cap,
    }
}
