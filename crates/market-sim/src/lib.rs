//! Market Simulator
//!
//! Advances the prices of the game's synthetic tokens once per tick.
//!
//! # Architecture
//!
//! - **Domain**: pure services (trade flow, price model, delisting, token factory)
//! - **Application**: the tick use case that sequences them over the ports
//! - **Infrastructure**: in-memory store and ledger, broadcast event publisher
//!
//! # Example
//!
//! ```ignore
//! use market_sim::{MarketConfig, MarketSimulator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sim = MarketSimulator::new(MarketConfig::default()).unwrap();
//!     sim.seed_genesis(12);
//!     let summary = sim.tick().await.unwrap();
//!     println!("{} rugged", summary.rugged.len());
//! }
//! ```

// Application layer
pub mod application;

// Domain layer
pub mod domain;

// Infrastructure layer
pub mod infrastructure;

// Cross-cutting concerns
pub mod config;
pub mod error;

// Re-export main types for convenience
pub use application::{FailureKind, RunTickUseCase, TickSummary, TokenFailure, TokenOutcome};
pub use config::{MarketConfig, TierParams, TierTable};
pub use domain::{ModelParams, PressureMap, PriceStep, TokenFactory};
pub use error::{ConfigError, TickError};
pub use infrastructure::{BroadcastEventPublisher, InMemoryTokenRepository, InMemoryTradeLedger};

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use ticker_clock::{SimulationClock, SystemClock};
use ticker_core::{Token, VolatilityTier};
use ticker_ports::Clock;

/// Offset applied to the configured seed for genesis, so the initial
/// population does not share the tick engine's random stream
const GENESIS_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

type InMemoryTickUseCase<C> =
    RunTickUseCase<C, InMemoryTokenRepository, InMemoryTradeLedger, BroadcastEventPublisher>;

/// A self-contained market wired to in-memory infrastructure
pub struct MarketSimulator<C: Clock + 'static> {
    pub config: MarketConfig,
    pub clock: Arc<C>,
    pub token_repo: Arc<InMemoryTokenRepository>,
    pub trade_ledger: Arc<InMemoryTradeLedger>,
    pub event_publisher: Arc<BroadcastEventPublisher>,
    run_tick: InMemoryTickUseCase<C>,
}

impl<C: Clock + 'static> MarketSimulator<C> {
    /// Create a new simulator with the given clock
    pub fn with_clock(config: MarketConfig, clock: Arc<C>) -> Result<Self, ConfigError> {
        let token_repo = Arc::new(InMemoryTokenRepository::new());
        let trade_ledger = Arc::new(InMemoryTradeLedger::new());
        let event_publisher = Arc::new(BroadcastEventPublisher::default());
        let run_tick = RunTickUseCase::new(
            Arc::clone(&clock),
            Arc::clone(&token_repo),
            Arc::clone(&trade_ledger),
            Arc::clone(&event_publisher),
            config.clone(),
        )?;

        Ok(MarketSimulator {
            config,
            clock,
            token_repo,
            trade_ledger,
            event_publisher,
            run_tick,
        })
    }

    /// Populate the store with `per_tier` genesis tokens of every tier
    pub fn seed_genesis(&self, per_tier: usize) -> Vec<Token> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(GENESIS_SEED_OFFSET)),
            None => StdRng::from_entropy(),
        };
        let factory = TokenFactory::default();
        let now = self.clock.now();

        let tokens: Vec<Token> = VolatilityTier::ALL
            .iter()
            .flat_map(|&tier| std::iter::repeat(tier).take(per_tier))
            .map(|tier| factory.genesis(tier, &mut rng, now))
            .collect();

        for token in &tokens {
            self.token_repo.add(token.clone());
        }
        log::info!("Seeded {} genesis tokens", tokens.len());
        tokens
    }

    /// Advance the market by one tick
    pub async fn tick(&self) -> Result<TickSummary, TickError> {
        self.run_tick.execute().await
    }
}

impl MarketSimulator<SystemClock> {
    /// Create a new simulator driven by wall-clock time
    pub fn new(config: MarketConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }
}

impl MarketSimulator<SimulationClock> {
    /// Create a new simulator with a manually advanced clock (for testing)
    pub fn fixed_time(config: MarketConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SimulationClock::fixed()))
    }
}
