//! Run Tick Use Case
//!
//! Advances every active token by one step:
//!
//! 1. load active tokens and the trailing trade window
//! 2. aggregate trades into an immutable pressure map
//! 3. per token (concurrently): roll the rug pull, then either delist and
//!    spawn a replacement, or evolve the price and record history
//! 4. publish delist/spawn events and return a summary
//!
//! A failure on one token never aborts the others. Only failing to load the
//! token set or the trade window aborts the tick.

use crate::config::MarketConfig;
use crate::domain::{
    ModelParams, PressureMap, PriceStep, TokenFactory, aggregate_pressure, evolve_price,
    should_delist,
};
use crate::error::{ConfigError, TickError};
use futures_util::{StreamExt, stream};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use ticker_core::{
    MarketEvent, Timestamp, Token, TokenDelistedEvent, TokenId, TokenSpawnedEvent, VolatilityTier,
};
use ticker_ports::{Clock, EventPublisher, StoreError, TokenRepository, TradeLedger};
use tokio::sync::Mutex;

/// What went wrong for a single token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The evolved token could not be written; it keeps its previous state
    Update,
    /// The delisting could not be written; no replacement was spawned
    Delist,
    /// The token was delisted but its replacement was not persisted
    ReplacementPersist,
}

/// A per-token failure reported in the tick summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenFailure {
    pub token_id: TokenId,
    pub symbol: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl TokenFailure {
    fn new(token_id: TokenId, symbol: String, kind: FailureKind, error: &StoreError) -> Self {
        Self {
            token_id,
            symbol,
            kind,
            reason: error.to_string(),
        }
    }
}

/// Result of processing one token
#[derive(Debug, Clone)]
pub enum TokenOutcome {
    Advanced {
        token: Token,
        step: PriceStep,
    },
    Delisted {
        token: Token,
        replacement: Result<Token, StoreError>,
    },
    Failed(TokenFailure),
}

/// Structured result of one tick
#[derive(Debug, Clone, Serialize)]
pub struct TickSummary {
    /// Sequence number of this tick within the use case's lifetime
    pub tick: u64,
    /// Tokens loaded and attempted
    pub processed: usize,
    /// Tokens whose new price was persisted
    pub advanced: usize,
    /// Symbols delisted this tick
    pub rugged: Vec<String>,
    /// Symbols spawned to replace them
    pub replacements: Vec<String>,
    pub failures: Vec<TokenFailure>,
    pub events: Vec<MarketEvent>,
    pub timestamp: Timestamp,
}

impl TickSummary {
    fn new(tick: u64, timestamp: Timestamp, processed: usize) -> Self {
        Self {
            tick,
            processed,
            advanced: 0,
            rugged: Vec::new(),
            replacements: Vec::new(),
            failures: Vec::new(),
            events: Vec::new(),
            timestamp,
        }
    }

    /// True when at least one token could not be fully processed
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    fn absorb(&mut self, outcome: TokenOutcome) {
        match outcome {
            TokenOutcome::Advanced { .. } => self.advanced += 1,
            TokenOutcome::Delisted { token, replacement } => {
                self.rugged.push(token.symbol.clone());
                let replacement_id = match &replacement {
                    Ok(spawned) => Some(spawned.id),
                    Err(e) => {
                        self.failures.push(TokenFailure::new(
                            token.id,
                            token.symbol.clone(),
                            FailureKind::ReplacementPersist,
                            e,
                        ));
                        None
                    }
                };

                self.events
                    .push(MarketEvent::TokenDelisted(TokenDelistedEvent {
                        token_id: token.id,
                        symbol: token.symbol.clone(),
                        final_price: token.current_price,
                        replacement_id,
                        timestamp: self.timestamp,
                    }));

                if let Ok(spawned) = replacement {
                    self.replacements.push(spawned.symbol.clone());
                    self.events.push(MarketEvent::TokenSpawned(TokenSpawnedEvent {
                        token_id: spawned.id,
                        symbol: spawned.symbol,
                        name: spawned.name,
                        initial_price: spawned.current_price,
                        replaces: Some(token.id),
                        timestamp: self.timestamp,
                    }));
                }
            }
            TokenOutcome::Failed(failure) => self.failures.push(failure),
        }
    }
}

struct TickState {
    rng: StdRng,
    ticks_run: u64,
}

/// Use case for advancing the market by one tick
///
/// Holds the single-writer tick guard: a second `execute` while one is in
/// flight is rejected with [`TickError::TickInProgress`]. The guard also owns
/// the master RNG, so a seeded configuration replays identically.
pub struct RunTickUseCase<C, R, L, E>
where
    C: Clock,
    R: TokenRepository,
    L: TradeLedger,
    E: EventPublisher,
{
    clock: Arc<C>,
    token_repo: Arc<R>,
    trade_ledger: Arc<L>,
    event_publisher: Arc<E>,
    config: MarketConfig,
    model: ModelParams,
    factory: TokenFactory,
    state: Mutex<TickState>,
}

impl<C, R, L, E> RunTickUseCase<C, R, L, E>
where
    C: Clock,
    R: TokenRepository,
    L: TradeLedger,
    E: EventPublisher,
{
    /// Build the use case, rejecting a configuration that fails validation
    pub fn new(
        clock: Arc<C>,
        token_repo: Arc<R>,
        trade_ledger: Arc<L>,
        event_publisher: Arc<E>,
        config: MarketConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            clock,
            token_repo,
            trade_ledger,
            event_publisher,
            model: config.model_params(),
            config,
            factory: TokenFactory::default(),
            state: Mutex::new(TickState { rng, ticks_run: 0 }),
        })
    }

    /// Replace the factory used for replacement tokens
    pub fn with_factory(mut self, factory: TokenFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub async fn execute(&self) -> Result<TickSummary, TickError> {
        let mut state = self
            .state
            .try_lock()
            .map_err(|_| TickError::TickInProgress)?;
        let now = self.clock.now();

        let mut tokens = self
            .token_repo
            .list_active()
            .await
            .map_err(TickError::LoadTokens)?;
        tokens.retain(Token::is_tradable);
        tokens.sort_by_key(|t| t.id);

        let window = self.config.trade_window();
        let trades = self
            .trade_ledger
            .trades_in_window(now - window, now)
            .await
            .map_err(TickError::LoadTrades)?;
        let pressures = aggregate_pressure(&trades, now, window);

        state.ticks_run += 1;
        let tick = state.ticks_run;
        info!(
            "Tick {} started: {} tokens, {} trades, {} tokens under pressure",
            tick,
            tokens.len(),
            trades.len(),
            pressures.len()
        );

        // Seeds are drawn in id order so results do not depend on scheduling
        let jobs: Vec<(Token, u64)> = tokens
            .into_iter()
            .map(|token| (token, state.rng.next_u64()))
            .collect();

        let pressures = &pressures;
        let outcomes: Vec<TokenOutcome> = stream::iter(jobs)
            .map(|(token, seed)| self.process_token(token, seed, pressures, now))
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut summary = TickSummary::new(tick, now, outcomes.len());
        for outcome in outcomes {
            summary.absorb(outcome);
        }

        for event in &summary.events {
            self.event_publisher.publish(event.clone()).await;
        }

        info!(
            "Tick {} finished: {} advanced, {} rugged, {} replaced, {} failed",
            tick,
            summary.advanced,
            summary.rugged.len(),
            summary.replacements.len(),
            summary.failures.len()
        );

        Ok(summary)
    }

    async fn process_token(
        &self,
        mut token: Token,
        seed: u64,
        pressures: &PressureMap,
        now: Timestamp,
    ) -> TokenOutcome {
        let mut rng = StdRng::seed_from_u64(seed);
        let tier = self.resolve_tier(&token);
        let tier_params = self.config.tiers.params(tier);

        if should_delist(tier_params, &mut rng) {
            return self.delist(token, &mut rng, now).await;
        }

        let pressure = pressures.pressure_for(token.id);
        let step = evolve_price(&token, tier_params, pressure, &self.model, &mut rng);
        debug!(
            "{} {:.8} -> {:.8} (change {:+.4}, impact {:+.4}, momentum {:+.4})",
            token.symbol,
            token.current_price,
            step.price,
            step.total_change,
            step.player_impact,
            step.momentum
        );
        step.apply(&mut token, now, self.config.history_capacity);

        let (token_id, symbol) = (token.id, token.symbol.clone());
        match self.token_repo.save(token).await {
            Ok(saved) => TokenOutcome::Advanced { token: saved, step },
            Err(e) => {
                warn!("Skipping {} ({}): update failed: {}", symbol, token_id, e);
                TokenOutcome::Failed(TokenFailure::new(token_id, symbol, FailureKind::Update, &e))
            }
        }
    }

    async fn delist(&self, mut token: Token, rng: &mut StdRng, now: Timestamp) -> TokenOutcome {
        let (token_id, symbol) = (token.id, token.symbol.clone());
        token.delist(now, self.config.history_capacity);

        let delisted = match self.token_repo.save(token).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Skipping {} ({}): delisting failed: {}", symbol, token_id, e);
                return TokenOutcome::Failed(TokenFailure::new(
                    token_id,
                    symbol,
                    FailureKind::Delist,
                    &e,
                ));
            }
        };
        info!("Token {} ({}) rug-pulled", symbol, token_id);

        let replacement = self.factory.spawn_replacement(rng, now);
        let replacement_symbol = replacement.symbol.clone();
        let replacement = self.token_repo.insert(replacement).await;
        match &replacement {
            Ok(spawned) => info!("Token {} ({}) replaces {}", spawned.symbol, spawned.id, symbol),
            Err(e) => error!(
                "Replacement {} for {} was not persisted, population shrinks by one: {}",
                replacement_symbol, symbol, e
            ),
        }

        TokenOutcome::Delisted {
            token: delisted,
            replacement,
        }
    }

    fn resolve_tier(&self, token: &Token) -> VolatilityTier {
        token.volatility_tier.unwrap_or_else(|| {
            warn!(
                "Token {} ({}) has no recognised tier, treating it as {}",
                token.symbol, token.id, self.config.fallback_tier
            );
            self.config.fallback_tier
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierParams;
    use crate::infrastructure::{
        BroadcastEventPublisher, InMemoryTokenRepository, InMemoryTradeLedger,
    };
    use chrono::Duration;
    use ticker_clock::SimulationClock;

    type TestUseCase = RunTickUseCase<
        SimulationClock,
        InMemoryTokenRepository,
        InMemoryTradeLedger,
        BroadcastEventPublisher,
    >;

    fn setup(config: MarketConfig) -> (TestUseCase, Arc<InMemoryTokenRepository>, SimulationClock) {
        let clock = SimulationClock::fixed();
        let repo = Arc::new(InMemoryTokenRepository::new());
        let use_case = RunTickUseCase::new(
            Arc::new(clock.clone()),
            Arc::clone(&repo),
            Arc::new(InMemoryTradeLedger::new()),
            Arc::new(BroadcastEventPublisher::new(64)),
            config,
        )
        .unwrap();
        (use_case, repo, clock)
    }

    fn token(symbol: &str, tier: Option<VolatilityTier>, now: Timestamp) -> Token {
        let mut token = Token::new(
            symbol,
            "Lucky Otter",
            VolatilityTier::Mid,
            1.0,
            10_000.0,
            100_000.0,
            now,
        );
        token.volatility_tier = tier;
        token
    }

    #[test]
    fn test_rejects_unvalidated_config() {
        let mut config = MarketConfig::default();
        for tier in VolatilityTier::ALL {
            config.tiers.params_mut(tier).max_swing = f64::INFINITY;
        }

        let result = RunTickUseCase::new(
            Arc::new(SimulationClock::fixed()),
            Arc::new(InMemoryTokenRepository::new()),
            Arc::new(InMemoryTradeLedger::new()),
            Arc::new(BroadcastEventPublisher::new(64)),
            config,
        );

        assert!(matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains("max_swing")));
    }

    #[tokio::test]
    async fn test_empty_market_tick() {
        let (use_case, _, _) = setup(MarketConfig::default().with_seed(1));

        let summary = use_case.execute().await.unwrap();

        assert_eq!(summary.tick, 1);
        assert_eq!(summary.processed, 0);
        assert!(summary.rugged.is_empty());
        assert!(!summary.is_partial());
    }

    #[tokio::test]
    async fn test_tick_counter_advances() {
        let (use_case, _, _) = setup(MarketConfig::default().with_seed(1));

        use_case.execute().await.unwrap();
        let summary = use_case.execute().await.unwrap();

        assert_eq!(summary.tick, 2);
    }

    #[tokio::test]
    async fn test_unknown_tier_uses_fallback() {
        let mut config = MarketConfig::default().with_seed(3);
        // Only the fallback tier can rug, and always does
        config.fallback_tier = VolatilityTier::Micro;
        config.tiers.micro = TierParams::new(0.15, 1.0);
        config.tiers.mid = TierParams::new(0.08, 0.0);
        let (use_case, repo, clock) = setup(config);

        let malformed = token("LUCOTT55", None, clock.now());
        let healthy = token("WILBAD21", Some(VolatilityTier::Mid), clock.now());
        repo.add(malformed.clone());
        repo.add(healthy.clone());

        let summary = use_case.execute().await.unwrap();

        assert_eq!(summary.rugged, vec![malformed.symbol.clone()]);
        let stored = repo.get_sync(malformed.id).unwrap();
        assert!(stored.is_delisted);
        assert_eq!(stored.volatility_tier, None);
        assert!(repo.get_sync(healthy.id).unwrap().is_tradable());
    }

    #[tokio::test]
    async fn test_history_sample_uses_clock_time() {
        let (use_case, repo, clock) = setup(MarketConfig::default().with_seed(5));
        let t = token("ROYWHA80", Some(VolatilityTier::BlueChip), clock.now());
        repo.add(t.clone());

        clock.advance(Duration::minutes(1));
        use_case.execute().await.unwrap();

        let stored = repo.get_sync(t.id).unwrap();
        assert_eq!(stored.price_history.len(), 2);
        assert_eq!(stored.price_history.latest().unwrap().timestamp, clock.now());
        assert_eq!(stored.updated_at, clock.now());
        assert_eq!(stored.version, 1);
    }
}
