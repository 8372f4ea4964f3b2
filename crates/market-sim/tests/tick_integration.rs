//! Integration tests: full ticks against the in-memory infrastructure
//!
//! Covers:
//! 1. Rug pull and 1:1 replacement
//! 2. Player pressure and the clamp bound
//! 3. Partial failures (store, replacement) and hard aborts (loads)
//! 4. Overlap protection (tick guard and stale writes)
//! 5. Seeded replay

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use market_sim::{
    BroadcastEventPublisher, ConfigError, FailureKind, InMemoryTokenRepository, InMemoryTradeLedger,
    MarketConfig, MarketSimulator, RunTickUseCase, TickError, TierParams,
};
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use ticker_clock::SimulationClock;
use ticker_core::{MarketEvent, Side, Timestamp, Token, TokenId, TradeRecord, VolatilityTier};
use ticker_ports::{Clock, StoreError, StoreResult, TokenRepository, TradeLedger};
use tokio::sync::Notify;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn token(symbol: &str, tier: VolatilityTier, price: f64, market_cap: f64) -> Token {
    Token::new(
        symbol,
        format!("{} Token", symbol),
        tier,
        price,
        market_cap * 0.1,
        market_cap,
        t0(),
    )
}

/// Config where every micro token is rugged on every tick and nothing else is
fn always_rug_micro() -> MarketConfig {
    let mut config = MarketConfig::default().with_seed(42);
    config.tiers.micro = TierParams::new(0.15, 1.0);
    config.tiers.mid = TierParams::new(0.08, 0.0);
    config
}

/// Config with no randomness in price: only drift and player impact move it
fn no_swing() -> MarketConfig {
    let mut config = MarketConfig::default().with_seed(1);
    for tier in VolatilityTier::ALL {
        *config.tiers.params_mut(tier) = TierParams::new(0.0, 0.0);
    }
    config
}

// ============================================================================
// TEST DOUBLES
// ============================================================================

/// Token store that can be told to fail specific operations
#[derive(Default)]
struct FlakyTokenRepository {
    inner: InMemoryTokenRepository,
    fail_save_for: Mutex<HashSet<TokenId>>,
    fail_insert: AtomicBool,
    fail_list: AtomicBool,
}

impl FlakyTokenRepository {
    fn fail_save(&self, id: TokenId) {
        self.fail_save_for.lock().unwrap().insert(id);
    }
}

#[async_trait]
impl TokenRepository for FlakyTokenRepository {
    async fn list_active(&self) -> StoreResult<Vec<Token>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.inner.list_active().await
    }

    async fn get(&self, id: TokenId) -> StoreResult<Option<Token>> {
        self.inner.get(id).await
    }

    async fn save(&self, token: Token) -> StoreResult<Token> {
        if self.fail_save_for.lock().unwrap().contains(&token.id) {
            return Err(StoreError::Unavailable("write timeout".to_string()));
        }
        self.inner.save(token).await
    }

    async fn insert(&self, token: Token) -> StoreResult<Token> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("insert rejected".to_string()));
        }
        self.inner.insert(token).await
    }
}

/// Store where another writer updates every token right after it is read
struct RacingTokenRepository {
    inner: InMemoryTokenRepository,
}

#[async_trait]
impl TokenRepository for RacingTokenRepository {
    async fn list_active(&self) -> StoreResult<Vec<Token>> {
        let snapshot = self.inner.list_active().await?;
        for token in &snapshot {
            self.inner.save(token.clone()).await?;
        }
        Ok(snapshot)
    }

    async fn get(&self, id: TokenId) -> StoreResult<Option<Token>> {
        self.inner.get(id).await
    }

    async fn save(&self, token: Token) -> StoreResult<Token> {
        self.inner.save(token).await
    }

    async fn insert(&self, token: Token) -> StoreResult<Token> {
        self.inner.insert(token).await
    }
}

struct FailingLedger;

#[async_trait]
impl TradeLedger for FailingLedger {
    async fn trades_in_window(&self, _: Timestamp, _: Timestamp) -> StoreResult<Vec<TradeRecord>> {
        Err(StoreError::Unavailable("ledger offline".to_string()))
    }
}

/// Ledger that blocks until released, to hold a tick open
struct GatedLedger {
    gate: Arc<Notify>,
}

#[async_trait]
impl TradeLedger for GatedLedger {
    async fn trades_in_window(&self, _: Timestamp, _: Timestamp) -> StoreResult<Vec<TradeRecord>> {
        self.gate.notified().await;
        Ok(Vec::new())
    }
}

fn use_case_with<R, L>(
    repo: Arc<R>,
    ledger: Arc<L>,
    config: MarketConfig,
) -> RunTickUseCase<SimulationClock, R, L, BroadcastEventPublisher>
where
    R: TokenRepository,
    L: TradeLedger,
{
    RunTickUseCase::new(
        Arc::new(SimulationClock::at(t0())),
        repo,
        ledger,
        Arc::new(BroadcastEventPublisher::new(64)),
        config,
    )
    .unwrap()
}

// ============================================================================
// RUG PULL AND REPLACEMENT
// ============================================================================

#[tokio::test]
async fn test_delisted_token_is_replaced_one_for_one() {
    let sim = MarketSimulator::with_clock(always_rug_micro(), Arc::new(SimulationClock::at(t0())))
        .unwrap();
    let doomed = token("RUGDOG11", VolatilityTier::Micro, 0.02, 50_000.0);
    sim.token_repo.add(doomed.clone());
    let mut events = sim.event_publisher.subscribe();

    sim.clock.advance(Duration::minutes(1));
    let summary = sim.tick().await.unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.rugged, vec!["RUGDOG11".to_string()]);
    assert_eq!(summary.replacements.len(), 1);
    assert!(!summary.is_partial());

    let original = sim.token_repo.get_sync(doomed.id).unwrap();
    assert!(!original.is_active);
    assert!(original.is_delisted);
    assert_eq!(original.current_price, 0.0);
    assert_eq!(original.price_history.latest().unwrap().price, 0.0);

    let active = sim.token_repo.list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    let replacement = &active[0];
    assert_ne!(replacement.id, doomed.id);
    assert!(replacement.is_active);
    assert!(replacement.current_price > 0.0);
    assert_eq!(replacement.volatility_tier, Some(VolatilityTier::Micro));
    assert_eq!(replacement.trend_momentum, 0.0);
    assert_eq!(replacement.price_history.len(), 1);
    assert_eq!(summary.replacements[0], replacement.symbol);

    match events.recv().await.unwrap() {
        MarketEvent::TokenDelisted(e) => {
            assert_eq!(e.token_id, doomed.id);
            assert_eq!(e.symbol, "RUGDOG11");
            assert_eq!(e.final_price, 0.0);
            assert_eq!(e.replacement_id, Some(replacement.id));
        }
        other => panic!("expected TokenDelisted, got {:?}", other),
    }
    match events.recv().await.unwrap() {
        MarketEvent::TokenSpawned(e) => {
            assert_eq!(e.token_id, replacement.id);
            assert_eq!(e.replaces, Some(doomed.id));
        }
        other => panic!("expected TokenSpawned, got {:?}", other),
    }
}

#[tokio::test]
async fn test_population_is_stable_across_rugs() {
    let sim = MarketSimulator::with_clock(always_rug_micro(), Arc::new(SimulationClock::at(t0())))
        .unwrap();
    sim.seed_genesis(3);
    let population = sim.token_repo.active_count();

    for _ in 0..5 {
        sim.clock.advance(Duration::minutes(1));
        let summary = sim.tick().await.unwrap();
        // micro tokens rug every tick, replacements are micro too
        assert_eq!(summary.rugged.len(), 3);
        assert_eq!(summary.replacements.len(), 3);
        assert_eq!(sim.token_repo.active_count(), population);
    }

    assert_eq!(sim.token_repo.len(), population + 15);
    assert_eq!(sim.event_publisher.published_count(), 30);
}

// ============================================================================
// PLAYER PRESSURE
// ============================================================================

#[tokio::test]
async fn test_pressure_is_clamped_and_absent_pressure_is_zero() {
    let sim = MarketSimulator::with_clock(no_swing(), Arc::new(SimulationClock::at(t0())))
        .unwrap();
    let pumped = token("TURROC17", VolatilityTier::Large, 1.0, 1_000_000.0);
    let quiet = token("SLEPAN30", VolatilityTier::Large, 1.0, 1_000_000.0);
    sim.token_repo.add(pumped.clone());
    sim.token_repo.add(quiet.clone());

    sim.clock.advance(Duration::minutes(1));
    let now = sim.clock.now();
    sim.trade_ledger.record(TradeRecord::new(
        pumped.id,
        Side::Buy,
        dec!(500000),
        dec!(500000),
        now - Duration::seconds(30),
    ));

    sim.tick().await.unwrap();

    // 500k on a 1M cap clamps to +5%, not +50%
    let pumped_after = sim.token_repo.get_sync(pumped.id).unwrap();
    approx::assert_relative_eq!(pumped_after.current_price, 1.045, epsilon = 1e-12);

    let quiet_after = sim.token_repo.get_sync(quiet.id).unwrap();
    approx::assert_relative_eq!(quiet_after.current_price, 0.995, epsilon = 1e-12);
}

#[tokio::test]
async fn test_trades_outside_window_are_ignored() {
    let sim = MarketSimulator::with_clock(no_swing(), Arc::new(SimulationClock::at(t0())))
        .unwrap();
    let t = token("GOLFAL44", VolatilityTier::BlueChip, 2.0, 1_000_000.0);
    sim.token_repo.add(t.clone());

    let now = sim.clock.now();
    // older than the 10 minute window
    sim.trade_ledger.record(TradeRecord::new(
        t.id,
        Side::Sell,
        dec!(10000),
        dec!(20000),
        now - Duration::minutes(11),
    ));

    sim.tick().await.unwrap();

    let after = sim.token_repo.get_sync(t.id).unwrap();
    approx::assert_relative_eq!(after.current_price, 1.99, epsilon = 1e-12);
}

// ============================================================================
// PARTIAL FAILURES AND ABORTS
// ============================================================================

#[tokio::test]
async fn test_store_failure_skips_only_that_token() {
    let repo = Arc::new(FlakyTokenRepository::default());
    let broken = token("ATOWAL70", VolatilityTier::Large, 5.0, 2_000_000.0);
    let fine_a = token("NEOCOM33", VolatilityTier::Large, 5.0, 2_000_000.0);
    let fine_b = token("HYPTIG12", VolatilityTier::BlueChip, 50.0, 9_000_000.0);
    for t in [&broken, &fine_a, &fine_b] {
        repo.inner.add(t.clone());
    }
    repo.fail_save(broken.id);

    let use_case = use_case_with(
        Arc::clone(&repo),
        Arc::new(InMemoryTradeLedger::new()),
        MarketConfig::default().with_seed(9),
    );
    let summary = use_case.execute().await.unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.advanced, 2);
    assert!(summary.is_partial());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].token_id, broken.id);
    assert_eq!(summary.failures[0].kind, FailureKind::Update);

    // the failed token keeps its previous state
    let stored = repo.inner.get_sync(broken.id).unwrap();
    assert_eq!(stored.version, 0);
    assert_eq!(stored.current_price, 5.0);
    assert_eq!(repo.inner.get_sync(fine_a.id).unwrap().version, 1);
    assert_eq!(repo.inner.get_sync(fine_b.id).unwrap().version, 1);
}

#[tokio::test]
async fn test_replacement_failure_keeps_delisting() {
    let repo = Arc::new(FlakyTokenRepository::default());
    let doomed = token("WILSHA90", VolatilityTier::Micro, 0.003, 30_000.0);
    repo.inner.add(doomed.clone());
    repo.fail_insert.store(true, Ordering::SeqCst);

    let use_case = use_case_with(
        Arc::clone(&repo),
        Arc::new(InMemoryTradeLedger::new()),
        always_rug_micro(),
    );
    let summary = use_case.execute().await.unwrap();

    assert_eq!(summary.rugged, vec!["WILSHA90".to_string()]);
    assert!(summary.replacements.is_empty());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].kind, FailureKind::ReplacementPersist);

    assert!(repo.inner.get_sync(doomed.id).unwrap().is_delisted);
    assert_eq!(repo.inner.active_count(), 0);

    // one delisting notification, no spawn event
    assert_eq!(summary.events.len(), 1);
    match &summary.events[0] {
        MarketEvent::TokenDelisted(e) => assert_eq!(e.replacement_id, None),
        other => panic!("expected TokenDelisted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_delisting_spawns_nothing() {
    let repo = Arc::new(FlakyTokenRepository::default());
    let doomed = token("FROKIT25", VolatilityTier::Micro, 0.003, 30_000.0);
    repo.inner.add(doomed.clone());
    repo.fail_save(doomed.id);

    let use_case = use_case_with(
        Arc::clone(&repo),
        Arc::new(InMemoryTradeLedger::new()),
        always_rug_micro(),
    );
    let summary = use_case.execute().await.unwrap();

    assert!(summary.rugged.is_empty());
    assert_eq!(summary.failures[0].kind, FailureKind::Delist);
    assert_eq!(repo.inner.len(), 1);
    assert!(repo.inner.get_sync(doomed.id).unwrap().is_tradable());
}

#[tokio::test]
async fn test_token_load_failure_aborts_tick() {
    let repo = Arc::new(FlakyTokenRepository::default());
    repo.inner.add(token("RAPPHO61", VolatilityTier::Mid, 1.0, 100_000.0));
    repo.fail_list.store(true, Ordering::SeqCst);

    let use_case = use_case_with(
        Arc::clone(&repo),
        Arc::new(InMemoryTradeLedger::new()),
        MarketConfig::default(),
    );
    let err = use_case.execute().await.unwrap_err();

    assert!(matches!(err, TickError::LoadTokens(StoreError::Unavailable(_))));
    assert!(repo.inner.all().iter().all(|t| t.version == 0));
}

#[tokio::test]
async fn test_trade_load_failure_aborts_tick() {
    let repo = Arc::new(InMemoryTokenRepository::new());
    repo.add(token("QUALLA48", VolatilityTier::Mid, 1.0, 100_000.0));

    let use_case = use_case_with(Arc::clone(&repo), Arc::new(FailingLedger), MarketConfig::default());
    let err = use_case.execute().await.unwrap_err();

    assert!(matches!(err, TickError::LoadTrades(_)));
    assert!(repo.all().iter().all(|t| t.version == 0));
}

// ============================================================================
// OVERLAP PROTECTION
// ============================================================================

#[tokio::test]
async fn test_overlapping_tick_is_rejected() {
    let gate = Arc::new(Notify::new());
    let repo = Arc::new(InMemoryTokenRepository::new());
    repo.add(token("ROYDRA77", VolatilityTier::Large, 3.0, 500_000.0));
    let use_case = use_case_with(
        Arc::clone(&repo),
        Arc::new(GatedLedger {
            gate: Arc::clone(&gate),
        }),
        MarketConfig::default().with_seed(4),
    );

    let first = use_case.execute();
    let second = async {
        let result = use_case.execute().await;
        gate.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(second.unwrap_err(), TickError::TickInProgress);
    let summary = first.unwrap();
    assert_eq!(summary.tick, 1);
    assert_eq!(summary.advanced, 1);
}

#[tokio::test]
async fn test_stale_write_from_concurrent_writer_is_rejected() {
    let repo = Arc::new(RacingTokenRepository {
        inner: InMemoryTokenRepository::new(),
    });
    let t = token("COSBAD05", VolatilityTier::Large, 3.0, 500_000.0);
    repo.inner.add(t.clone());

    let use_case = use_case_with(
        Arc::clone(&repo),
        Arc::new(InMemoryTradeLedger::new()),
        MarketConfig::default().with_seed(4),
    );
    let summary = use_case.execute().await.unwrap();

    assert_eq!(summary.advanced, 0);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].kind, FailureKind::Update);
    assert!(summary.failures[0].reason.contains("Stale write"));

    // the other writer's copy wins
    let stored = repo.inner.get_sync(t.id).unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.current_price, 3.0);
}

// ============================================================================
// REPLAY
// ============================================================================

async fn run_seeded(seed: u64, ticks: usize) -> HashMap<TokenId, (f64, f64, bool)> {
    let sim = MarketSimulator::with_clock(
        MarketConfig::default().with_seed(seed),
        Arc::new(SimulationClock::at(t0())),
    )
    .unwrap();
    sim.seed_genesis(4);

    for _ in 0..ticks {
        sim.clock.advance(Duration::minutes(1));
        sim.tick().await.unwrap();
    }

    sim.token_repo
        .all()
        .into_iter()
        .map(|t| (t.id, (t.current_price, t.trend_momentum, t.is_delisted)))
        .collect()
}

#[tokio::test]
async fn test_seeded_runs_replay_identically() {
    let a = run_seeded(2024, 50).await;
    let b = run_seeded(2024, 50).await;
    let c = run_seeded(2025, 50).await;

    assert_eq!(a, b);
    assert_ne!(a, c);
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[tokio::test]
async fn test_wall_clock_market_stamps_ticks_with_now() {
    let sim = MarketSimulator::new(MarketConfig::default().with_seed(8)).unwrap();
    sim.seed_genesis(1);

    let before = Utc::now();
    let summary = sim.tick().await.unwrap();
    let after = Utc::now();

    assert!(before <= summary.timestamp && summary.timestamp <= after);
    assert_eq!(summary.processed, 4);
}

#[test]
fn test_invalid_config_is_rejected_at_construction() {
    let mut config = MarketConfig::default();
    config.tiers.micro.max_swing = f64::NAN;

    let result = MarketSimulator::fixed_time(config);

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}
