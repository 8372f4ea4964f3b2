use chrono::Duration;
use market_sim::{MarketConfig, MarketSimulator};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use ticker_clock::SimulationClock;
use ticker_core::{Side, TradeRecord};
use ticker_ports::{Clock, TokenRepository};

fn print_help() {
    eprintln!(
        r#"Market Simulator - synthetic token market tick engine

USAGE:
    market-sim [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --tokens <N>        Genesis tokens per tier (default: 5)
    --ticks <N>         Number of ticks to run (default: 60)
    --seed <N>          Seed for reproducible runs (overrides config)
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter

EXAMPLES:
    # Run an hour of one-minute ticks with defaults
    market-sim

    # Reproducible run from a config file
    market-sim --config market.json --seed 42 --ticks 1440
"#
    );
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> T {
    match value.map(|v| v.parse::<T>()) {
        Some(Ok(parsed)) => parsed,
        _ => {
            eprintln!("Error: {} requires a numeric argument", flag);
            std::process::exit(1);
        }
    }
}

/// Simulated player activity between ticks
fn synthesize_trades<R: Rng>(
    sim: &MarketSimulator<SimulationClock>,
    tokens: &[ticker_core::Token],
    rng: &mut R,
) -> usize {
    if tokens.is_empty() {
        return 0;
    }

    let now = sim.clock.now();
    let count = rng.gen_range(0..=tokens.len() / 2);
    for _ in 0..count {
        let Some(token) = tokens.choose(rng) else {
            break;
        };
        let side = if rng.gen_bool(0.55) { Side::Buy } else { Side::Sell };
        let notional = token.market_cap * rng.gen_range(0.0..0.02);
        let (Some(total_amount), Some(quantity)) = (
            Decimal::from_f64(notional),
            Decimal::from_f64(notional / token.current_price),
        ) else {
            continue;
        };

        sim.trade_ledger.record(TradeRecord::new(
            token.id,
            side,
            quantity.round_dp(8),
            total_amount.round_dp(2),
            now - Duration::seconds(rng.gen_range(1..60)),
        ));
    }
    count
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("market_sim=info"))
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut per_tier: usize = 5;
    let mut ticks: u64 = 60;
    let mut seed: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            "--tokens" => {
                i += 1;
                per_tier = parse_value("--tokens", args.get(i));
            }
            "--ticks" => {
                i += 1;
                ticks = parse_value("--ticks", args.get(i));
            }
            "--seed" => {
                i += 1;
                seed = Some(parse_value("--seed", args.get(i)));
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => {
            log::info!("Loading configuration from: {}", path);
            MarketConfig::from_file(&path)?
        }
        None => {
            log::info!("Using default configuration");
            MarketConfig::default()
        }
    };
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };

    let sim = MarketSimulator::fixed_time(config)?;
    sim.seed_genesis(per_tier);

    let mut last_summary = None;
    for _ in 0..ticks {
        sim.clock.advance(Duration::minutes(1));

        let active = sim.token_repo.list_active().await?;
        let trades = synthesize_trades(&sim, &active, &mut rng);
        log::debug!("Synthesized {} trades", trades);

        let summary = sim.tick().await?;
        if !summary.rugged.is_empty() {
            log::info!(
                "Tick {}: rugged {:?}, replaced by {:?}",
                summary.tick,
                summary.rugged,
                summary.replacements
            );
        }
        for failure in &summary.failures {
            log::warn!(
                "Tick {}: {} {:?}: {}",
                summary.tick,
                failure.symbol,
                failure.kind,
                failure.reason
            );
        }

        let cutoff = sim.clock.now() - sim.config.trade_window();
        sim.trade_ledger.prune_before(cutoff);
        last_summary = Some(summary);
    }

    log::info!(
        "Finished {} ticks: {} active tokens, {} total ever listed",
        ticks,
        sim.token_repo.active_count(),
        sim.token_repo.len()
    );

    if let Some(summary) = last_summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
