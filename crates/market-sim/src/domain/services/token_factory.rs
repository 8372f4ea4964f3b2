//! Token factory
//!
//! Synthesises new tokens, both at economy genesis and as 1:1 replacements
//! for delisted ones. Replacements always start as `micro` tokens with no
//! momentum and a single genesis price sample.

use rand::Rng;
use rand::seq::SliceRandom;
use std::ops::Range;
use ticker_core::{Timestamp, Token, TokenId, VolatilityTier};

const ADJECTIVES: &[&str] = &[
    "Moon", "Turbo", "Golden", "Cosmic", "Lucky", "Hyper", "Shiny", "Rapid", "Frosty", "Neon",
    "Quantum", "Royal", "Sleepy", "Wild", "Pixel", "Atomic",
];

const NOUNS: &[&str] = &[
    "Doge", "Rocket", "Pepe", "Llama", "Falcon", "Panda", "Whale", "Comet", "Kitten", "Shark",
    "Otter", "Dragon", "Badger", "Tiger", "Walrus", "Phoenix",
];

const SYMBOL_STEM_LEN: usize = 3;

/// Generates token identities and starting market figures
#[derive(Debug, Clone, PartialEq)]
pub struct TokenFactory {
    /// Share of new tokens that start in the penny range
    pub penny_share: f64,
    pub penny_price: Range<f64>,
    pub premium_price: Range<f64>,
    /// Simulated circulating supply, multiplied by price for market cap
    pub supply: Range<f64>,
    /// Fraction of market cap traded in a day
    pub turnover: Range<f64>,
    /// Numeric suffix appended to names and symbols
    pub disambiguator: Range<u32>,
}

impl Default for TokenFactory {
    fn default() -> Self {
        Self {
            penny_share: 0.8,
            penny_price: 0.0001..0.01,
            premium_price: 0.01..1.0,
            supply: 1_000_000.0..100_000_000.0,
            turnover: 0.05..0.30,
            disambiguator: 10..100,
        }
    }
}

impl TokenFactory {
    /// `(name, symbol)` from a random adjective/noun pair plus a number
    pub fn identity<R: Rng + ?Sized>(&self, rng: &mut R) -> (String, String) {
        let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("New");
        let noun = NOUNS.choose(rng).copied().unwrap_or("Token");
        let number = rng.gen_range(self.disambiguator.clone());

        let name = format!("{} {} {}", adjective, noun, number);
        let symbol = format!("{}{}{}", stem(adjective), stem(noun), number);
        (name, symbol)
    }

    /// Starting price, skewed towards the penny range
    pub fn starting_price<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if rng.gen_bool(self.penny_share.clamp(0.0, 1.0)) {
            rng.gen_range(self.penny_price.clone())
        } else {
            rng.gen_range(self.premium_price.clone())
        }
    }

    /// Replacement for a delisted token
    pub fn spawn_replacement<R: Rng + ?Sized>(&self, rng: &mut R, now: Timestamp) -> Token {
        self.build(VolatilityTier::Micro, 1.0, rng, now)
    }

    /// Token for the initial economy
    ///
    /// Safer tiers start at proportionally higher prices.
    pub fn genesis<R: Rng + ?Sized>(
        &self,
        tier: VolatilityTier,
        rng: &mut R,
        now: Timestamp,
    ) -> Token {
        let scale = match tier {
            VolatilityTier::Micro => 1.0,
            VolatilityTier::Mid => 10.0,
            VolatilityTier::Large => 100.0,
            VolatilityTier::BlueChip => 1_000.0,
        };
        self.build(tier, scale, rng, now)
    }

    fn build<R: Rng + ?Sized>(
        &self,
        tier: VolatilityTier,
        price_scale: f64,
        rng: &mut R,
        now: Timestamp,
    ) -> Token {
        let (name, symbol) = self.identity(rng);
        let price = self.starting_price(rng) * price_scale;
        let market_cap = price * rng.gen_range(self.supply.clone());
        let volume_24h = market_cap * rng.gen_range(self.turnover.clone());

        let mut id_bytes = [0u8; 16];
        rng.fill_bytes(&mut id_bytes);

        let mut token = Token::new(symbol, name, tier, price, volume_24h, market_cap, now);
        token.id = TokenId::from_random_bytes(id_bytes);
        token
    }
}

fn stem(word: &str) -> String {
    word.chars()
        .take(SYMBOL_STEM_LEN)
        .collect::<String>()
        .to_uppercase()
}
