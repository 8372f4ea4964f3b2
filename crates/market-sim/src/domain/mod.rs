pub mod services;

pub use services::{
    ModelParams, PressureMap, PriceStep, TokenFactory, aggregate_pressure, evolve_price,
    player_impact, should_delist,
};
