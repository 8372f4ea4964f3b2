mod delisting;
mod price_model;
mod token_factory;
mod trade_flow;

pub use delisting::should_delist;
pub use price_model::{ModelParams, PriceStep, evolve_price, player_impact};
pub use token_factory::TokenFactory;
pub use trade_flow::{PressureMap, aggregate_pressure};
