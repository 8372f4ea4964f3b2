mod history;
mod side;
mod tier;
mod token;
mod trade;

pub use history::{PriceHistory, PriceSample};
pub use side::Side;
pub use tier::{UnknownTierError, VolatilityTier};
pub use token::Token;
pub use trade::TradeRecord;
