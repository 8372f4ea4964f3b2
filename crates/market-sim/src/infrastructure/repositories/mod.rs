mod in_memory_token;
mod in_memory_trade_ledger;

pub use in_memory_token::InMemoryTokenRepository;
pub use in_memory_trade_ledger::InMemoryTradeLedger;
