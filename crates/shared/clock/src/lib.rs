//! Ticker Clock Infrastructure
//!
//! Provides time sources for the tick engine:
//!
//! - [`SystemClock`]: wall-clock time, for production schedulers
//! - [`SimulationClock`]: time that only moves when told to, for tests,
//!   replays and offline runs of many ticks
//!
//! ## Usage
//!
//! ```ignore
//! use ticker_clock::{Clock, SimulationClock};
//! use chrono::Duration;
//!
//! let clock = SimulationClock::fixed();
//! let before = clock.now();
//! clock.advance(Duration::minutes(1));
//! assert_eq!(clock.now() - before, Duration::minutes(1));
//! ```

mod simulation;
mod system;

pub use simulation::SimulationClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use ticker_ports::Clock;
