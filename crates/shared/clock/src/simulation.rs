use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use ticker_core::Timestamp;
use ticker_ports::Clock;

/// Manually driven clock
///
/// Time never moves on its own; it only changes through [`advance`] and
/// [`set_time`]. Clones share the same underlying time.
///
/// [`advance`]: SimulationClock::advance
/// [`set_time`]: SimulationClock::set_time
#[derive(Debug, Clone)]
pub struct SimulationClock {
    current: Arc<RwLock<Timestamp>>,
}

impl SimulationClock {
    /// Create a clock frozen at a specific time
    pub fn at(time: Timestamp) -> Self {
        SimulationClock {
            current: Arc::new(RwLock::new(time)),
        }
    }

    /// Create a clock frozen at the current wall-clock time
    pub fn fixed() -> Self {
        Self::at(Utc::now())
    }

    /// Advance time by a duration
    pub fn advance(&self, duration: Duration) {
        *self.current.write() += duration;
    }

    /// Set time to a specific value
    pub fn set_time(&self, time: Timestamp) {
        *self.current.write() = time;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::fixed()
    }
}

impl Clock for SimulationClock {
    fn now(&self) -> Timestamp {
        *self.current.read()
    }

    fn name(&self) -> &str {
        "SimulationClock"
    }
}
