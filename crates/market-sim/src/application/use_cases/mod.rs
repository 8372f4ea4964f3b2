mod run_tick;

pub use run_tick::{FailureKind, RunTickUseCase, TickSummary, TokenFailure, TokenOutcome};
