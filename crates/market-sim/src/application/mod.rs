pub mod use_cases;

pub use use_cases::{FailureKind, RunTickUseCase, TickSummary, TokenFailure, TokenOutcome};
