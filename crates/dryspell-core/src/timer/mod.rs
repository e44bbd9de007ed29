mod attempt;

pub use attempt::{AttemptEngine, AttemptState, PollOutcome};
