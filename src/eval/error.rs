use crate::common::Int;
use crate::roll::RollError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error(transparent)]
    Roll(#[from] RollError),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("[{min}...{max}] is not a valid range")]
    InvalidRange { min: Int, max: Int },
    #[error("integer overflow")]
    Overflow,
    #[error(transparent)]
    Threshold(#[from] ThresholdError),
}

/// A reroll threshold that is missing or too small. Commands report this to
/// the user instead of failing.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum ThresholdError {
    #[error("specify a reroll target, e.g. 2R6>=5 or 2R6[5]")]
    Missing,
    #[error("threshold must be 2 or more")]
    TooSmall(Int),
}
