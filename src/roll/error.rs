use crate::common::Int;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RollError {
    #[error("dice must have at least 1 side, got {0}")]
    InvalidSides(Int),
    #[error("at least 1 die must be rolled, got {0}")]
    InvalidCount(Int),
    #[error("no scripted dice left")]
    Exhausted,
    #[error("too many dice rolled (at most {max} allowed)")]
    TooManyRolls { max: usize },
    #[error("scripted die {value}/{found} cannot be used for a d{expected}")]
    UnexpectedSides { value: Int, found: Int, expected: Int },
}
