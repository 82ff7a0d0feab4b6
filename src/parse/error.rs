use super::lexer::TokenKind;
use std::fmt;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("syntax error at column {column} ({literal:?}): {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-indexed, counted in characters.
    pub column: usize,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: TokenKind,
        expected: Vec<TokenKind>,
    },
    IllegalToken,
    ChainedComparison,
    RandomNumberInCalc,
    DiceInCalc,
    NoDiceRoll,
    MixedRollFamilies,
    MisplacedThreshold,
    InvalidModifier,
    EmptyChoiceItem,
    IntegerOverflow,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token: found {}, expected ", found)?;
                fmt_expected(expected, f)
            }
            Self::IllegalToken => f.write_str("illegal character"),
            Self::ChainedComparison => f.write_str("only one comparison is allowed per command"),
            Self::RandomNumberInCalc => f.write_str("random numbers cannot be used in C(...)"),
            Self::DiceInCalc => f.write_str("dice cannot be rolled in C(...)"),
            Self::NoDiceRoll => f.write_str("a command needs at least one dice roll"),
            Self::MixedRollFamilies => {
                f.write_str("B, R and U rolls cannot be mixed with each other or used inside expressions")
            }
            Self::MisplacedThreshold => {
                f.write_str("a reroll threshold may only follow the last roll of a list")
            }
            Self::InvalidModifier => {
                f.write_str("the modifier of a U roll must be constant arithmetic")
            }
            Self::EmptyChoiceItem => f.write_str("choice items cannot be empty"),
            Self::IntegerOverflow => f.write_str("integer literal is too large"),
        }
    }
}

fn fmt_expected(expected: &[TokenKind], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expected {
        [] => Ok(()),
        [a] => write!(f, "{}", a),
        [a, b] => write!(f, "{} or {}", a, b),
        [init @ .., last] => {
            for exp in init {
                write!(f, "{}, ", exp)?;
            }
            write!(f, "or {}", last)
        }
    }
}
