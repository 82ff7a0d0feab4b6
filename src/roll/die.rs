use crate::common::Int;
use std::fmt;

/// A single rolled die.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Die {
    value: Int,
    sides: Int,
}

impl Die {
    pub const fn new(value: Int, sides: Int) -> Self {
        Self { value, sides }
    }

    pub const fn value(&self) -> Int {
        self.value
    }

    pub const fn sides(&self) -> Int {
        self.sides
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.sides)
    }
}

/// Joins die values with `,`, the way rolled dice appear in a trace.
pub(crate) fn join_values(dice: &[Die]) -> String {
    dice.iter()
        .map(|d| d.value().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn sum(dice: &[Die]) -> Int {
    dice.iter().map(Die::value).fold(0, Int::saturating_add)
}
