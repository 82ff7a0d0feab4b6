use super::{die::Die, error::RollError, RResult};
use crate::common::Int;
use log::trace;
use rand::Rng;
use std::collections::VecDeque;
use std::str::FromStr;

pub type DefaultSource = rand::rngs::ThreadRng;

/// Supplies dice one at a time.
pub trait DieSource {
    fn next(&mut self, sides: Int) -> RResult<Die>;

    /// Whether the dice this source produces were decided ahead of time.
    fn can_specify_die(&self) -> bool {
        false
    }
}

impl<R: Rng> DieSource for R {
    fn next(&mut self, sides: Int) -> RResult<Die> {
        if sides < 1 {
            return Err(RollError::InvalidSides(sides));
        }
        Ok(Die::new(self.gen_range(1..=sides), sides))
    }
}

/// A [DieSource] that plays back a fixed sequence of dice.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ScriptedDieSource {
    queue: VecDeque<Die>,
}

impl ScriptedDieSource {
    pub fn new(dice: impl IntoIterator<Item = Die>) -> Self {
        Self {
            queue: dice.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> impl Iterator<Item = &Die> + '_ {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl DieSource for ScriptedDieSource {
    fn next(&mut self, sides: Int) -> RResult<Die> {
        let die = self.queue.pop_front().ok_or(RollError::Exhausted)?;
        if die.sides() != sides {
            return Err(RollError::UnexpectedSides {
                value: die.value(),
                found: die.sides(),
                expected: sides,
            });
        }
        Ok(die)
    }

    fn can_specify_die(&self) -> bool {
        true
    }
}

/// Parses a script such as `"5/6, 3/6"` (value/sides pairs).
impl FromStr for ScriptedDieSource {
    type Err = ParseScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut dice = Vec::new();
        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let (value, sides) = item
                .split_once('/')
                .ok_or_else(|| ParseScriptError::NoDelimiter(item.to_string()))?;
            let value: Int = value.trim().parse().map_err(ParseScriptError::InvalidValue)?;
            let sides: Int = sides.trim().parse().map_err(ParseScriptError::InvalidSides)?;
            if sides < 1 || value < 1 || value > sides {
                return Err(ParseScriptError::OutOfRange { value, sides });
            }
            dice.push(Die::new(value, sides));
        }
        Ok(Self::new(dice))
    }
}

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum ParseScriptError {
    #[error("cannot parse {0:?} as a die without '/' delimiter")]
    NoDelimiter(String),
    #[error("{0}")]
    InvalidValue(std::num::ParseIntError),
    #[error("{0}")]
    InvalidSides(std::num::ParseIntError),
    #[error("{value} is not a face of a d{sides}")]
    OutOfRange { value: Int, sides: Int },
}

/// Rolls groups of dice through a [DieSource].
///
/// A roller may be limited to a number of dice; once the limit would be
/// passed every roll fails with [RollError::TooManyRolls] before anything is
/// drawn from the source.
#[derive(Debug, Clone, Default)]
pub struct DiceRoller<S = DefaultSource> {
    source: S,
    max_dice: Option<usize>,
    rolled: usize,
}

impl<S: DieSource> DiceRoller<S> {
    /// A roller with no limit on the number of dice.
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_dice: None,
            rolled: 0,
        }
    }

    pub fn with_max_dice(mut self, max_dice: usize) -> Self {
        self.limit_dice(max_dice);
        self
    }

    /// Allows `max_dice` more dice from now on.
    pub fn limit_dice(&mut self, max_dice: usize) {
        self.max_dice = Some(max_dice);
        self.rolled = 0;
    }

    /// Dice rolled since the limit was last set.
    pub fn rolled(&self) -> usize {
        self.rolled
    }

    fn count_rolls(&mut self, num: Int) -> RResult<()> {
        let max = match self.max_dice {
            Some(max) => max,
            None => return Ok(()),
        };
        let total = usize::try_from(num)
            .ok()
            .and_then(|num| self.rolled.checked_add(num))
            .filter(|&total| total <= max)
            .ok_or(RollError::TooManyRolls { max })?;
        self.rolled = total;
        Ok(())
    }

    fn draw(&mut self, sides: Int) -> RResult<Die> {
        let die = self.source.next(sides)?;
        trace!("rolled {}", die);
        Ok(die)
    }

    pub fn roll_one(&mut self, sides: Int) -> RResult<Die> {
        if sides < 1 {
            return Err(RollError::InvalidSides(sides));
        }
        self.count_rolls(1)?;
        self.draw(sides)
    }

    /// Rolls `num` dice with `sides` faces each.
    pub fn roll(&mut self, num: Int, sides: Int) -> RResult<Vec<Die>> {
        if num < 1 {
            return Err(RollError::InvalidCount(num));
        }
        if sides < 1 {
            return Err(RollError::InvalidSides(sides));
        }
        self.count_rolls(num)?;
        (0..num).map(|_| self.draw(sides)).collect()
    }

    pub fn can_specify_die(&self) -> bool {
        self.source.can_specify_die()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}
