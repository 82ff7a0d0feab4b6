mod die;
mod error;
pub mod reroll;
mod roller;

type RResult<T> = Result<T, RollError>;

pub(crate) use die::{join_values, sum};
pub use die::Die;
pub use error::RollError;
pub use roller::{DefaultSource, DiceRoller, DieSource, ParseScriptError, ScriptedDieSource};
