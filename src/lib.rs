//! A dice command engine for tabletop RPG chat bots.
//!
//! Commands such as `2D6+1`, `3B6>=4`, `2R6[5]`, `3U6[6]+1`, `C(1+2*3)` or
//! `choice[a,b,c]` are parsed into a tree, rolled through a [DieSource] and
//! reported as a [CommandResult]:
//!
//! ```
//! use bcroll::{Config, DiceRoller, ScriptedDieSource};
//!
//! let mut roller = DiceRoller::new("5/6, 3/6".parse::<ScriptedDieSource>().unwrap());
//! let result = bcroll::execute("2D6", &Config::default(), &mut roller).unwrap();
//! assert_eq!(result.message(), "(2D6) ＞ 8[5,3] ＞ 8");
//! ```

pub mod command;
pub mod common;
pub mod config;
mod error;
pub mod eval;
pub mod parse;
pub mod roll;

pub use command::{CommandResult, Verdict};
pub use config::Config;
pub use error::Error;
pub use parse::{ast::Statement, ParseError};
pub use roll::{DefaultSource, DiceRoller, Die, DieSource, RollError, ScriptedDieSource};

/// Parses a command without running it.
pub fn parse(text: &str) -> Result<Statement, ParseError> {
    parse::parse(text)
}

/// Parses and runs a command.
pub fn execute<S: DieSource>(
    text: &str,
    config: &Config,
    roller: &mut DiceRoller<S>,
) -> Result<CommandResult, Error> {
    let statement = parse::parse(text)?;
    Ok(command::execute_statement(statement, config, roller)?)
}

/// Runs a command with real dice and the default [Config].
pub fn roll(text: &str) -> Result<CommandResult, Error> {
    let mut roller = DiceRoller::new(rand::thread_rng());
    execute(text, &Config::default(), &mut roller)
}
