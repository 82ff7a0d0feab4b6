use crate::config::Config;
use crate::roll::Die;
use std::fmt;

/// Whether a command met the value it was compared against.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Verdict {
    Success,
    Failure,
    /// The command has no comparison.
    Unspecified,
}

impl Verdict {
    pub fn from_bool(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::Failure
        }
    }

    pub fn word(self) -> Option<&'static str> {
        match self {
            Self::Success => Some("Success"),
            Self::Failure => Some("Failure"),
            Self::Unspecified => None,
        }
    }
}

/// The outcome of one command.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CommandResult {
    game_id: String,
    fragments: Vec<String>,
    separator: String,
    rolled_dice: Vec<Die>,
    verdict: Verdict,
    secret: bool,
}

impl CommandResult {
    pub(crate) fn new(
        config: &Config,
        fragments: Vec<String>,
        rolled_dice: Vec<Die>,
        verdict: Verdict,
        secret: bool,
    ) -> Self {
        Self {
            game_id: config.game_id.clone(),
            fragments,
            separator: config.separator.clone(),
            rolled_dice,
            verdict,
            secret,
        }
    }

    /// The trace of the command, e.g. `(2D6) ＞ 8[5,3] ＞ 8`.
    pub fn message(&self) -> String {
        self.fragments.join(&self.separator)
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Every die rolled while executing the command, in order.
    pub fn rolled_dice(&self) -> &[Die] {
        &self.rolled_dice
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn is_success(&self) -> bool {
        self.verdict == Verdict::Success
    }

    pub fn is_failure(&self) -> bool {
        self.verdict == Verdict::Failure
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.game_id, self.message())
    }
}
