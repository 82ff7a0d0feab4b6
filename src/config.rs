/// Settings shared by every command execution.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Upper bound on reroll waves and on the length of a compounding chain.
    pub max_rerolls: usize,
    /// Most dice a single command may roll, rerolls included.
    pub max_dice: usize,
    /// Prefixed to the rendered result.
    pub game_id: String,
    /// Placed between the fragments of a result message.
    pub separator: String,
}

impl Config {
    pub const DEFAULT_MAX_REROLLS: usize = 10_000;
    pub const DEFAULT_MAX_DICE: usize = 1000;

    pub fn with_max_rerolls(mut self, max_rerolls: usize) -> Self {
        self.max_rerolls = max_rerolls;
        self
    }

    pub fn with_max_dice(mut self, max_dice: usize) -> Self {
        self.max_dice = max_dice;
        self
    }

    pub fn with_game_id(mut self, game_id: impl Into<String>) -> Self {
        self.game_id = game_id.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_rerolls: Self::DEFAULT_MAX_REROLLS,
            max_dice: Self::DEFAULT_MAX_DICE,
            game_id: "DiceBot".to_string(),
            separator: " ＞ ".to_string(),
        }
    }
}
