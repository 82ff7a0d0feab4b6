use crate::roll::Die;

/// State of one command execution: every die rolled so far, in the order
/// the evaluator visited them.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Environment {
    rolled_dice: Vec<Die>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, dice: impl IntoIterator<Item = Die>) {
        self.rolled_dice.extend(dice);
    }

    pub fn rolled_dice(&self) -> &[Die] {
        &self.rolled_dice
    }

    pub fn into_rolled_dice(self) -> Vec<Die> {
        self.rolled_dice
    }
}
