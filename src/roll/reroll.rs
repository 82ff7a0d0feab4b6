//! Bounded reroll algorithms.
//!
//! Both engines stop after `max_rerolls` iterations no matter what the
//! [DieSource] returns, so a source that only ever rolls maximums still
//! terminates.

use super::{die::Die, roller::DiceRoller, roller::DieSource, RResult};
use crate::common::{Int, NonEmpty};
use log::debug;

/// `count` dice with `sides` faces each.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DiceGroup {
    pub count: Int,
    pub sides: Int,
}

impl DiceGroup {
    pub const fn new(count: Int, sides: Int) -> Self {
        Self { count, sides }
    }
}

/// Rolls every group, then keeps rolling one die for each die that came up
/// at or above `threshold`. Every iteration is returned as its own wave.
pub fn count_reroll<S: DieSource>(
    roller: &mut DiceRoller<S>,
    groups: &[DiceGroup],
    threshold: Int,
    max_rerolls: usize,
) -> RResult<Vec<Vec<Die>>> {
    let mut wave = Vec::new();
    for group in groups {
        wave.extend(roller.roll(group.count, group.sides)?);
    }

    let mut waves = vec![wave];
    loop {
        let pending = rerolls_needed(waves.last().map_or(&[][..], Vec::as_slice), threshold);
        if pending.is_empty() {
            break;
        }
        if waves.len() >= max_rerolls {
            debug!("count reroll stopped after {} waves", waves.len());
            break;
        }

        let mut next = Vec::new();
        for group in pending {
            next.extend(roller.roll(group.count, group.sides)?);
        }
        waves.push(next);
    }

    Ok(waves)
}

// Groups the dice that hit the threshold by side count, in order of first appearance.
fn rerolls_needed(wave: &[Die], threshold: Int) -> Vec<DiceGroup> {
    let mut groups: Vec<DiceGroup> = Vec::new();
    for die in wave.iter().filter(|d| d.value() >= threshold) {
        match groups.iter_mut().find(|g| g.sides == die.sides()) {
            Some(group) => group.count += 1,
            None => groups.push(DiceGroup::new(1, die.sides())),
        }
    }
    groups
}

/// Rolls every die of every group on its own, adding another roll to the
/// die's chain for as long as its latest roll is at or above `threshold`.
pub fn compound<S: DieSource>(
    roller: &mut DiceRoller<S>,
    groups: &[DiceGroup],
    threshold: Int,
    max_rerolls: usize,
) -> RResult<Vec<NonEmpty<Die>>> {
    let mut chains = Vec::new();
    for group in groups {
        if group.count < 1 {
            return Err(super::RollError::InvalidCount(group.count));
        }
        for _ in 0..group.count {
            let mut chain = NonEmpty::new(roller.roll_one(group.sides)?);
            while chain.last().value() >= threshold {
                if chain.len() >= max_rerolls {
                    debug!("compounding chain stopped after {} rolls", chain.len());
                    break;
                }
                chain.push(roller.roll_one(group.sides)?);
            }
            chains.push(chain);
        }
    }
    Ok(chains)
}
