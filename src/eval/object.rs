use super::{EResult, EvalError};
use crate::common::*;
use crate::roll::{join_values, sum, Die};

#[enum_dispatch::enum_dispatch]
pub trait Inspect {
    /// Text shown for this value in a command trace.
    fn inspect(&self) -> String;

    fn type_name(&self) -> &'static str;
}

/// A fully evaluated value.
#[enum_dispatch::enum_dispatch(Inspect)]
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Integer(Integer),
    Boolean(Boolean),
    Str(Str),
    Array(Array),
    BRollResult(BRollResult),
    RRollResult(RRollResult),
    URollResult(URollResult),
}

impl Object {
    pub fn as_int(&self) -> EResult<Int> {
        match self {
            Self::Integer(x) => Ok(x.0),
            other => Err(EvalError::TypeMismatch {
                expected: "Integer",
                found: other.type_name(),
            }),
        }
    }

    pub fn as_bool(&self) -> EResult<bool> {
        match self {
            Self::Boolean(x) => Ok(x.0),
            other => Err(EvalError::TypeMismatch {
                expected: "Boolean",
                found: other.type_name(),
            }),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Integer(pub Int);

impl Inspect for Integer {
    fn inspect(&self) -> String {
        self.0.to_string()
    }

    fn type_name(&self) -> &'static str {
        "Integer"
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Boolean(pub bool);

impl Inspect for Boolean {
    fn inspect(&self) -> String {
        self.0.to_string()
    }

    fn type_name(&self) -> &'static str {
        "Boolean"
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Str(pub String);

impl Inspect for Str {
    fn inspect(&self) -> String {
        self.0.clone()
    }

    fn type_name(&self) -> &'static str {
        "String"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Array(pub Vec<Object>);

impl Array {
    /// 1-indexed, the way a die picks an item.
    pub fn nth(&self, n: Int) -> Option<&Object> {
        let index = usize::try_from(n).ok()?.checked_sub(1)?;
        self.0.get(index)
    }
}

impl Inspect for Array {
    fn inspect(&self) -> String {
        let items: Vec<_> = self.0.iter().map(Inspect::inspect).collect();
        format!("[{}]", items.join(","))
    }

    fn type_name(&self) -> &'static str {
        "Array"
    }
}

fn count_successes(values: impl IntoIterator<Item = Int>, op: CompareOp, target: Int) -> usize {
    values.into_iter().filter(|&x| op.compare(x, target)).count()
}

/// Every die of a `B` list, reported individually.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BRollResult {
    pub dice: Vec<Die>,
}

impl BRollResult {
    pub fn sum(&self) -> Int {
        sum(&self.dice)
    }

    pub fn successes(&self, op: CompareOp, target: Int) -> usize {
        count_successes(self.dice.iter().map(Die::value), op, target)
    }
}

impl Inspect for BRollResult {
    fn inspect(&self) -> String {
        join_values(&self.dice)
    }

    fn type_name(&self) -> &'static str {
        "BRollResult"
    }
}

/// The waves of a count reroll, first wave first.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RRollResult {
    pub waves: Vec<Vec<Die>>,
}

impl RRollResult {
    pub fn dice(&self) -> impl Iterator<Item = &Die> + '_ {
        self.waves.iter().flatten()
    }

    pub fn successes(&self, op: CompareOp, target: Int) -> usize {
        count_successes(self.dice().map(Die::value), op, target)
    }
}

impl Inspect for RRollResult {
    fn inspect(&self) -> String {
        self.waves
            .iter()
            .map(|wave| join_values(wave))
            .collect::<Vec<_>>()
            .join(" + ")
    }

    fn type_name(&self) -> &'static str {
        "RRollResult"
    }
}

/// One compounding chain per die, plus the constant added to each of them.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct URollResult {
    pub chains: Vec<NonEmpty<Die>>,
    pub modifier: Int,
}

impl URollResult {
    pub fn chain_sums(&self) -> impl Iterator<Item = Int> + '_ {
        self.chains.iter().map(|chain| sum(chain))
    }

    /// Highest chain, modifier included.
    pub fn max(&self) -> EResult<Int> {
        self.chain_sums()
            .max()
            .unwrap_or(0)
            .checked_add(self.modifier)
            .ok_or(EvalError::Overflow)
    }

    /// All chains added up, then the modifier once.
    pub fn total(&self) -> EResult<Int> {
        self.chain_sums()
            .try_fold(self.modifier, Int::checked_add)
            .ok_or(EvalError::Overflow)
    }

    pub fn successes(&self, op: CompareOp, target: Int) -> EResult<usize> {
        let values = self
            .chain_sums()
            .map(|x| x.checked_add(self.modifier).ok_or(EvalError::Overflow))
            .collect::<EResult<Vec<_>>>()?;
        Ok(count_successes(values, op, target))
    }
}

impl Inspect for URollResult {
    fn inspect(&self) -> String {
        let chains: Vec<_> = self
            .chains
            .iter()
            .map(|chain| match chain.as_slice() {
                [die] => die.value().to_string(),
                dice => format!("{}[{}]", sum(dice), join_values(dice)),
            })
            .collect();
        let mut s = chains.join(",");
        if self.modifier != 0 {
            s.push_str(&format!("{:+}", self.modifier));
        }
        s
    }

    fn type_name(&self) -> &'static str {
        "URollResult"
    }
}
