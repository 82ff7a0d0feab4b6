//! Evaluation runs in three passes over an owned tree:
//!
//! 1. [Evaluator::eval_var_args] replaces random arguments of rolls and
//!    random numbers (`[1...3]D6`) with the integers they evaluate to.
//! 2. [Evaluator::determine_values] rolls every remaining `D` roll and random
//!    number, replacing each with its result.
//! 3. [Evaluator::eval] computes the value of the now constant tree.
//!
//! The `B`/`R`/`U` lists and `CHOICE` are rolled directly by their own
//! methods instead of going through pass 2.

mod environment;
mod error;
mod object;

pub use environment::Environment;
pub use error::{EvalError, ThresholdError};
pub use object::{
    Array, BRollResult, Boolean, Inspect, Integer, Object, RRollResult, Str, URollResult,
};

use crate::common::*;
use crate::parse::ast::*;
use crate::roll::reroll::{self, DiceGroup};
use crate::roll::{DefaultSource, DiceRoller, DieSource};
use log::trace;
use std::mem;

pub(crate) type EResult<T> = Result<T, EvalError>;

/// Smallest value accepted as a reroll threshold.
pub const MIN_THRESHOLD: Int = 2;

pub struct Evaluator<'r, S = DefaultSource> {
    roller: &'r mut DiceRoller<S>,
    env: Environment,
    max_rerolls: usize,
}

impl<'r, S: DieSource> Evaluator<'r, S> {
    pub fn new(roller: &'r mut DiceRoller<S>, max_rerolls: usize) -> Self {
        Self {
            roller,
            env: Environment::new(),
            max_rerolls,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn into_environment(self) -> Environment {
        self.env
    }

    /// Runs all three passes and returns the integer value of `node`.
    pub fn evaluate(&mut self, node: Node) -> EResult<Int> {
        let node = self.eval_var_args(node)?;
        let node = self.determine_values(node)?;
        self.eval(&node)?.as_int()
    }

    pub fn eval_var_args(&mut self, node: Node) -> EResult<Node> {
        let node = if node.is_primary() {
            self.resolve_primary_args(node)?
        } else {
            match node {
                Node::UnaryMinus(operand) => Node::unary_minus(self.eval_var_args(*operand)?),
                Node::Binary(Binary { op, lhs, rhs }) => {
                    let lhs = self.eval_var_args(*lhs)?;
                    let rhs = self.eval_var_args(*rhs)?;
                    Node::binary(op, lhs, rhs)
                }
                other => other,
            }
        };
        trace!("resolved arguments: {}", node);
        Ok(node)
    }

    // A primary's own arguments are evaluated, but the primary itself is not.
    fn resolve_primary_args(&mut self, node: Node) -> EResult<Node> {
        if !node.is_variable() {
            return Ok(node);
        }
        match node {
            Node::Roll(mut roll) => {
                self.resolve_roll_args(&mut roll)?;
                Ok(Node::Roll(roll))
            }
            Node::RandomNumber { mut min, mut max } => {
                self.resolve_arg(&mut min)?;
                self.resolve_arg(&mut max)?;
                Ok(Node::RandomNumber { min, max })
            }
            other => Ok(other),
        }
    }

    fn resolve_roll_args(&mut self, roll: &mut Roll) -> EResult<()> {
        self.resolve_arg(&mut roll.count)?;
        self.resolve_arg(&mut roll.sides)?;
        if let Some(threshold) = &mut roll.threshold {
            self.resolve_arg(threshold)?;
        }
        Ok(())
    }

    fn resolve_arg(&mut self, arg: &mut Box<Node>) -> EResult<()> {
        if arg.is_variable() {
            let node = mem::replace(&mut **arg, Node::Int(0));
            **arg = Node::Int(self.evaluate(node)?);
        }
        Ok(())
    }

    /// Resolves the random arguments of every roll in a list, left to right.
    pub fn resolve_rolls(&mut self, rolls: &mut NonEmpty<Roll>) -> EResult<()> {
        for roll in rolls.iter_mut() {
            self.resolve_roll_args(roll)?;
        }
        Ok(())
    }

    pub fn determine_values(&mut self, node: Node) -> EResult<Node> {
        match node {
            Node::Roll(roll) if roll.kind == RollKind::D => {
                let count = self.eval(&roll.count)?.as_int()?;
                let sides = self.eval(&roll.sides)?.as_int()?;
                let dice = self.roller.roll(count, sides)?;
                self.env.record(dice.iter().copied());
                trace!("{}D{} rolled {:?}", count, sides, dice);
                Ok(Node::SumRollResult(SumRollResult { dice }))
            }
            Node::RandomNumber { min, max } => {
                let min = self.eval(&min)?.as_int()?;
                let max = self.eval(&max)?.as_int()?;
                Ok(Node::Int(self.random_number(min, max)?))
            }
            Node::UnaryMinus(operand) => Ok(Node::unary_minus(self.determine_values(*operand)?)),
            Node::Binary(Binary { op, lhs, rhs }) => {
                let lhs = self.determine_values(*lhs)?;
                let rhs = self.determine_values(*rhs)?;
                Ok(Node::binary(op, lhs, rhs))
            }
            other => Ok(other),
        }
    }

    fn random_number(&mut self, min: Int, max: Int) -> EResult<Int> {
        if max < min {
            return Err(EvalError::InvalidRange { min, max });
        }
        let size = max
            .checked_sub(min)
            .and_then(|x| x.checked_add(1))
            .ok_or(EvalError::Overflow)?;
        let die = self.roller.roll_one(size)?;
        self.env.record([die]);
        min.checked_add(die.value() - 1).ok_or(EvalError::Overflow)
    }

    pub fn eval(&self, node: &Node) -> EResult<Object> {
        match node {
            Node::Int(x) => Ok(Integer(*x).into()),
            Node::SumRollResult(result) => Ok(Integer(result.sum()).into()),
            Node::UnaryMinus(operand) => {
                let x = self.eval(operand)?.as_int()?;
                x.checked_neg()
                    .map(|x| Integer(x).into())
                    .ok_or(EvalError::Overflow)
            }
            Node::Binary(binary) => self.eval_binary(binary),
            Node::Roll(_) => Err(EvalError::TypeMismatch {
                expected: "Integer",
                found: "unrolled dice",
            }),
            Node::RandomNumber { .. } => Err(EvalError::TypeMismatch {
                expected: "Integer",
                found: "unresolved random number",
            }),
        }
    }

    fn eval_binary(&self, binary: &Binary) -> EResult<Object> {
        let lhs = self.eval(&binary.lhs)?.as_int()?;
        let rhs = self.eval(&binary.rhs)?.as_int()?;

        let value = match binary.op {
            BinaryOp::Add => lhs.checked_add(rhs),
            BinaryOp::Subtract => lhs.checked_sub(rhs),
            BinaryOp::Multiply => lhs.checked_mul(rhs),
            BinaryOp::Divide(rounding) => {
                if rhs == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                rounding.divide(lhs, rhs)
            }
            BinaryOp::Compare(op) => return Ok(Boolean(op.compare(lhs, rhs)).into()),
        };
        value.map(|x| Integer(x).into()).ok_or(EvalError::Overflow)
    }

    /// The reroll threshold of an `R` or `U` command: the inline `[t]` if
    /// there is one, otherwise the value the result is compared against.
    pub fn reroll_threshold(&mut self, inline: Option<&Node>, inferred: Option<Int>) -> EResult<Int> {
        let threshold = match inline {
            Some(node) => self.evaluate(node.clone())?,
            None => inferred.ok_or(ThresholdError::Missing)?,
        };
        if threshold < MIN_THRESHOLD {
            return Err(ThresholdError::TooSmall(threshold).into());
        }
        Ok(threshold)
    }

    fn dice_groups(&self, rolls: &[Roll]) -> EResult<Vec<DiceGroup>> {
        rolls
            .iter()
            .map(|roll| {
                let count = self.eval(&roll.count)?.as_int()?;
                let sides = self.eval(&roll.sides)?.as_int()?;
                Ok(DiceGroup::new(count, sides))
            })
            .collect()
    }

    pub fn roll_b_list(&mut self, rolls: &[Roll]) -> EResult<BRollResult> {
        let mut dice = Vec::new();
        for group in self.dice_groups(rolls)? {
            dice.extend(self.roller.roll(group.count, group.sides)?);
        }
        self.env.record(dice.iter().copied());
        Ok(BRollResult { dice })
    }

    pub fn roll_r_list(&mut self, rolls: &[Roll], threshold: Int) -> EResult<RRollResult> {
        let groups = self.dice_groups(rolls)?;
        let waves = reroll::count_reroll(&mut *self.roller, &groups, threshold, self.max_rerolls)?;
        self.env.record(waves.iter().flatten().copied());
        Ok(RRollResult { waves })
    }

    pub fn roll_u_expr(
        &mut self,
        rolls: &[Roll],
        threshold: Int,
        modifier: Int,
    ) -> EResult<URollResult> {
        let groups = self.dice_groups(rolls)?;
        let chains = reroll::compound(&mut *self.roller, &groups, threshold, self.max_rerolls)?;
        self.env.record(chains.iter().flatten().copied());
        Ok(URollResult { chains, modifier })
    }

    /// Picks one of `items` with a die sized to the list.
    pub fn choose(&mut self, items: &[String]) -> EResult<Object> {
        let array = Array(items.iter().map(|s| Str(s.clone()).into()).collect());
        let sides = Int::try_from(items.len()).map_err(|_| EvalError::Overflow)?;
        let die = self.roller.roll_one(sides)?;
        self.env.record([die]);
        array
            .nth(die.value())
            .cloned()
            .ok_or(EvalError::InvalidRange { min: 1, max: sides })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{self, notation::infix_notation};
    use crate::roll::{Die, RollError, ScriptedDieSource};

    fn roller(script: &str) -> DiceRoller<ScriptedDieSource> {
        DiceRoller::new(script.parse().unwrap())
    }

    fn expr(s: &str) -> Node {
        match parse::parse(s).unwrap().command {
            Command::Calc(node) | Command::DRollExpr(node) | Command::DRollComp(node) => node,
            other => panic!("{} is not an expression: {:?}", s, other),
        }
    }

    fn calc(s: &str) -> EResult<Int> {
        let mut roller = roller("");
        Evaluator::new(&mut roller, 10).evaluate(expr(s))
    }

    fn values(dice: &[Die]) -> Vec<Int> {
        dice.iter().map(Die::value).collect()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(calc("C(1+2*3)"), Ok(7));
        assert_eq!(calc("C(-7/2)"), Ok(-3));
        assert_eq!(calc("C(7/2R)"), Ok(4));
        assert_eq!(calc("C(7/2U-1)"), Ok(3));
        assert_eq!(calc("C(1/0)"), Err(EvalError::DivisionByZero));
        assert_eq!(calc("C(3/(1-1)U)"), Err(EvalError::DivisionByZero));
        assert_eq!(calc("C(9223372036854775807+1)"), Err(EvalError::Overflow));
        assert_eq!(calc("C(-(-9223372036854775807-1))"), Err(EvalError::Overflow));
    }

    #[test]
    fn test_printed_value_is_preserved() {
        for s in [
            "C(1+(2-3))",
            "C(10-(2+3))",
            "C(1+(2+3)*4)",
            "C(2*(7/2))",
            "C(7/2U*3)",
            "C(-(1-5)/3R)",
            "C(100/(7/2U)R)",
            "C(-1*2+-3)",
        ] {
            let printed = format!("C({})", infix_notation(&expr(s), true));
            assert_eq!(calc(&printed), calc(s), "{} printed as {}", s, printed);
        }
    }

    #[test]
    fn test_passes() {
        let mut roller = roller("5/6,3/6");
        let mut ev = Evaluator::new(&mut roller, 10);

        let node = ev.eval_var_args(expr("2D6+1")).unwrap();
        assert_eq!(node, expr("2D6+1"));
        assert!(ev.environment().rolled_dice().is_empty());

        let node = ev.determine_values(node).unwrap();
        assert!(!node.is_variable());
        assert_eq!(node.to_string(), "8[5,3]+1");
        assert_eq!(ev.eval(&node), Ok(Integer(9).into()));
        assert_eq!(values(ev.environment().rolled_dice()), vec![5, 3]);
    }

    #[test]
    fn test_random_arguments() {
        let mut roller = roller("2/3,4/6,1/6");
        let mut ev = Evaluator::new(&mut roller, 10);

        let node = ev.eval_var_args(expr("[1...3]D6")).unwrap();
        assert_eq!(node.to_string(), "2D6");
        assert!(node.is_variable());

        let node = ev.determine_values(node).unwrap();
        assert_eq!(node.to_string(), "5[4,1]");
        assert_eq!(
            ev.into_environment().into_rolled_dice(),
            vec![Die::new(2, 3), Die::new(4, 6), Die::new(1, 6)]
        );
    }

    #[test]
    fn test_nested_roll() {
        let mut roller = roller("2/6,3/4,1/4");
        let mut ev = Evaluator::new(&mut roller, 10);
        assert_eq!(ev.evaluate(expr("1D6D4")), Ok(4));
        assert_eq!(values(ev.environment().rolled_dice()), vec![2, 3, 1]);
    }

    #[test]
    fn test_random_number() {
        let mut roller = roller("2/3");
        assert_eq!(Evaluator::new(&mut roller, 10).evaluate(expr("[3...5]")), Ok(4));

        let mut empty = DiceRoller::new(ScriptedDieSource::default());
        assert_eq!(
            Evaluator::new(&mut empty, 10).evaluate(expr("[3...1]D6")),
            Err(EvalError::InvalidRange { min: 3, max: 1 })
        );
    }

    #[test]
    fn test_roll_errors() {
        let mut roller = roller("");
        let mut ev = Evaluator::new(&mut roller, 10);
        assert_eq!(
            ev.evaluate(expr("0D6")),
            Err(EvalError::Roll(RollError::InvalidCount(0)))
        );
        assert_eq!(
            ev.evaluate(expr("1D6")),
            Err(EvalError::Roll(RollError::Exhausted))
        );
        assert_eq!(
            ev.eval(&expr("2D6")),
            Err(EvalError::TypeMismatch {
                expected: "Integer",
                found: "unrolled dice"
            })
        );
    }

    #[test]
    fn test_dice_limit() {
        let mut roller = roller("1/6,2/6,6/6,6/6,6/6").with_max_dice(4);
        let mut ev = Evaluator::new(&mut roller, 10);
        assert_eq!(ev.evaluate(expr("2D6")), Ok(3));
        assert_eq!(
            ev.roll_r_list(&[Roll::new(RollKind::R, Node::Int(2), Node::Int(6))], 6),
            Err(EvalError::Roll(RollError::TooManyRolls { max: 4 }))
        );
    }

    #[test]
    fn test_reroll_threshold() {
        let mut roller = roller("");
        let mut ev = Evaluator::new(&mut roller, 10);
        assert_eq!(ev.reroll_threshold(Some(&Node::Int(5)), Some(3)), Ok(5));
        assert_eq!(ev.reroll_threshold(None, Some(3)), Ok(3));
        assert_eq!(
            ev.reroll_threshold(None, None),
            Err(EvalError::Threshold(ThresholdError::Missing))
        );
        assert_eq!(
            ev.reroll_threshold(Some(&Node::Int(1)), None),
            Err(EvalError::Threshold(ThresholdError::TooSmall(1)))
        );
    }

    #[test]
    fn test_lists() {
        let mut roller = roller("2/6,5/6,9/10,3/6,1/6,2/6");
        let mut ev = Evaluator::new(&mut roller, 10);
        let rolls = [
            Roll::new(RollKind::B, Node::Int(2), Node::Int(6)),
            Roll::new(RollKind::B, Node::Int(1), Node::Int(10)),
        ];
        let b = ev.roll_b_list(&rolls).unwrap();
        assert_eq!(b.inspect(), "2,5,9");

        let r = ev
            .roll_r_list(&[Roll::new(RollKind::R, Node::Int(2), Node::Int(6))], 3)
            .unwrap();
        assert_eq!(r.inspect(), "3,1 + 2");
        assert_eq!(values(ev.environment().rolled_dice()), vec![2, 5, 9, 3, 1, 2]);
    }

    #[test]
    fn test_compound() {
        let mut roller = roller("6/6,6/6,1/6,4/6");
        let mut ev = Evaluator::new(&mut roller, 10);
        let u = ev
            .roll_u_expr(&[Roll::new(RollKind::U, Node::Int(2), Node::Int(6))], 6, 1)
            .unwrap();
        assert_eq!(u.inspect(), "13[6,6,1],4+1");
        assert_eq!(u.max(), Ok(14));
        assert_eq!(u.total(), Ok(18));
    }

    #[test]
    fn test_choose() {
        let mut roller = roller("2/4");
        let mut ev = Evaluator::new(&mut roller, 10);
        let items: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ev.choose(&items), Ok(Str("B".to_string()).into()));
        assert_eq!(ev.environment().rolled_dice(), &[Die::new(2, 4)]);
    }
}
