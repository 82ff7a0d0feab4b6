//! Runs a parsed [Statement] and turns it into a [CommandResult].

mod result;

pub use result::{CommandResult, Verdict};

use crate::common::*;
use crate::config::Config;
use crate::eval::{EResult, EvalError, Evaluator, Inspect, ThresholdError};
use crate::parse::ast::*;
use crate::parse::notation::{command_notation, infix_notation};
use crate::roll::{DiceRoller, DieSource};
use log::debug;

struct Outcome {
    fragments: Vec<String>,
    verdict: Verdict,
}

impl Outcome {
    fn new(fragments: Vec<String>, verdict: Verdict) -> Self {
        Self { fragments, verdict }
    }
}

type Target = Option<(CompareOp, Int)>;

/// Executes `statement`, rolling through `roller`.
///
/// `roller` is limited to `config.max_dice` dice for this execution. A
/// missing or too small reroll threshold is not an error: the result's
/// message explains the problem instead.
pub fn execute_statement<S: DieSource>(
    statement: Statement,
    config: &Config,
    roller: &mut DiceRoller<S>,
) -> Result<CommandResult, EvalError> {
    debug!(
        "executing {} (secret: {})",
        statement.command.name(),
        statement.secret
    );

    let notation = command_notation(&statement.command);
    let original = format!("({})", notation);
    roller.limit_dice(config.max_dice);
    let mut ev = Evaluator::new(roller, config.max_rerolls);

    let outcome = match statement.command {
        Command::Calc(expr) => calc(&mut ev, notation, expr),
        Command::DRollExpr(expr) => d_roll_expr(&mut ev, original, expr),
        Command::DRollComp(expr) => d_roll_comp(&mut ev, original, expr),
        Command::BRollList(list) => b_roll(&mut ev, original, list, None),
        Command::BRollComp(list, c) => b_roll(&mut ev, original, list, Some(c)),
        Command::RRollList(list) => r_roll(&mut ev, original, list, None),
        Command::RRollComp(list, c) => r_roll(&mut ev, original, list, Some(c)),
        Command::URollExpr(expr) => u_roll(&mut ev, original, expr, None),
        Command::URollComp(expr, c) => u_roll(&mut ev, original, expr, Some(c)),
        Command::Choice(items) => choice(&mut ev, original, &items),
    }?;

    let rolled_dice = ev.into_environment().into_rolled_dice();
    Ok(CommandResult::new(
        config,
        outcome.fragments,
        rolled_dice,
        outcome.verdict,
        statement.secret,
    ))
}

fn calc<S: DieSource>(ev: &mut Evaluator<'_, S>, notation: String, expr: Node) -> EResult<Outcome> {
    let value = ev.evaluate(expr)?;
    Ok(Outcome::new(
        vec![notation, value.to_string()],
        Verdict::Unspecified,
    ))
}

fn d_roll_expr<S: DieSource>(
    ev: &mut Evaluator<'_, S>,
    original: String,
    expr: Node,
) -> EResult<Outcome> {
    let node = ev.eval_var_args(expr)?;
    let node = ev.determine_values(node)?;
    let value = ev.eval(&node)?.as_int()?.to_string();

    let mut fragments = vec![original];
    let resolved = infix_notation(&node, true);
    if resolved != value {
        fragments.push(resolved);
    }
    fragments.push(value);
    Ok(Outcome::new(fragments, Verdict::Unspecified))
}

fn d_roll_comp<S: DieSource>(
    ev: &mut Evaluator<'_, S>,
    original: String,
    expr: Node,
) -> EResult<Outcome> {
    let rhs_variable = matches!(&expr, Node::Binary(b) if b.rhs.is_variable());
    let node = ev.eval_var_args(expr)?;
    let node = ev.determine_values(node)?;

    let (op, lhs, rhs) = match &node {
        Node::Binary(Binary {
            op: BinaryOp::Compare(op),
            lhs,
            rhs,
        }) => (*op, lhs, rhs),
        _ => {
            return Err(EvalError::TypeMismatch {
                expected: "comparison",
                found: "expression",
            })
        }
    };
    let lhs_value = ev.eval(lhs)?.as_int()?;
    let rhs_value = ev.eval(rhs)?.as_int()?;
    let verdict = Verdict::from_bool(ev.eval(&node)?.as_bool()?);

    // with dice on both sides both values are shown
    let (resolved, value) = if rhs_variable {
        (
            infix_notation(&node, true),
            format!("{}{}{}", lhs_value, op, rhs_value),
        )
    } else {
        (infix_notation(lhs, true), lhs_value.to_string())
    };

    let mut fragments = vec![original];
    if resolved != value {
        fragments.push(resolved);
    }
    fragments.push(value);
    fragments.extend(verdict.word().map(str::to_string));
    Ok(Outcome::new(fragments, verdict))
}

fn eval_target<S: DieSource>(
    ev: &mut Evaluator<'_, S>,
    comparison: Option<Comparison>,
) -> EResult<Target> {
    match comparison {
        Some(c) => Ok(Some((c.op, ev.evaluate(c.rhs)?))),
        None => Ok(None),
    }
}

fn successes(count: usize) -> String {
    format!("Successes: {}", count)
}

fn b_roll<S: DieSource>(
    ev: &mut Evaluator<'_, S>,
    original: String,
    mut list: BRollList,
    comparison: Option<Comparison>,
) -> EResult<Outcome> {
    ev.resolve_rolls(&mut list.rolls)?;
    let target = eval_target(ev, comparison)?;
    let result = ev.roll_b_list(&list.rolls)?;

    let mut fragments = vec![original, result.inspect()];
    let verdict = match target {
        Some((op, target)) => {
            let count = result.successes(op, target);
            fragments.push(successes(count));
            Verdict::from_bool(count > 0)
        }
        None => {
            fragments.push(result.sum().to_string());
            Verdict::Unspecified
        }
    };
    Ok(Outcome::new(fragments, verdict))
}

fn threshold_outcome(original: String, err: ThresholdError) -> Outcome {
    debug!("{}: {}", original, err);
    Outcome::new(vec![original, err.to_string()], Verdict::Unspecified)
}

fn r_roll<S: DieSource>(
    ev: &mut Evaluator<'_, S>,
    original: String,
    mut list: RRollList,
    comparison: Option<Comparison>,
) -> EResult<Outcome> {
    ev.resolve_rolls(&mut list.rolls)?;
    let target = eval_target(ev, comparison)?;
    let threshold = match ev.reroll_threshold(list.threshold.as_deref(), target.map(|(_, t)| t)) {
        Ok(threshold) => threshold,
        Err(EvalError::Threshold(err)) => return Ok(threshold_outcome(original, err)),
        Err(err) => return Err(err),
    };
    let result = ev.roll_r_list(&list.rolls, threshold)?;

    let mut fragments = vec![original, result.inspect()];
    let verdict = match target {
        Some((op, target)) => {
            let count = result.successes(op, target);
            fragments.push(successes(count));
            Verdict::from_bool(count > 0)
        }
        None => Verdict::Unspecified,
    };
    Ok(Outcome::new(fragments, verdict))
}

fn u_roll<S: DieSource>(
    ev: &mut Evaluator<'_, S>,
    original: String,
    mut expr: URollExpr,
    comparison: Option<Comparison>,
) -> EResult<Outcome> {
    ev.resolve_rolls(&mut expr.rolls)?;
    let modifier = match expr.modifier {
        Some(modifier) => ev.evaluate(*modifier)?,
        None => 0,
    };
    let target = eval_target(ev, comparison)?;
    let threshold = match ev.reroll_threshold(expr.threshold.as_deref(), target.map(|(_, t)| t)) {
        Ok(threshold) => threshold,
        Err(EvalError::Threshold(err)) => return Ok(threshold_outcome(original, err)),
        Err(err) => return Err(err),
    };
    let result = ev.roll_u_expr(&expr.rolls, threshold, modifier)?;

    let mut fragments = vec![original, result.inspect()];
    let verdict = match target {
        Some((op, target)) => {
            let count = result.successes(op, target)?;
            fragments.push(successes(count));
            Verdict::from_bool(count > 0)
        }
        None => {
            fragments.push(format!("{}/{} (max/total)", result.max()?, result.total()?));
            Verdict::Unspecified
        }
    };
    Ok(Outcome::new(fragments, verdict))
}

fn choice<S: DieSource>(
    ev: &mut Evaluator<'_, S>,
    original: String,
    items: &[String],
) -> EResult<Outcome> {
    let picked = ev.choose(items)?;
    Ok(Outcome::new(
        vec![original, picked.inspect()],
        Verdict::Unspecified,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::roll::{RollError, ScriptedDieSource};

    fn run(command: &str, script: &str) -> CommandResult {
        let mut roller = DiceRoller::new(script.parse::<ScriptedDieSource>().unwrap());
        let statement = parse(command).unwrap();
        let result = execute_statement(statement, &Config::default(), &mut roller).unwrap();
        assert!(roller.source().is_empty(), "{} left dice unused", command);
        result
    }

    fn check(command: &str, script: &str, message: &str, verdict: Verdict) {
        let result = run(command, script);
        assert_eq!(result.message(), message, "{}", command);
        assert_eq!(result.verdict(), verdict, "{}", command);
    }

    #[test]
    fn test_sum_rolls() {
        check("2D6+1", "5/6,3/6", "(2D6+1) ＞ 8[5,3]+1 ＞ 9", Verdict::Unspecified);
        check("[1...3]", "2/3", "([1...3]) ＞ 2", Verdict::Unspecified);
        check(
            "[1...3]D6",
            "3/3,1/6,2/6,6/6",
            "([1...3]D6) ＞ 9[1,2,6] ＞ 9",
            Verdict::Unspecified,
        );
    }

    #[test]
    fn test_sum_comparisons() {
        check("2D6>=7", "5/6,3/6", "(2D6>=7) ＞ 8[5,3] ＞ 8 ＞ Success", Verdict::Success);
        check("1D6+1<3", "4/6", "(1D6+1<3) ＞ 4[4]+1 ＞ 5 ＞ Failure", Verdict::Failure);
        check(
            "1D6>1D4",
            "3/6,3/4",
            "(1D6>1D4) ＞ 3[3]>3[3] ＞ 3>3 ＞ Failure",
            Verdict::Failure,
        );
    }

    #[test]
    fn test_b_rolls() {
        check("3B6", "2/6,5/6,4/6", "(3B6) ＞ 2,5,4 ＞ 11", Verdict::Unspecified);
        check(
            "2B6+1B10>=5",
            "2/6,5/6,10/10",
            "(2B6+1B10>=5) ＞ 2,5,10 ＞ Successes: 2",
            Verdict::Success,
        );
        check("2B6=6", "2/6,5/6", "(2B6=6) ＞ 2,5 ＞ Successes: 0", Verdict::Failure);
    }

    #[test]
    fn test_r_rolls() {
        check("2R6[3]", "3/6,1/6,2/6", "(2R6[3]) ＞ 3,1 + 2", Verdict::Unspecified);
        check(
            "3R6>=5",
            "5/6,6/6,1/6,6/6,2/6,3/6",
            "(3R6>=5) ＞ 5,6,1 + 6,2 + 3 ＞ Successes: 3",
            Verdict::Success,
        );
    }

    #[test]
    fn test_threshold_errors() {
        check(
            "2r6",
            "",
            "(2R6) ＞ specify a reroll target, e.g. 2R6>=5 or 2R6[5]",
            Verdict::Unspecified,
        );
        check(
            "2R6[1]>=3",
            "",
            "(2R6[1]>=3) ＞ threshold must be 2 or more",
            Verdict::Unspecified,
        );
        check(
            "2U6>=1",
            "",
            "(2U6>=1) ＞ threshold must be 2 or more",
            Verdict::Unspecified,
        );
        assert!(run("3U6", "").rolled_dice().is_empty());
    }

    #[test]
    fn test_u_rolls() {
        check(
            "3U6[6]",
            "3/6,6/6,4/6,2/6",
            "(3U6[6]) ＞ 3,10[6,4],2 ＞ 10/15 (max/total)",
            Verdict::Unspecified,
        );
        check(
            "2U6[6]+1>=10",
            "6/6,5/6,4/6",
            "(2U6[6]+1>=10) ＞ 11[6,5],4+1 ＞ Successes: 1",
            Verdict::Success,
        );
    }

    #[test]
    fn test_calc_and_choice() {
        check("C(1+2*3)", "", "C(1+2*3) ＞ 7", Verdict::Unspecified);
        check("choice[A,B,C,D]", "2/4", "(CHOICE[A,B,C,D]) ＞ B", Verdict::Unspecified);
    }

    #[test]
    fn test_rolled_dice_and_secret() {
        let result = run("S2D6", "5/6,3/6");
        assert!(result.is_secret());
        assert_eq!(result.rolled_dice().len(), 2);
        assert_eq!(result.to_string(), "DiceBot : (2D6) ＞ 8[5,3] ＞ 8");
    }

    #[test]
    fn test_dice_limit() {
        let config = Config::default().with_max_dice(4);
        let mut roller = DiceRoller::new("6/6,6/6,6/6,6/6".parse::<ScriptedDieSource>().unwrap());
        let statement = parse("2R6[6]").unwrap();
        assert_eq!(
            execute_statement(statement, &config, &mut roller),
            Err(EvalError::Roll(RollError::TooManyRolls { max: 4 }))
        );

        // the limit starts over with every command
        let mut roller = DiceRoller::new("1/6,2/6,3/6,4/6".parse::<ScriptedDieSource>().unwrap());
        for _ in 0..2 {
            let statement = parse("2D6").unwrap();
            assert!(execute_statement(statement, &config.clone().with_max_dice(2), &mut roller).is_ok());
        }
        assert_eq!(roller.rolled(), 2);
    }

    #[test]
    fn test_eval_errors_propagate() {
        let mut roller = DiceRoller::new(ScriptedDieSource::default());
        let statement = parse("C(1/0)").unwrap();
        assert_eq!(
            execute_statement(statement, &Config::default(), &mut roller),
            Err(EvalError::DivisionByZero)
        );
    }
}
