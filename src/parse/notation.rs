//! Rebuilds command text from a (possibly already rolled) tree using as few
//! parentheses as the operator precedences allow.

use super::ast::*;
use crate::common::*;
use crate::roll::join_values;
use std::fmt;

/// Prints `node` in infix notation.
///
/// `walking_left` is true while the printer descends along the left edge of
/// the whole expression; a leading negative operand may only drop its
/// parentheses there.
pub fn infix_notation(node: &Node, walking_left: bool) -> String {
    match node {
        Node::Int(x) => x.to_string(),
        Node::SumRollResult(result) => {
            format!("{}[{}]", result.sum(), join_values(&result.dice))
        }
        Node::RandomNumber { min, max } => {
            format!("[{}...{}]", infix_notation(min, true), infix_notation(max, true))
        }
        Node::Roll(roll) => roll_notation(roll),
        Node::UnaryMinus(operand) => {
            // dice bind tighter than unary minus, so `-2D6` needs no parentheses
            let bare = match &**operand {
                Node::Int(x) => *x >= 0,
                Node::Roll(_) | Node::RandomNumber { .. } | Node::SumRollResult(_) => true,
                _ => false,
            };
            if bare {
                format!("-{}", infix_notation(operand, false))
            } else {
                format!("-({})", infix_notation(operand, true))
            }
        }
        Node::Binary(Binary { op, lhs, rhs }) => {
            let lhs = operand_notation(*op, lhs, true, walking_left);
            let rhs = operand_notation(*op, rhs, false, walking_left);
            match op {
                BinaryOp::Divide(rounding) => format!("{}/{}{}", lhs, rhs, rounding.suffix()),
                _ => format!("{}{}{}", lhs, op, rhs),
            }
        }
    }
}

// One side of a binary operator, parenthesized if leaving the parentheses out
// would change how it parses.
fn operand_notation(op: BinaryOp, child: &Node, is_left: bool, walking_left: bool) -> String {
    let walking_left = is_left && walking_left;

    let wrap = if child.is_negative() {
        !(walking_left && op.is_left_associative())
    } else {
        let associative = if is_left {
            op.is_left_associative()
        } else {
            op.is_right_associative()
        };
        let prec = child.precedence();
        prec < op.precedence() || (prec == op.precedence() && !associative)
    };

    if wrap {
        format!("({})", infix_notation(child, true))
    } else {
        infix_notation(child, walking_left)
    }
}

fn roll_notation(roll: &Roll) -> String {
    let mut s = format!(
        "{}{}{}",
        roll_operand(&roll.count, true),
        roll.kind,
        roll_operand(&roll.sides, false)
    );
    if let Some(threshold) = &roll.threshold {
        s.push_str(&threshold_notation(threshold));
    }
    s
}

fn roll_operand(node: &Node, is_left: bool) -> String {
    let bare = match node {
        Node::Int(x) => *x >= 0,
        Node::RandomNumber { .. } | Node::SumRollResult(_) => true,
        Node::Roll(_) => is_left,
        _ => false,
    };
    if bare {
        infix_notation(node, is_left)
    } else {
        format!("({})", infix_notation(node, true))
    }
}

fn threshold_notation(threshold: &Node) -> String {
    format!("[{}]", infix_notation(threshold, true))
}

fn rolls_notation<'a>(rolls: impl IntoIterator<Item = &'a Roll>) -> String {
    rolls
        .into_iter()
        .map(roll_notation)
        .collect::<Vec<_>>()
        .join("+")
}

/// `>=5`, with the right-hand side printed as if it belonged to a compare node.
pub fn comparison_notation(comparison: &Comparison) -> String {
    format!(
        "{}{}",
        comparison.op,
        operand_notation(BinaryOp::Compare(comparison.op), &comparison.rhs, false, false)
    )
}

pub fn b_list_notation(list: &BRollList) -> String {
    rolls_notation(list.rolls.iter())
}

pub fn r_list_notation(list: &RRollList) -> String {
    let mut s = rolls_notation(list.rolls.iter());
    if let Some(threshold) = &list.threshold {
        s.push_str(&threshold_notation(threshold));
    }
    s
}

pub fn u_expr_notation(expr: &URollExpr) -> String {
    let mut s = rolls_notation(expr.rolls.iter());
    if let Some(threshold) = &expr.threshold {
        s.push_str(&threshold_notation(threshold));
    }
    if let Some(modifier) = &expr.modifier {
        let modifier = infix_notation(modifier, true);
        if !modifier.starts_with('-') {
            s.push('+');
        }
        s.push_str(&modifier);
    }
    s
}

pub fn choice_notation(items: &[String]) -> String {
    format!("CHOICE[{}]", items.join(","))
}

pub fn command_notation(command: &Command) -> String {
    match command {
        Command::Calc(expr) => format!("C({})", infix_notation(expr, true)),
        Command::DRollExpr(expr) | Command::DRollComp(expr) => infix_notation(expr, true),
        Command::BRollList(list) => b_list_notation(list),
        Command::BRollComp(list, c) => b_list_notation(list) + &comparison_notation(c),
        Command::RRollList(list) => r_list_notation(list),
        Command::RRollComp(list, c) => r_list_notation(list) + &comparison_notation(c),
        Command::URollExpr(expr) => u_expr_notation(expr),
        Command::URollComp(expr, c) => u_expr_notation(expr) + &comparison_notation(c),
        Command::Choice(items) => choice_notation(items),
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&infix_notation(self, true))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&command_notation(self))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.secret {
            f.write_str("S")?;
        }
        fmt::Display::fmt(&self.command, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parser::Parser;
    use crate::roll::Die;

    fn statement(s: &str) -> Statement {
        Parser::new(s).parse().unwrap()
    }

    /// Prints `input` and checks that the printed text is stable under reparsing.
    fn check(input: &str, expected: &str) {
        let printed = statement(input).to_string();
        assert_eq!(printed, expected, "{}", input);
        assert_eq!(statement(&printed).to_string(), printed, "{}", input);
    }

    /// Like [check], and the reparsed tree is identical to the original.
    fn check_exact(input: &str, expected: &str) {
        check(input, expected);
        assert_eq!(statement(expected), statement(input), "{}", input);
    }

    #[test]
    fn test_precedence() {
        check_exact("C(1+2*3)", "C(1+2*3)");
        check_exact("C((1+2)*3)", "C((1+2)*3)");
        check_exact("C((1-2)-3)", "C(1-2-3)");
        check_exact("C(1-(2-3))", "C(1-(2-3))");
        check_exact("C(1-(2+3))", "C(1-(2+3))");
        check_exact("C(2*(3*4))", "C(2*(3*4))");
        check_exact("C(2*3+4*5)", "C(2*3+4*5)");
        check_exact("C(1+(2-3))", "C(1+(2-3))");
        check_exact("C(1+(2+3))", "C(1+(2+3))");
        check_exact("C((1+2)+3)", "C(1+2+3)");
        check_exact("1D6+(2D6+3)", "1D6+(2D6+3)");
    }

    /// Every tree up to `depth` operators deep over `1`, `2`, `3`, unary minus
    /// and the arithmetic operators.
    fn arithmetic_trees(depth: usize) -> Vec<Node> {
        let mut trees: Vec<Node> = (1..=3).map(Node::Int).collect();
        if depth == 0 {
            return trees;
        }

        let subtrees = arithmetic_trees(depth - 1);
        let ops = [
            BinaryOp::Add,
            BinaryOp::Subtract,
            BinaryOp::Multiply,
            BinaryOp::Divide(RoundingMethod::Down),
            BinaryOp::Divide(RoundingMethod::Round),
            BinaryOp::Divide(RoundingMethod::Up),
        ];
        for op in ops {
            for lhs in &subtrees {
                for rhs in &subtrees {
                    trees.push(Node::binary(op, lhs.clone(), rhs.clone()));
                }
            }
        }
        trees.extend(subtrees.iter().cloned().map(Node::unary_minus));
        trees
    }

    #[test]
    fn test_reparse_generated() {
        for tree in arithmetic_trees(2) {
            let printed = format!("C({})", infix_notation(&tree, true));
            assert_eq!(
                statement(&printed).command,
                Command::Calc(tree),
                "{}",
                printed
            );
        }
    }

    #[test]
    fn test_unary_minus() {
        check_exact("C(-1+2)", "C(-1+2)");
        check_exact("C(2+-1)", "C(2+(-1))");
        check_exact("C(-(1+2))", "C(-(1+2))");
        check_exact("C(--1)", "C(-(-1))");
        check_exact("C(-1*2+3)", "C(-1*2+3)");
        check_exact("C(3+-1*2)", "C(3+(-1)*2)");
        check_exact("C(2*-3)", "C(2*(-3))");
    }

    #[test]
    fn test_division() {
        check_exact("C(7/2U*3)", "C(7/2U*3)");
        check_exact("C(6/(3/2))", "C(6/(3/2))");
        check_exact("C(7/(1+1)R)", "C(7/(1+1)R)");
        check_exact("C(6/(2*3))", "C(6/(2*3))");
        check_exact("3D6/2U", "3D6/2U");
        check_exact("6/2D6U+1", "6/2D6U+1");
    }

    #[test]
    fn test_rolls() {
        check_exact("(2+1)D(3*2)", "(2+1)D(3*2)");
        check_exact("[1...3]D6", "[1...3]D6");
        check_exact("[-1...3+1]D6", "[-1...3+1]D6");
        check_exact("1D6D4", "1D6D4");
        check_exact("2D(1D6)", "2D(1D6)");
        check_exact("-2D6", "-2D6");
        check_exact("(-2)D6", "(-2)D6");
        check_exact("2d6 >= -1", "2D6>=(-1)");
        check_exact("2D6+1<>7", "2D6+1<>7");
    }

    #[test]
    fn test_lists() {
        check_exact("2b6+3b10 > 4", "2B6+3B10>4");
        check_exact("2R6+1R10[6]>=6", "2R6+1R10[6]>=6");
        check_exact("2r6", "2R6");
        check_exact("3U6[6]+1-2", "3U6[6]+1-2");
        check_exact("3U6[6]-1-2", "3U6[6]-1-2");
        check_exact("3U6-(1+2)", "3U6-(1+2)");
        check_exact("2U6[5]+2*3>=9", "2U6[5]+2*3>=9");
    }

    #[test]
    fn test_commands() {
        check_exact("choice[A, B c ,D]", "CHOICE[A,B c,D]");
        check_exact("S2D6", "S2D6");
        check_exact("SC(1+1)", "SC(1+1)");
    }

    #[test]
    fn test_rolled_dice() {
        let rolled = Node::SumRollResult(SumRollResult {
            dice: vec![Die::new(5, 6), Die::new(3, 6)],
        });
        let node = Node::add(rolled.clone(), Node::Int(1));
        assert_eq!(infix_notation(&node, true), "8[5,3]+1");

        let node = Node::unary_minus(rolled.clone());
        assert_eq!(infix_notation(&node, true), "-8[5,3]");

        let node = Node::sub(Node::Int(1), Node::Int(-2));
        assert_eq!(infix_notation(&node, true), "1-(-2)");
        let node = Node::add(Node::Int(-2), Node::Int(1));
        assert_eq!(infix_notation(&node, true), "-2+1");

        let roll = Node::roll(RollKind::D, rolled, Node::Int(6));
        assert_eq!(infix_notation(&roll, true), "8[5,3]D6");
    }
}
