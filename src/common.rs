use std::fmt::{self, Write};
pub use vec1::vec1;

pub type Int = i64;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// Binding strength of a node, weakest first.
///
/// Only the notation printer looks at this. The binary tiers match the
/// parser's call structure; unary minus is the exception, since the parser
/// binds dice tighter (`-2D6` is `-(2D6)`) and the printer special-cases it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Precedence {
    Compare,
    Additive,
    Multiplicative,
    Roll,
    RandomRange,
    Unary,
    Primary,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    pub fn compare(self, lhs: Int, rhs: Int) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Gt => lhs > rhs,
            Self::Le => lhs <= rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// How the quotient of an integer division is brought back to an integer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RoundingMethod {
    Down,
    Round,
    Up,
}

impl RoundingMethod {
    /// Returns `None` when `rhs` is zero or the quotient does not fit in [Int].
    pub fn divide(self, lhs: Int, rhs: Int) -> Option<Int> {
        if rhs == 0 {
            return None;
        }
        let quotient = lhs.checked_div(rhs)?;
        let remainder = lhs.checked_rem(rhs)?;
        if remainder == 0 {
            return Some(quotient);
        }

        // the exact quotient is positive iff remainder and divisor share a sign
        let away_from_zero = if (remainder > 0) == (rhs > 0) { 1 } else { -1 };
        match self {
            Self::Down => Some(quotient),
            Self::Round => {
                let (r, d) = (remainder.unsigned_abs(), rhs.unsigned_abs());
                if r >= d - r {
                    quotient.checked_add(away_from_zero)
                } else {
                    Some(quotient)
                }
            }
            Self::Up if away_from_zero > 0 => quotient.checked_add(1),
            Self::Up => Some(quotient),
        }
    }

    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Down => "",
            Self::Round => "R",
            Self::Up => "U",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide(RoundingMethod),
    Compare(CompareOp),
}

impl BinaryOp {
    pub const fn precedence(self) -> Precedence {
        match self {
            Self::Compare(_) => Precedence::Compare,
            Self::Add | Self::Subtract => Precedence::Additive,
            Self::Multiply | Self::Divide(_) => Precedence::Multiplicative,
        }
    }

    pub const fn is_left_associative(self) -> bool {
        !matches!(self, Self::Compare(_))
    }

    /// Always false: the parser folds every chain to the left, so a right
    /// child of equal precedence needs its parentheses to parse back the same.
    pub const fn is_right_associative(self) -> bool {
        false
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_char('+'),
            Self::Subtract => f.write_char('-'),
            Self::Multiply => f.write_char('*'),
            Self::Divide(_) => f.write_char('/'),
            Self::Compare(op) => fmt::Display::fmt(op, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare() {
        assert!(CompareOp::Ge.compare(4, 4));
        assert!(!CompareOp::Gt.compare(4, 4));
        assert!(CompareOp::Ne.compare(1, 2));
        assert!(CompareOp::Le.compare(-3, 2));
    }

    #[test]
    fn test_divide() {
        assert_eq!(RoundingMethod::Down.divide(7, 2), Some(3));
        assert_eq!(RoundingMethod::Down.divide(-7, 2), Some(-3));
        assert_eq!(RoundingMethod::Round.divide(7, 2), Some(4));
        assert_eq!(RoundingMethod::Round.divide(5, 3), Some(2));
        assert_eq!(RoundingMethod::Round.divide(-7, 2), Some(-4));
        assert_eq!(RoundingMethod::Up.divide(7, 3), Some(3));
        assert_eq!(RoundingMethod::Up.divide(-7, 2), Some(-3));
        assert_eq!(RoundingMethod::Up.divide(-7, -2), Some(4));
        assert_eq!(RoundingMethod::Round.divide(7, -2), Some(-4));
        assert_eq!(RoundingMethod::Round.divide(-5, -3), Some(2));
        assert_eq!(RoundingMethod::Round.divide(4, 3), Some(1));
        assert_eq!(RoundingMethod::Up.divide(6, 0), None);
    }

    #[test]
    fn test_divide_large() {
        let big = 9_007_199_254_740_993;
        assert_eq!(RoundingMethod::Round.divide(big, 1), Some(big));
        assert_eq!(RoundingMethod::Up.divide(big, 1), Some(big));
        assert_eq!(RoundingMethod::Round.divide(big, 2), Some(4_503_599_627_370_497));
        assert_eq!(RoundingMethod::Up.divide(Int::MAX, 2), Some(Int::MAX / 2 + 1));
        assert_eq!(RoundingMethod::Round.divide(Int::MAX, Int::MIN), Some(-1));
        assert_eq!(RoundingMethod::Round.divide(Int::MIN, -1), None);
        assert_eq!(RoundingMethod::Up.divide(Int::MIN, -1), None);
    }

    #[test]
    fn test_precedence_order() {
        assert!(Precedence::Compare < Precedence::Additive);
        assert!(Precedence::Multiplicative < Precedence::Roll);
        assert!(Precedence::RandomRange < Precedence::Unary);
        assert!(!BinaryOp::Add.is_right_associative());
        assert_eq!(BinaryOp::Divide(RoundingMethod::Up).precedence(), Precedence::Multiplicative);
    }
}
