use crate::common::*;
use crate::roll::Die;
use std::fmt;

/// Which dice family a roll belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RollKind {
    /// Sum of the dice.
    D,
    /// Bara-bara: every die is reported on its own.
    B,
    /// Count reroll.
    R,
    /// Compounding roll.
    U,
}

impl RollKind {
    pub const fn letter(self) -> char {
        match self {
            Self::D => 'D',
            Self::B => 'B',
            Self::R => 'R',
            Self::U => 'U',
        }
    }
}

impl fmt::Display for RollKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// `count ⊗ sides`, e.g. `2D6` or `3R6[5]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Roll {
    pub kind: RollKind,
    pub count: Box<Node>,
    pub sides: Box<Node>,
    pub threshold: Option<Box<Node>>,
}

impl Roll {
    pub fn new(kind: RollKind, count: Node, sides: Node) -> Self {
        Self {
            kind,
            count: Box::new(count),
            sides: Box::new(sides),
            threshold: None,
        }
    }

    pub fn with_threshold(mut self, threshold: Node) -> Self {
        self.threshold = Some(Box::new(threshold));
        self
    }

    fn args(&self) -> impl Iterator<Item = &Node> + '_ {
        [&*self.count, &*self.sides]
            .into_iter()
            .chain(self.threshold.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: BinaryOp,
    pub lhs: Box<Node>,
    pub rhs: Box<Node>,
}

/// A `D` roll after its dice have been rolled.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SumRollResult {
    pub dice: Vec<Die>,
}

impl SumRollResult {
    pub fn sum(&self) -> Int {
        crate::roll::sum(&self.dice)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Int(Int),
    UnaryMinus(Box<Node>),
    Binary(Binary),
    RandomNumber { min: Box<Node>, max: Box<Node> },
    Roll(Roll),
    SumRollResult(SumRollResult),
}

impl Node {
    pub fn unary_minus(node: Node) -> Self {
        Self::UnaryMinus(Box::new(node))
    }

    pub fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Self {
        Self::Binary(Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn add(lhs: Node, rhs: Node) -> Self {
        Self::binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn sub(lhs: Node, rhs: Node) -> Self {
        Self::binary(BinaryOp::Subtract, lhs, rhs)
    }

    pub fn mul(lhs: Node, rhs: Node) -> Self {
        Self::binary(BinaryOp::Multiply, lhs, rhs)
    }

    pub fn div(lhs: Node, rhs: Node, rounding: RoundingMethod) -> Self {
        Self::binary(BinaryOp::Divide(rounding), lhs, rhs)
    }

    pub fn compare(lhs: Node, op: CompareOp, rhs: Node) -> Self {
        Self::binary(BinaryOp::Compare(op), lhs, rhs)
    }

    pub fn random_number(min: Node, max: Node) -> Self {
        Self::RandomNumber {
            min: Box::new(min),
            max: Box::new(max),
        }
    }

    pub fn roll(kind: RollKind, count: Node, sides: Node) -> Self {
        Self::Roll(Roll::new(kind, count, sides))
    }

    /// Rolls, random numbers and plain values: the nodes whose arguments are
    /// resolved before anything is rolled.
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            Self::Int(_)
                | Self::RandomNumber { .. }
                | Self::Roll(_)
                | Self::SumRollResult(_)
        )
    }

    /// Whether the value of this subtree still depends on dice that have not
    /// been rolled yet.
    pub fn is_variable(&self) -> bool {
        match self {
            Self::Int(_) | Self::SumRollResult(_) => false,
            Self::Roll(_) | Self::RandomNumber { .. } => true,
            Self::UnaryMinus(x) => x.is_variable(),
            Self::Binary(b) => b.lhs.is_variable() || b.rhs.is_variable(),
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Binary(b) => b.op.precedence(),
            Self::Roll(_) => Precedence::Roll,
            Self::RandomNumber { .. } => Precedence::RandomRange,
            Self::UnaryMinus(_) => Precedence::Unary,
            Self::Int(_) | Self::SumRollResult(_) => Precedence::Primary,
        }
    }

    pub fn is_left_associative(&self) -> bool {
        match self {
            Self::Binary(b) => b.op.is_left_associative(),
            Self::Roll(_) => true,
            _ => false,
        }
    }

    pub fn is_right_associative(&self) -> bool {
        match self {
            Self::Binary(b) => b.op.is_right_associative(),
            _ => false,
        }
    }

    /// A negative value when printed: `-x` or a negative integer.
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::UnaryMinus(_)) || matches!(self, Self::Int(x) if *x < 0)
    }

    /// Whether a roll of one of `kinds` appears anywhere in this subtree.
    pub fn contains_roll(&self, kinds: &[RollKind]) -> bool {
        match self {
            Self::Int(_) | Self::SumRollResult(_) => false,
            Self::Roll(r) => kinds.contains(&r.kind) || r.args().any(|x| x.contains_roll(kinds)),
            Self::RandomNumber { min, max } => min.contains_roll(kinds) || max.contains_roll(kinds),
            Self::UnaryMinus(x) => x.contains_roll(kinds),
            Self::Binary(b) => b.lhs.contains_roll(kinds) || b.rhs.contains_roll(kinds),
        }
    }
}

impl From<Int> for Node {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

/// `op rhs`, the right half of a comparison command.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub op: CompareOp,
    pub rhs: Node,
}

impl Comparison {
    pub fn new(op: CompareOp, rhs: Node) -> Self {
        Self { op, rhs }
    }
}

/// `2B6+3B10`
#[derive(Debug, Clone, PartialEq)]
pub struct BRollList {
    pub rolls: NonEmpty<Roll>,
}

/// `2R6+1R10[6]`; the threshold applies to the whole list.
#[derive(Debug, Clone, PartialEq)]
pub struct RRollList {
    pub rolls: NonEmpty<Roll>,
    pub threshold: Option<Box<Node>>,
}

/// `3U6[6]+1`; the modifier is a constant added to every chain.
#[derive(Debug, Clone, PartialEq)]
pub struct URollExpr {
    pub rolls: NonEmpty<Roll>,
    pub threshold: Option<Box<Node>>,
    pub modifier: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `C(...)`: arithmetic without any randomness.
    Calc(Node),
    DRollExpr(Node),
    /// The node is always a comparison.
    DRollComp(Node),
    BRollList(BRollList),
    BRollComp(BRollList, Comparison),
    RRollList(RRollList),
    RRollComp(RRollList, Comparison),
    URollExpr(URollExpr),
    URollComp(URollExpr, Comparison),
    Choice(NonEmpty<String>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Calc(_) => "Calc",
            Self::DRollExpr(_) => "DRollExpr",
            Self::DRollComp(_) => "DRollComp",
            Self::BRollList(_) => "BRollList",
            Self::BRollComp(..) => "BRollComp",
            Self::RRollList(_) => "RRollList",
            Self::RRollComp(..) => "RRollComp",
            Self::URollExpr(_) => "URollExpr",
            Self::URollComp(..) => "URollComp",
            Self::Choice(_) => "Choice",
        }
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub command: Command,
    /// Set by a leading `S`; the result should only be shown to the roller.
    pub secret: bool,
}

impl Statement {
    pub fn new(command: Command, secret: bool) -> Self {
        Self { command, secret }
    }
}
