use super::ast::*;
use super::error::{ParseError, ParseErrorKind};
use super::lexer::{Lexer, Token, TokenKind};
use crate::common::*;
use log::trace;

type PResult<T = Node> = Result<T, ParseError>;

const CHOICE: &str = "choice";
const SECRET_CHOICE: &str = "schoice";
const SECRET_CALC: &str = "sc";

/// Recursive-descent parser with two tokens of lookahead.
pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    current: Token<'a>,
    peek: Token<'a>,
    // inside `C(...)`: no dice, no random numbers
    constant_only: bool,
}

impl<'a> Parser<'a> {
    const ADDITION_OPS: &'static [TokenKind] = &[TokenKind::Plus, TokenKind::Minus];

    const MULTIPLICATION_OPS: &'static [TokenKind] = &[TokenKind::Asterisk, TokenKind::Slash];

    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            source,
            lexer,
            current,
            peek,
            constant_only: false,
        }
    }

    pub fn parse(mut self) -> PResult<Statement> {
        let statement = self.parse_statement()?;
        self.consume(TokenKind::Eot)?;
        trace!(
            "parsed {} (secret: {})",
            statement.command.name(),
            statement.secret
        );
        Ok(statement)
    }

    fn advance(&mut self) -> Token<'a> {
        let token = self.current;
        self.current = self.peek;
        self.peek = self.lexer.next_token();
        token
    }

    fn matches(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn matches_any(&self, options: &[TokenKind]) -> bool {
        options.contains(&self.current.kind)
    }

    fn matches_word(&self, word: &str) -> bool {
        self.matches(TokenKind::Ident) && self.current.literal.eq_ignore_ascii_case(word)
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<Token<'a>> {
        if self.matches(expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_token(vec![expected]))
        }
    }

    fn error_at(token: &Token<'_>, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            column: token.column,
            literal: token.literal.to_string(),
        }
    }

    fn unexpected_token(&self, expected: Vec<TokenKind>) -> ParseError {
        let found = self.current.kind;
        let kind = if found == TokenKind::Illegal {
            ParseErrorKind::IllegalToken
        } else {
            ParseErrorKind::UnexpectedToken { found, expected }
        };
        Self::error_at(&self.current, kind)
    }

    fn parse_statement(&mut self) -> PResult<Statement> {
        if self.matches_word(SECRET_CHOICE) && self.peek.kind == TokenKind::LeftBracket {
            self.advance();
            return Ok(Statement::new(self.parse_choice()?, true));
        }
        if self.matches_word(SECRET_CALC) && self.peek.kind == TokenKind::LeftParen {
            self.advance();
            return Ok(Statement::new(self.parse_calc()?, true));
        }

        let secret = self.matches(TokenKind::S);
        if secret {
            self.advance();
        }
        Ok(Statement::new(self.parse_command()?, secret))
    }

    fn parse_command(&mut self) -> PResult<Command> {
        if self.matches(TokenKind::C) && self.peek.kind == TokenKind::LeftParen {
            self.advance();
            self.parse_calc()
        } else if self.matches_word(CHOICE) && self.peek.kind == TokenKind::LeftBracket {
            self.advance();
            self.parse_choice()
        } else {
            self.parse_roll_command()
        }
    }

    fn parse_calc(&mut self) -> PResult<Command> {
        self.consume(TokenKind::LeftParen)?;
        self.constant_only = true;
        let expr = self.parse_additive()?;
        self.constant_only = false;
        self.consume(TokenKind::RightParen)?;
        Ok(Command::Calc(expr))
    }

    fn parse_choice(&mut self) -> PResult<Command> {
        self.consume(TokenKind::LeftBracket)?;
        let mut items = vec![self.parse_choice_item()?];
        while self.matches(TokenKind::Comma) {
            self.advance();
            items.push(self.parse_choice_item()?);
        }
        self.consume(TokenKind::RightBracket)?;

        match NonEmpty::try_from_vec(items) {
            Ok(items) => Ok(Command::Choice(items)),
            Err(_) => Err(Self::error_at(&self.current, ParseErrorKind::EmptyChoiceItem)),
        }
    }

    // Everything up to the next ',' or ']' is taken verbatim from the source.
    fn parse_choice_item(&mut self) -> PResult<String> {
        let first = self.current;
        let mut end = first.offset;
        while !self.matches_any(&[TokenKind::Comma, TokenKind::RightBracket, TokenKind::Eot]) {
            end = self.advance().end();
        }
        if self.matches(TokenKind::Eot) {
            return Err(self.unexpected_token(vec![TokenKind::Comma, TokenKind::RightBracket]));
        }

        let item = self.source.get(first.offset..end).map_or("", str::trim);
        if item.is_empty() {
            return Err(Self::error_at(&first, ParseErrorKind::EmptyChoiceItem));
        }
        Ok(item.to_string())
    }

    fn parse_roll_command(&mut self) -> PResult<Command> {
        let start = self.current;
        let lhs = self.parse_additive()?;
        let comparison = match self.compare_op() {
            Some(op) => {
                self.advance();
                let rhs = self.parse_additive()?;
                if self.compare_op().is_some() {
                    return Err(Self::error_at(&self.current, ParseErrorKind::ChainedComparison));
                }
                Some(Comparison::new(op, rhs))
            }
            None => None,
        };

        classify(lhs, comparison).map_err(|kind| Self::error_at(&start, kind))
    }

    fn compare_op(&self) -> Option<CompareOp> {
        let op = match self.current.kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::Ne => CompareOp::Ne,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Le => CompareOp::Le,
            TokenKind::Ge => CompareOp::Ge,
            _ => return None,
        };
        Some(op)
    }

    fn parse_additive(&mut self) -> PResult {
        let mut lhs = self.parse_multiplicative()?;

        while self.matches_any(Self::ADDITION_OPS) {
            let op = match self.advance().kind {
                TokenKind::Plus => BinaryOp::Add,
                _ => BinaryOp::Subtract,
            };
            let rhs = self.parse_multiplicative()?;
            lhs = Node::binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult {
        let mut lhs = self.parse_unary()?;

        while self.matches_any(Self::MULTIPLICATION_OPS) {
            if self.advance().kind == TokenKind::Asterisk {
                let rhs = self.parse_unary()?;
                lhs = Node::mul(lhs, rhs);
                continue;
            }

            let rhs = self.parse_unary()?;
            let rounding = match self.current.kind {
                TokenKind::U => RoundingMethod::Up,
                TokenKind::R => RoundingMethod::Round,
                _ => RoundingMethod::Down,
            };
            if rounding != RoundingMethod::Down {
                self.advance();
            }
            lhs = Node::div(lhs, rhs, rounding);
        }

        Ok(lhs)
    }

    // The operand is a whole roll: `-2D6` is `-(2D6)`, not `(-2)D6`.
    fn parse_unary(&mut self) -> PResult {
        if self.matches(TokenKind::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            Ok(Node::unary_minus(operand))
        } else {
            self.parse_roll()
        }
    }

    fn parse_roll(&mut self) -> PResult {
        let mut node = self.parse_operand()?;

        loop {
            // `R` and `U` double as rounding suffixes, so they only start a
            // roll when an operand follows.
            let kind = match self.current.kind {
                TokenKind::D => RollKind::D,
                TokenKind::B => RollKind::B,
                TokenKind::R if self.peek.kind.starts_operand() => RollKind::R,
                TokenKind::U if self.peek.kind.starts_operand() => RollKind::U,
                _ => break,
            };
            let token = self.advance();
            if self.constant_only {
                return Err(Self::error_at(&token, ParseErrorKind::DiceInCalc));
            }

            let sides = self.parse_operand()?;
            let mut roll = Roll::new(kind, node, sides);
            if matches!(kind, RollKind::R | RollKind::U) && self.matches(TokenKind::LeftBracket) {
                self.advance();
                let threshold = self.parse_additive()?;
                self.consume(TokenKind::RightBracket)?;
                roll = roll.with_threshold(threshold);
            }
            node = Node::Roll(roll);
        }

        Ok(node)
    }

    fn parse_operand(&mut self) -> PResult {
        match self.current.kind {
            TokenKind::Int => {
                let token = self.advance();
                token
                    .literal
                    .parse()
                    .map(Node::Int)
                    .map_err(|_| Self::error_at(&token, ParseErrorKind::IntegerOverflow))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_additive()?;
                self.consume(TokenKind::RightParen)?;
                Ok(inner)
            }
            TokenKind::LeftBracket => {
                let token = self.advance();
                if self.constant_only {
                    return Err(Self::error_at(&token, ParseErrorKind::RandomNumberInCalc));
                }
                let min = self.parse_additive()?;
                self.consume(TokenKind::DotDotDot)?;
                let max = self.parse_additive()?;
                self.consume(TokenKind::RightBracket)?;
                Ok(Node::random_number(min, max))
            }
            _ => Err(self.unexpected_token(TokenKind::OPERAND_STARTS.to_vec())),
        }
    }
}

const LIST_KINDS: &[RollKind] = &[RollKind::B, RollKind::R, RollKind::U];

/// Picks the command a parsed `lhs [op rhs]` stands for.
fn classify(lhs: Node, comparison: Option<Comparison>) -> Result<Command, ParseErrorKind> {
    if comparison
        .as_ref()
        .map_or(false, |c| c.rhs.contains_roll(LIST_KINDS))
    {
        return Err(ParseErrorKind::MixedRollFamilies);
    }

    let kind = match LIST_KINDS.iter().copied().find(|k| lhs.contains_roll(&[*k])) {
        Some(kind) => kind,
        None => return classify_sum(lhs, comparison),
    };

    let command = match kind {
        RollKind::B => {
            let (rolls, threshold) = split_rolls(lhs, kind)?;
            if threshold.is_some() {
                return Err(ParseErrorKind::MisplacedThreshold);
            }
            let list = BRollList { rolls };
            match comparison {
                Some(c) => Command::BRollComp(list, c),
                None => Command::BRollList(list),
            }
        }
        RollKind::R => {
            let (rolls, threshold) = split_rolls(lhs, kind)?;
            let list = RRollList { rolls, threshold };
            match comparison {
                Some(c) => Command::RRollComp(list, c),
                None => Command::RRollList(list),
            }
        }
        _ => {
            let (rolls, modifier) = split_modifier(lhs)?;
            let (rolls, threshold) = split_rolls(rolls, kind)?;
            let expr = URollExpr {
                rolls,
                threshold,
                modifier: modifier.map(Box::new),
            };
            match comparison {
                Some(c) => Command::URollComp(expr, c),
                None => Command::URollExpr(expr),
            }
        }
    };
    Ok(command)
}

fn classify_sum(lhs: Node, comparison: Option<Comparison>) -> Result<Command, ParseErrorKind> {
    match comparison {
        Some(c) if lhs.is_variable() || c.rhs.is_variable() => {
            Ok(Command::DRollComp(Node::compare(lhs, c.op, c.rhs)))
        }
        None if lhs.is_variable() => Ok(Command::DRollExpr(lhs)),
        _ => Err(ParseErrorKind::NoDiceRoll),
    }
}

/// Unrolls `a+b+c` where every term is a `kind` roll. Only the last roll may
/// carry a threshold, which is lifted out for the whole list.
fn split_rolls(
    node: Node,
    kind: RollKind,
) -> Result<(NonEmpty<Roll>, Option<Box<Node>>), ParseErrorKind> {
    let mut rolls = Vec::new();
    let mut node = node;
    loop {
        match node {
            Node::Roll(roll) if roll.kind == kind => {
                rolls.push(roll);
                break;
            }
            Node::Binary(Binary {
                op: BinaryOp::Add,
                lhs,
                rhs,
            }) => match *rhs {
                Node::Roll(roll) if roll.kind == kind => {
                    rolls.push(roll);
                    node = *lhs;
                }
                _ => return Err(ParseErrorKind::MixedRollFamilies),
            },
            _ => return Err(ParseErrorKind::MixedRollFamilies),
        }
    }
    rolls.reverse();

    let last = rolls.len() - 1;
    if rolls[..last].iter().any(|r| r.threshold.is_some()) {
        return Err(ParseErrorKind::MisplacedThreshold);
    }
    let threshold = rolls[last].threshold.take();
    if rolls
        .iter()
        .any(|r| r.count.contains_roll(LIST_KINDS) || r.sides.contains_roll(LIST_KINDS))
        || threshold.as_ref().map_or(false, |t| t.contains_roll(LIST_KINDS))
    {
        return Err(ParseErrorKind::MixedRollFamilies);
    }

    NonEmpty::try_from_vec(rolls)
        .map(|rolls| (rolls, threshold))
        .map_err(|_| ParseErrorKind::MixedRollFamilies)
}

/// Splits `3U6+1U10+2-1` into the rolls and a constant modifier (`2-1`).
fn split_modifier(node: Node) -> Result<(Node, Option<Node>), ParseErrorKind> {
    let mut terms = Vec::new();
    let mut node = node;
    loop {
        match node {
            Node::Binary(Binary { op, lhs, rhs })
                if matches!(op, BinaryOp::Add | BinaryOp::Subtract)
                    && !matches!(&*rhs, Node::Roll(r) if r.kind == RollKind::U) =>
            {
                terms.push((op, *rhs));
                node = *lhs;
            }
            rolls => {
                node = rolls;
                break;
            }
        }
    }

    let mut modifier: Option<Node> = None;
    for (op, term) in terms.into_iter().rev() {
        modifier = Some(match modifier {
            Some(acc) => Node::binary(op, acc, term),
            None if op == BinaryOp::Subtract => Node::unary_minus(term),
            None => term,
        });
    }

    if modifier.as_ref().map_or(false, Node::is_variable) {
        return Err(ParseErrorKind::InvalidModifier);
    }
    Ok((node, modifier))
}
