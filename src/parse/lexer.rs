use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq)]
enum RawToken {
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"[A-Za-z]+")]
    Word,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("=")]
    Eq,
    #[token("<>")]
    Ne,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token("...")]
    DotDotDot,
    // `.` and `..` are not operators
    #[regex(r"\.\.?")]
    StrayDots,

    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[error]
    Error,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    Illegal,
    Eot,
    Int,
    Ident,

    Plus,
    Minus,
    Asterisk,
    Slash,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    DotDotDot,

    D,
    B,
    R,
    U,
    S,
    C,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("D", TokenKind::D),
    ("B", TokenKind::B),
    ("R", TokenKind::R),
    ("U", TokenKind::U),
    ("S", TokenKind::S),
    ("C", TokenKind::C),
];

fn lookup_word(word: &str) -> TokenKind {
    KEYWORDS
        .iter()
        .find(|(keyword, _)| keyword.eq_ignore_ascii_case(word))
        .map_or(TokenKind::Ident, |&(_, kind)| kind)
}

impl TokenKind {
    /// Tokens that can begin an operand.
    pub const OPERAND_STARTS: &'static [Self] = &[Self::Int, Self::LeftParen, Self::LeftBracket];

    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Illegal => "<illegal>",
            Eot => "<end of text>",
            Int => "<integer>",
            Ident => "<identifier>",
            Plus => "'+'",
            Minus => "'-'",
            Asterisk => "'*'",
            Slash => "'/'",
            Eq => "'='",
            Ne => "'<>'",
            Lt => "'<'",
            Gt => "'>'",
            Le => "'<='",
            Ge => "'>='",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            Comma => "','",
            DotDotDot => "'...'",
            D => "'D'",
            B => "'B'",
            R => "'R'",
            U => "'U'",
            S => "'S'",
            C => "'C'",
        }
    }

    pub fn starts_operand(&self) -> bool {
        Self::OPERAND_STARTS.contains(self)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub literal: &'a str,
    /// 1-indexed, counted in characters.
    pub column: usize,
    /// Byte offset into the source.
    pub offset: usize,
}

impl<'a> Token<'a> {
    /// Byte offset just past the end of the token.
    pub fn end(&self) -> usize {
        self.offset + self.literal.len()
    }
}

/// Splits command text into [Token]s.
///
/// Never fails: anything unrecognised comes out as [TokenKind::Illegal] so
/// the parser can report it with a position.
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, RawToken>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: RawToken::lexer(source),
            finished: false,
        }
    }

    /// Returns the next token, or an [TokenKind::Eot] token once the text
    /// is used up (and on every call after that).
    pub fn next_token(&mut self) -> Token<'a> {
        let raw = match self.inner.next() {
            Some(raw) => raw,
            None => {
                return Token {
                    kind: TokenKind::Eot,
                    literal: "",
                    column: self.column_at(self.source.len()),
                    offset: self.source.len(),
                }
            }
        };

        let literal = self.inner.slice();
        let offset = self.inner.span().start;
        let kind = match raw {
            RawToken::Int => TokenKind::Int,
            RawToken::Word => lookup_word(literal),
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Asterisk => TokenKind::Asterisk,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Ne => TokenKind::Ne,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Le => TokenKind::Le,
            RawToken::Ge => TokenKind::Ge,
            RawToken::LeftParen => TokenKind::LeftParen,
            RawToken::RightParen => TokenKind::RightParen,
            RawToken::LeftBracket => TokenKind::LeftBracket,
            RawToken::RightBracket => TokenKind::RightBracket,
            RawToken::Comma => TokenKind::Comma,
            RawToken::DotDotDot => TokenKind::DotDotDot,
            RawToken::StrayDots | RawToken::Error => TokenKind::Illegal,
        };

        Token {
            kind,
            literal,
            column: self.column_at(offset),
            offset,
        }
    }

    fn column_at(&self, offset: usize) -> usize {
        self.source[..offset].chars().count() + 1
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    /// Like [Lexer::next_token], but ends after the first [TokenKind::Eot].
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        self.finished = token.kind == TokenKind::Eot;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(s: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(s);
        let mut ret = Vec::new();
        loop {
            let token = lexer.next_token();
            ret.push(token.kind);
            if token.kind == Eot {
                return ret;
            }
        }
    }

    #[test]
    fn test_lex_roll() {
        assert_eq!(kinds("2D6+1"), vec![Int, D, Int, Plus, Int, Eot]);
        assert_eq!(kinds("3b6>=4"), vec![Int, B, Int, Ge, Int, Eot]);
        assert_eq!(kinds("2R6[3]"), vec![Int, R, Int, LeftBracket, Int, RightBracket, Eot]);
        assert_eq!(kinds("3D6/2U"), vec![Int, D, Int, Slash, Int, U, Eot]);
        assert_eq!(kinds("C(1<>2)"), vec![C, LeftParen, Int, Ne, Int, RightParen, Eot]);
        assert_eq!(kinds("s2d6<=7"), vec![S, Int, D, Int, Le, Int, Eot]);
    }

    #[test]
    fn test_lex_words() {
        let mut lexer = Lexer::new("choice[Apple,b]");
        let choice = lexer.next_token();
        assert_eq!((choice.kind, choice.literal), (Ident, "choice"));
        assert_eq!(lexer.next_token().kind, LeftBracket);
        assert_eq!(lexer.next_token().literal, "Apple");
        assert_eq!(lexer.next_token().kind, Comma);
        let b = lexer.next_token();
        assert_eq!((b.kind, b.literal), (B, "b"));
    }

    #[test]
    fn test_lex_dots() {
        assert_eq!(kinds("[1...3]"), vec![LeftBracket, Int, DotDotDot, Int, RightBracket, Eot]);
        assert_eq!(kinds("1.3"), vec![Int, Illegal, Int, Eot]);
        assert_eq!(kinds("1..3"), vec![Int, Illegal, Int, Eot]);
        assert_eq!(kinds("1....3"), vec![Int, DotDotDot, Illegal, Int, Eot]);
    }

    #[test]
    fn test_lex_illegal() {
        assert_eq!(kinds("1D6!"), vec![Int, D, Int, Illegal, Eot]);
        assert_eq!(kinds("1%2"), vec![Int, Illegal, Int, Eot]);
    }

    #[test]
    fn test_columns() {
        let mut lexer = Lexer::new("12D6 >= 10");
        let columns: Vec<_> = std::iter::from_fn(|| {
            let token = lexer.next_token();
            (token.kind != Eot).then(|| (token.literal, token.column))
        })
        .collect();
        assert_eq!(columns, vec![("12", 1), ("D", 3), ("6", 4), (">=", 6), ("10", 9)]);
        assert_eq!(lexer.next_token().column, 11);
        assert_eq!(lexer.next_token().kind, Eot);
    }

    #[test]
    fn test_iterator_stops_after_eot() {
        let tokens: Vec<_> = Lexer::new("1+2").map(|t| t.kind).collect();
        assert_eq!(tokens, vec![Int, Plus, Int, Eot]);
    }
}
