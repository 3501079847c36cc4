//! Token model and the one-token-lookahead cursor the parser reads from.
//!
//! Tokens arrive from outside the parser (the bundled [`lexer`] or any other
//! producer) as a flat, ordered sequence. [`TokenStream`] walks that sequence
//! strictly left to right and never hands back a token it has already moved
//! past.
//!
//! [`lexer`]: crate::parser::lexer

use std::fmt;

/// Token tags.
///
/// Keywords, operators and punctuation carry no payload; identifiers and
/// literals keep their text in [`Token::lexeme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals and names
    Ident,
    Num,
    Str,

    // Keywords
    Def,
    Var,
    Int,
    Rat,
    StrType,
    If,
    Elif,
    Else,
    While,
    For,
    Switch,
    Case,
    Default,
    Return,

    // Operators
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %
    Assign,  // =
    EqEq,    // ==
    NotEq,   // !=
    Lt,      // <
    Le,      // <=
    Gt,      // >
    Ge,      // >=
    AndAnd,  // &&
    OrOr,    // ||
    Bang,    // !

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,

    Eof,
}

impl TokenKind {
    /// Maps a word to its keyword kind, if it is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "def" => TokenKind::Def,
            "var" => TokenKind::Var,
            "int" => TokenKind::Int,
            "rat" => TokenKind::Rat,
            "str" => TokenKind::StrType,
            "if" => TokenKind::If,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "return" => TokenKind::Return,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical source text for fixed tokens; `None` for identifiers,
    /// literals and end of input.
    pub fn spelling(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Ident | TokenKind::Num | TokenKind::Str | TokenKind::Eof => return None,
            TokenKind::Def => "def",
            TokenKind::Var => "var",
            TokenKind::Int => "int",
            TokenKind::Rat => "rat",
            TokenKind::StrType => "str",
            TokenKind::If => "if",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::Return => "return",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Assign => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
        };
        Some(text)
    }

    /// Type keywords usable in declarations and parameters.
    pub fn is_type_keyword(self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Rat | TokenKind::StrType)
    }

    /// Keywords that open a statement; error recovery stops in front of these.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Def
                | TokenKind::Var
                | TokenKind::Int
                | TokenKind::Rat
                | TokenKind::StrType
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Switch
                | TokenKind::Return
                | TokenKind::LBrace
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Num => write!(f, "numeric literal"),
            TokenKind::Str => write!(f, "string literal"),
            TokenKind::Eof => write!(f, "end of file"),
            other => match other.spelling() {
                Some(text) => write!(f, "'{}'", text),
                None => write!(f, "{:?}", other),
            },
        }
    }
}

/// A single token: tag, raw lexeme and the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// A fixed token whose lexeme is its canonical spelling.
    pub fn fixed(kind: TokenKind, line: usize) -> Self {
        Token::new(kind, kind.spelling().unwrap_or(""), line)
    }

    pub fn ident(name: &str, line: usize) -> Self {
        Token::new(TokenKind::Ident, name, line)
    }

    pub fn num(text: &str, line: usize) -> Self {
        Token::new(TokenKind::Num, text, line)
    }

    pub fn string(text: &str, line: usize) -> Self {
        Token::new(TokenKind::Str, text, line)
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenKind::Eof, "", line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident => write!(f, "identifier '{}'", self.lexeme),
            TokenKind::Num => write!(f, "numeric literal {}", self.lexeme),
            TokenKind::Str => write!(f, "string literal \"{}\"", self.lexeme),
            kind => write!(f, "{}", kind),
        }
    }
}

/// Cursor over a token sequence with one token of lookahead.
///
/// The stream always ends with an [`TokenKind::Eof`] sentinel; one is
/// appended on construction if the producer left it off, so `peek` never
/// runs past the end.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token::eof(line));
        }
        TokenStream {
            tokens,
            position: 0,
        }
    }

    /// The current token, not consumed.
    pub fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Consumes the current token and returns it. At end of input the
    /// sentinel is returned again without moving.
    pub fn advance(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    pub fn is_at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// Number of tokens consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_appends_eof() {
        let stream = TokenStream::new(vec![Token::ident("x", 3)]);
        assert_eq!(stream.tokens().len(), 2);
        assert_eq!(stream.tokens()[1].kind, TokenKind::Eof);
        assert_eq!(stream.tokens()[1].line, 3);
    }

    #[test]
    fn test_advance_stops_at_eof() {
        let mut stream = TokenStream::new(vec![Token::ident("x", 1)]);
        assert_eq!(stream.advance().lexeme, "x");
        assert!(stream.is_at_end());
        assert_eq!(stream.advance().kind, TokenKind::Eof);
        assert_eq!(stream.position(), 1);
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::keyword("elif"), Some(TokenKind::Elif));
        assert_eq!(TokenKind::keyword("str"), Some(TokenKind::StrType));
        assert_eq!(TokenKind::keyword("main"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::RParen.to_string(), "')'");
        assert_eq!(Token::ident("count", 1).to_string(), "identifier 'count'");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
