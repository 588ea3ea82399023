//! Token types

use crate::util::span::Span;
use std::fmt;

/// Lexer error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: String },
    #[error("Invalid number literal '{literal}' at {position}")]
    InvalidNumber { literal: String, position: String },
    #[error("Invalid token table: {0}")]
    TokenTable(String),
}

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    String,
    Int,
    Array,
    For,
    While,
    If,
    Else,
    Return,
    In,
}

impl Keyword {
    /// Look up a keyword by its spelling
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "string" => Keyword::String,
            "int" => Keyword::Int,
            "array" => Keyword::Array,
            "for" => Keyword::For,
            "while" => Keyword::While,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "return" => Keyword::Return,
            "in" => Keyword::In,
            _ => return None,
        })
    }

    /// Source spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::String => "string",
            Keyword::Int => "int",
            Keyword::Array => "array",
            Keyword::For => "for",
            Keyword::While => "while",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::Return => "return",
            Keyword::In => "in",
        }
    }
}

/// Token kind
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Keyword(Keyword),
    Cout,

    // Identifiers and literals
    Identifier(String),
    Number(i64),
    StringLiteral(String),

    // Operators
    Shl,
    EqEq,
    Neq,
    Le,
    Ge,
    Assign,
    Lt,
    Gt,
    Plus,
    Minus,
    Star,
    Slash,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Semicolon,
    Comma,

    // Special
    Eof,
}

impl TokenKind {
    /// Category name, as shown in token listings
    pub fn category(&self) -> &'static str {
        match self {
            TokenKind::Keyword(_) => "KEYWORD",
            TokenKind::Cout => "COUT",
            TokenKind::Identifier(_) => "IDENTIFIER",
            TokenKind::Number(_) => "NUMBER",
            TokenKind::StringLiteral(_) => "STRING_LITERAL",
            TokenKind::Shl => "SHL",
            TokenKind::EqEq => "EQ",
            TokenKind::Neq => "NEQ",
            TokenKind::Le => "LE",
            TokenKind::Ge => "GE",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Lt => "LT",
            TokenKind::Gt => "GT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "MUL",
            TokenKind::Slash => "DIV",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Colon => "COLON",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "'{}'", kw.as_str()),
            TokenKind::Cout => write!(f, "'cout'"),
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::StringLiteral(s) => write!(f, "string \"{}\"", s),
            TokenKind::Shl => write!(f, "'<<'"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::Neq => write!(f, "'!='"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// Token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Raw source text of the token
    pub text: String,
}

impl Token {
    /// Create a token
    pub fn new(
        kind: TokenKind,
        span: Span,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}
