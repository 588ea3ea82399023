//! Frontend
//!
//! Lexer, parser and semantic checker. The frontend turns source text into a
//! checked AST plus its symbol table, which the middle end lowers to IR.

pub mod lexer;
pub mod parser;
pub mod typecheck;

pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use parser::{parse, ParseError, Program};
pub use typecheck::{check, SymbolTable, TypeError};
