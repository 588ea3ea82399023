//! Lexer module
//!
//! A table-driven tokenizer: every rule is a named group in one alternation,
//! tried in table order (leftmost-first), so `<<` wins over `<` and keywords
//! win over identifiers.

pub mod tokens;

pub use tokens::{Keyword, LexError, Token, TokenKind};

use crate::util::span::SourceFile;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Token rules in priority order
pub const TOKEN_SPECS: &[(&str, &str)] = &[
    ("KEYWORD", r"\b(?:string|int|array|for|while|if|else|return|in)\b"),
    ("COUT", r"\bcout\b"),
    ("SHL", r"<<"),
    ("EQ", r"=="),
    ("NEQ", r"!="),
    ("LE", r"<="),
    ("GE", r">="),
    ("ASSIGN", r"="),
    ("LT", r"<"),
    ("GT", r">"),
    ("PLUS", r"\+"),
    ("MINUS", r"-"),
    ("MUL", r"\*"),
    ("COMMENT", r"//[^\n]*"),
    ("DIV", r"/"),
    ("LPAREN", r"\("),
    ("RPAREN", r"\)"),
    ("LBRACE", r"\{"),
    ("RBRACE", r"\}"),
    ("LBRACKET", r"\["),
    ("RBRACKET", r"\]"),
    ("COLON", r":"),
    ("SEMICOLON", r";"),
    ("COMMA", r","),
    ("STRING_LITERAL", r#""[^"\n]*""#),
    ("NUMBER", r"\b\d+\b"),
    ("IDENTIFIER", r"\b[a-zA-Z_][a-zA-Z_0-9]*\b"),
    ("WHITESPACE", r"[ \t\r\n]+"),
];

static TOKEN_REGEX: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    let combined = TOKEN_SPECS
        .iter()
        .map(|(name, pattern)| format!("(?P<{}>{})", name, pattern))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&combined)
});

/// Tokenize source code
///
/// The returned vector always ends with an `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    debug!("Lexing {} bytes", source.len());

    let regex = TOKEN_REGEX
        .as_ref()
        .map_err(|e| LexError::TokenTable(e.to_string()))?;
    let file = SourceFile::new("<input>", source);
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for caps in regex.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > cursor {
            return Err(unexpected_char(&file, source, cursor));
        }
        cursor = whole.end();

        let Some((name, m)) = TOKEN_SPECS
            .iter()
            .find_map(|(name, _)| caps.name(name).map(|m| (*name, m)))
        else {
            continue;
        };
        let text = m.as_str();
        let span = file.span_from_range(m.start(), m.end());

        let kind = match name {
            "WHITESPACE" | "COMMENT" => continue,
            "KEYWORD" => match Keyword::from_word(text) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Identifier(text.to_string()),
            },
            "COUT" => TokenKind::Cout,
            "SHL" => TokenKind::Shl,
            "EQ" => TokenKind::EqEq,
            "NEQ" => TokenKind::Neq,
            "LE" => TokenKind::Le,
            "GE" => TokenKind::Ge,
            "ASSIGN" => TokenKind::Assign,
            "LT" => TokenKind::Lt,
            "GT" => TokenKind::Gt,
            "PLUS" => TokenKind::Plus,
            "MINUS" => TokenKind::Minus,
            "MUL" => TokenKind::Star,
            "DIV" => TokenKind::Slash,
            "LPAREN" => TokenKind::LParen,
            "RPAREN" => TokenKind::RParen,
            "LBRACE" => TokenKind::LBrace,
            "RBRACE" => TokenKind::RBrace,
            "LBRACKET" => TokenKind::LBracket,
            "RBRACKET" => TokenKind::RBracket,
            "COLON" => TokenKind::Colon,
            "SEMICOLON" => TokenKind::Semicolon,
            "COMMA" => TokenKind::Comma,
            "STRING_LITERAL" => TokenKind::StringLiteral(text[1..text.len() - 1].to_string()),
            "NUMBER" => {
                let value = text.parse::<i64>().map_err(|_| LexError::InvalidNumber {
                    literal: text.to_string(),
                    position: span.start.to_string(),
                })?;
                TokenKind::Number(value)
            }
            _ => TokenKind::Identifier(text.to_string()),
        };

        tokens.push(Token::new(kind, span, text));
    }

    if cursor < source.len() {
        return Err(unexpected_char(&file, source, cursor));
    }

    let end = file.span_from_range(source.len(), source.len());
    tokens.push(Token::new(TokenKind::Eof, end, ""));
    debug!("Lexed {} tokens", tokens.len());
    Ok(tokens)
}

fn unexpected_char(
    file: &SourceFile,
    source: &str,
    offset: usize,
) -> LexError {
    let ch = source[offset..].chars().next().unwrap_or('\0');
    LexError::UnexpectedChar {
        ch,
        position: file.position_from_offset(offset).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_declaration_tokens() {
        assert_eq!(
            kinds(r#"string s = "hi";"#),
            vec![
                TokenKind::Keyword(Keyword::String),
                TokenKind::Identifier("s".to_string()),
                TokenKind::Assign,
                TokenKind::StringLiteral("hi".to_string()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_print_and_slice() {
        assert_eq!(
            kinds("cout << arr[1:3];"),
            vec![
                TokenKind::Cout,
                TokenKind::Shl,
                TokenKind::Identifier("arr".to_string()),
                TokenKind::LBracket,
                TokenKind::Number(1),
                TokenKind::Colon,
                TokenKind::Number(3),
                TokenKind::RBracket,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_prefer_longest_rule() {
        assert_eq!(
            kinds("a <= b == c != d >= e < f > g"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Le,
                TokenKind::Identifier("b".to_string()),
                TokenKind::EqEq,
                TokenKind::Identifier("c".to_string()),
                TokenKind::Neq,
                TokenKind::Identifier("d".to_string()),
                TokenKind::Ge,
                TokenKind::Identifier("e".to_string()),
                TokenKind::Lt,
                TokenKind::Identifier("f".to_string()),
                TokenKind::Gt,
                TokenKind::Identifier("g".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(
            kinds("integer strings"),
            vec![
                TokenKind::Identifier("integer".to_string()),
                TokenKind::Identifier("strings".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_division() {
        assert_eq!(
            kinds("a / b // trailing comment\n"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Slash,
                TokenKind::Identifier("b".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = tokenize("int a = 1;\ncout << a;").unwrap();
        let cout = tokens.iter().find(|t| t.kind == TokenKind::Cout).unwrap();
        assert_eq!(cout.span.start.line, 2);
        assert_eq!(cout.span.start.column, 1);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("int a = 1 $ 2;").unwrap_err();
        assert!(matches!(err, LexError::UnexpectedChar { ch: '$', .. }));
        assert!(err.to_string().contains("1:11"));
    }

    #[test]
    fn test_number_overflow() {
        let err = tokenize("int a = 99999999999999999999;").unwrap_err();
        assert!(matches!(err, LexError::InvalidNumber { .. }));
    }
}
