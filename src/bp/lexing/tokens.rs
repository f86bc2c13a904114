//! Token definitions for Blueprint
//!
//! The tokens are defined using the logos derive macro. Whitespace (newlines included) is
//! skipped here; the scanner recovers line breaks from the byte spans between tokens.
//! Comments are real tokens because the printer must reproduce them.
use super::strings;
use logos::{Lexer, Logos};
use std::fmt;
use thiserror::Error;

/// Errors the tokenizer reports; the parser turns them into parse errors and continues
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
pub enum LexError {
    #[default]
    #[error("illegal character")]
    IllegalCharacter,
    #[error("literal not terminated")]
    UnterminatedString,
    #[error("invalid escape sequence {0}")]
    InvalidEscape(String),
    #[error("comment not terminated")]
    UnterminatedComment,
}

/// All tokens of the Blueprint language
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(error = LexError)]
pub enum Token {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Ident(String),

    /// Digits as written; the parser checks the range
    #[regex(r"[0-9]+", |lex| lex.slice().to_owned())]
    Int(String),

    /// A quoted or raw string, already unquoted
    #[token("\"", lex_string)]
    #[token("`", lex_raw_string)]
    String(String),

    /// `// ...` including the slashes, without the newline
    #[regex(r"//[^\n]*", |lex| lex.slice().trim_end_matches('\r').to_owned())]
    LineComment(String),

    /// `/* ... */` including the delimiters
    #[token("/*", lex_block_comment)]
    BlockComment(String),

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(":")]
    Colon,
    #[token("=")]
    Equals,
    #[token("+=")]
    PlusEquals,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token(",")]
    Comma,
}

fn lex_string(lex: &mut Lexer<Token>) -> Result<String, LexError> {
    let rest = lex.remainder();
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match c {
            '\n' => break,
            '\\' if !escaped => escaped = true,
            '"' if !escaped => {
                lex.bump(i + 1);
                return strings::unquote(lex.slice());
            }
            _ => escaped = false,
        }
    }
    lex.bump(rest.find('\n').unwrap_or(rest.len()));
    Err(LexError::UnterminatedString)
}

fn lex_raw_string(lex: &mut Lexer<Token>) -> Result<String, LexError> {
    let rest = lex.remainder();
    match rest.find('`') {
        Some(end) => {
            lex.bump(end + 1);
            Ok(rest[..end].replace('\r', ""))
        }
        None => {
            lex.bump(rest.len());
            Err(LexError::UnterminatedString)
        }
    }
}

fn lex_block_comment(lex: &mut Lexer<Token>) -> Result<String, LexError> {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(lex.slice().to_owned())
        }
        None => {
            lex.bump(rest.len());
            Err(LexError::UnterminatedComment)
        }
    }
}

impl Token {
    /// Check if this token is a comment
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment(_) | Token::BlockComment(_))
    }

    /// Short human description used in "expected ..., found ..." messages
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier {name}"),
            Token::Int(digits) => format!("int {digits}"),
            Token::String(value) => format!("string {}", strings::quote(value)),
            Token::LineComment(_) | Token::BlockComment(_) => "comment".to_string(),
            other => format!("{other}"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Ident(name) => name.as_str(),
            Token::Int(digits) => digits.as_str(),
            Token::String(value) => return f.write_str(&strings::quote(value)),
            Token::LineComment(text) | Token::BlockComment(text) => text.as_str(),
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Colon => ":",
            Token::Equals => "=",
            Token::PlusEquals => "+=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Comma => ",",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Result<Token, LexError>> {
        Token::lexer(source).collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            lex("{ } [ ] ( ) : = += + - ,"),
            vec![
                Ok(Token::LBrace),
                Ok(Token::RBrace),
                Ok(Token::LBracket),
                Ok(Token::RBracket),
                Ok(Token::LParen),
                Ok(Token::RParen),
                Ok(Token::Colon),
                Ok(Token::Equals),
                Ok(Token::PlusEquals),
                Ok(Token::Plus),
                Ok(Token::Minus),
                Ok(Token::Comma),
            ]
        );
    }

    #[test]
    fn test_identifiers_and_ints() {
        assert_eq!(
            lex("cc_library srcs2 42"),
            vec![
                Ok(Token::Ident("cc_library".into())),
                Ok(Token::Ident("srcs2".into())),
                Ok(Token::Int("42".into())),
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            lex(r#""a\"b" `raw\n`"#),
            vec![
                Ok(Token::String("a\"b".into())),
                Ok(Token::String("raw\\n".into())),
            ]
        );
    }

    #[test]
    fn test_unterminated_string_recovers_at_newline() {
        assert_eq!(
            lex("\"abc\nx"),
            vec![Err(LexError::UnterminatedString), Ok(Token::Ident("x".into()))]
        );
    }

    #[test]
    fn test_bad_escape() {
        assert_eq!(
            lex(r#""\q""#),
            vec![Err(LexError::InvalidEscape("\\q".into()))]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            lex("// line\n/* block\n more */ x"),
            vec![
                Ok(Token::LineComment("// line".into())),
                Ok(Token::BlockComment("/* block\n more */".into())),
                Ok(Token::Ident("x".into())),
            ]
        );
        assert_eq!(lex("/* open"), vec![Err(LexError::UnterminatedComment)]);
    }

    #[test]
    fn test_illegal_character() {
        assert_eq!(lex("@"), vec![Err(LexError::IllegalCharacter)]);
    }

    #[test]
    fn test_token_predicates() {
        assert!(Token::LineComment("//".into()).is_comment());
        assert!(!Token::Comma.is_comment());
        assert_eq!(Token::PlusEquals.describe(), "+=");
        assert_eq!(Token::Ident("foo".into()).describe(), "identifier foo");
    }
}
