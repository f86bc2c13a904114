//! String literal escapes
//!
//! Blueprint strings use Go escape syntax. [`unquote`] decodes a double-quoted literal
//! and [`quote`] produces the canonical literal the printer writes.
//!
//! Byte escapes (`\xNN`, `\ooo`) must stay within ASCII: string values are Rust
//! `String`s and cannot hold lone non-UTF-8 bytes.

use super::tokens::LexError;
use std::fmt::Write;

/// Decode a double-quoted literal, quotes included
pub fn unquote(literal: &str) -> Result<String, LexError> {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or(LexError::UnterminatedString)?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            return Err(LexError::InvalidEscape("\\".to_string()));
        };
        let decoded = match escape {
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0b}',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'x' => byte_escape(&mut chars, 'x', 2, 16)?,
            '0'..='7' => {
                let rest: String = chars.by_ref().take(2).collect();
                let digits = format!("{escape}{rest}");
                ascii_from_digits(&digits, 8, &format!("\\{digits}"))?
            }
            'u' => unicode_escape(&mut chars, 'u', 4)?,
            'U' => unicode_escape(&mut chars, 'U', 8)?,
            other => return Err(LexError::InvalidEscape(format!("\\{other}"))),
        };
        out.push(decoded);
    }
    Ok(out)
}

fn take_digits(chars: &mut std::str::Chars<'_>, count: usize) -> String {
    chars.by_ref().take(count).collect()
}

fn byte_escape(
    chars: &mut std::str::Chars<'_>,
    letter: char,
    count: usize,
    radix: u32,
) -> Result<char, LexError> {
    let digits = take_digits(chars, count);
    ascii_from_digits(&digits, radix, &format!("\\{letter}{digits}"))
}

fn ascii_from_digits(digits: &str, radix: u32, escape: &str) -> Result<char, LexError> {
    let invalid = || LexError::InvalidEscape(escape.to_string());
    if digits.len() < 2 || !digits.chars().all(|d| d.is_digit(radix)) {
        return Err(invalid());
    }
    match u8::from_str_radix(digits, radix) {
        Ok(byte) if byte.is_ascii() => Ok(char::from(byte)),
        _ => Err(invalid()),
    }
}

fn unicode_escape(
    chars: &mut std::str::Chars<'_>,
    letter: char,
    count: usize,
) -> Result<char, LexError> {
    let digits = take_digits(chars, count);
    let invalid = || LexError::InvalidEscape(format!("\\{letter}{digits}"));
    if digits.len() != count || !digits.chars().all(|d| d.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(invalid)
}

/// Canonical double-quoted literal for `value`
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_control() => {
                if (c as u32) <= 0xffff {
                    let _ = write!(out, "\\u{:04x}", c as u32);
                } else {
                    let _ = write!(out, "\\U{:08x}", c as u32);
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_plain() {
        assert_eq!(unquote(r#""abc""#).unwrap(), "abc");
        assert_eq!(unquote(r#""""#).unwrap(), "");
    }

    #[test]
    fn test_unquote_escapes() {
        assert_eq!(unquote(r#""a\"b\\c\n""#).unwrap(), "a\"b\\c\n");
        assert_eq!(unquote(r#""\x41\101é""#).unwrap(), "AAé");
        assert_eq!(unquote(r#""\U0001F600""#).unwrap(), "\u{1F600}");
    }

    #[test]
    fn test_unquote_rejects_bad_escapes() {
        assert_eq!(
            unquote(r#""\q""#),
            Err(LexError::InvalidEscape("\\q".to_string()))
        );
        assert!(unquote(r#""\x4""#).is_err());
        assert!(unquote(r#""\xff""#).is_err());
        assert!(unquote(r#""\u12""#).is_err());
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("abc"), r#""abc""#);
        assert_eq!(quote("a\"b\\c\n\t"), r#""a\"b\\c\n\t""#);
        assert_eq!(quote("\u{1}"), r#""\x01""#);
        assert_eq!(quote("é'"), "\"é'\"");
    }

    #[test]
    fn test_quote_then_unquote() {
        for value in ["", "plain", "tab\there", "quote\"d", "back\\slash", "\u{7}bell"] {
            assert_eq!(unquote(&quote(value)).unwrap(), value);
        }
    }
}
