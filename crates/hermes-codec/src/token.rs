//! Restricted literal reader.
//!
//! Recognizes numbers, double-quoted strings and symbol-like words. Nothing
//! is evaluated; text that fits none of the shapes is read as a plain string.

/// A lexical reading of one argument's text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Integer(i64),
    Float(f64),
    Quoted(String),
    Symbol(String),
    Plain(String),
}

/// Reads `text` as a single literal.
///
/// Returns the reason when the text starts like a literal but is not one.
pub(crate) fn read(text: &str) -> Result<Token, String> {
    if text.starts_with('"') {
        return read_quoted(text);
    }
    if let Some(token) = read_number(text)? {
        return Ok(token);
    }
    if is_symbol(text) {
        return Ok(Token::Symbol(text.to_string()));
    }
    Ok(Token::Plain(text.to_string()))
}

/// Returns `true` if `text` is a bare symbol-like word.
pub(crate) fn is_symbol(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Renders `text` as a quoted literal.
pub(crate) fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn read_quoted(text: &str) -> Result<Token, String> {
    let mut out = String::new();
    let mut chars = text[1..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => out.push(escaped),
                None => return Err("unterminated string literal".to_string()),
            },
            '"' => {
                let rest = &text[1 + i + 1..];
                if !rest.is_empty() {
                    return Err(format!("unexpected text after string literal: '{rest}'"));
                }
                return Ok(Token::Quoted(out));
            }
            other => out.push(other),
        }
    }
    Err("unterminated string literal".to_string())
}

/// Reads `[+-]?digits(.digits)?([eE][+-]?digits)?`.
///
/// `Ok(None)` means the text is not numeric at all.
fn read_number(text: &str) -> Result<Option<Token>, String> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }
    let int_digits = count_digits(&bytes[pos..]);
    if int_digits == 0 {
        return Ok(None);
    }
    pos += int_digits;

    let mut fractional = false;
    if bytes.get(pos) == Some(&b'.') {
        let digits = count_digits(&bytes[pos + 1..]);
        if digits == 0 {
            return Ok(None);
        }
        pos += 1 + digits;
        fractional = true;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let digits = count_digits(&bytes[exp..]);
        if digits == 0 {
            return Ok(None);
        }
        pos = exp + digits;
        fractional = true;
    }

    if pos != bytes.len() {
        return Ok(None);
    }

    if !fractional {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Some(Token::Integer(i)));
        }
    }

    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Some(Token::Float(f))),
        Ok(_) => Err("number out of range".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(read("42"), Ok(Token::Integer(42)));
        assert_eq!(read("-7"), Ok(Token::Integer(-7)));
        assert_eq!(read("+3"), Ok(Token::Integer(3)));
        assert_eq!(read("1.5"), Ok(Token::Float(1.5)));
        assert_eq!(read("2e3"), Ok(Token::Float(2000.0)));
        assert_eq!(read("1.5E-1"), Ok(Token::Float(0.15)));
    }

    #[test]
    fn test_integer_overflow_widens() {
        assert_eq!(read("99999999999999999999"), Ok(Token::Float(1e20)));
    }

    #[test]
    fn test_non_finite_is_malformed() {
        assert!(read("1e999").is_err());
    }

    #[test]
    fn test_almost_numbers_are_plain() {
        assert_eq!(read("1."), Ok(Token::Plain("1.".into())));
        assert_eq!(read(".5"), Ok(Token::Plain(".5".into())));
        assert_eq!(read("12abc"), Ok(Token::Plain("12abc".into())));
        assert_eq!(read("-"), Ok(Token::Plain("-".into())));
        assert_eq!(read("1e"), Ok(Token::Plain("1e".into())));
    }

    #[test]
    fn test_quoted() {
        assert_eq!(read(r#""hello world""#), Ok(Token::Quoted("hello world".into())));
        assert_eq!(read(r#""a\"b\\c""#), Ok(Token::Quoted(r#"a"b\c"#.into())));
        assert_eq!(read(r#""""#), Ok(Token::Quoted(String::new())));
        assert!(read(r#""open"#).is_err());
        assert!(read(r#""a"b"#).is_err());
        assert!(read(r#""trailing\"#).is_err());
    }

    #[test]
    fn test_symbols_and_plain() {
        assert_eq!(read("abc"), Ok(Token::Symbol("abc".into())));
        assert_eq!(read("_x-1"), Ok(Token::Symbol("_x-1".into())));
        assert_eq!(read("a b"), Ok(Token::Plain("a b".into())));
        assert_eq!(read(""), Ok(Token::Plain(String::new())));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(read(&quote(r#"a"b\c"#)), Ok(Token::Quoted(r#"a"b\c"#.into())));
    }
}
