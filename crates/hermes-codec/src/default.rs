//! The default argument codec.

use hermes_core::{TypeSpec, Value};

use crate::escape::{decode_component, encode_component};
use crate::token::{self, Token};
use crate::{ArgumentCodec, ArgumentError, EncodingError, Slot};

/// Codec for numbers, strings and symbols.
///
/// Decoding percent-unescapes the text and reads it as a single literal:
///
/// | Text | Value |
/// |---|---|
/// | `42`, `-7` | `Integer` |
/// | `1.5`, `2e3`, integer overflow | `Float` |
/// | `"a b"` (quoted, with `\` escapes) | `String` |
/// | `abc`, `_x-1` | `Symbol` |
/// | anything else | `String` |
///
/// The value must then satisfy the slot's [`TypeSpec`]. Two conversions are
/// applied first: a `Float` slot widens integers, and a `String` slot takes any
/// unquoted token as its literal text.
///
/// # Example
///
/// ```rust
/// use hermes_codec::{ArgumentCodec, DefaultCodec, Slot};
/// use hermes_core::{TypeSpec, Value};
///
/// let codec = DefaultCodec;
/// let slot = Slot::Positional(0);
///
/// assert_eq!(codec.decode("42", slot, &TypeSpec::Integer).unwrap(), Value::Integer(42));
/// assert!(codec.decode("abc", slot, &TypeSpec::Integer).is_err());
///
/// let raw = codec.encode(&Value::string("a b"), slot, &TypeSpec::Any).unwrap();
/// assert_eq!(raw, "a%20b");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCodec;

impl DefaultCodec {
    fn read(text: &str, slot: Slot<'_>) -> Result<Token, ArgumentError> {
        token::read(text).map_err(|reason| ArgumentError::Malformed {
            slot: slot.to_string(),
            text: text.to_string(),
            reason,
        })
    }

    fn conform(token: Token, text: &str, slot: Slot<'_>, spec: &TypeSpec) -> Result<Value, ArgumentError> {
        let value = match (spec, token) {
            (TypeSpec::String, Token::Quoted(s)) => Value::String(s),
            (TypeSpec::String, _) => Value::String(text.to_string()),
            (TypeSpec::Float, Token::Integer(i)) => Value::Float(i as f64),
            (_, token) => into_value(token),
        };

        if spec.accepts(&value) {
            Ok(value)
        } else {
            Err(ArgumentError::TypeMismatch {
                slot: slot.to_string(),
                expected: spec.to_string(),
                found: value.type_name().to_string(),
            })
        }
    }

    /// Decodes already-unescaped text, or `None` if it does not decode.
    fn reads_back(text: &str, spec: &TypeSpec) -> Option<Value> {
        let slot = Slot::Positional(0);
        let token = Self::read(text, slot).ok()?;
        Self::conform(token, text, slot, spec).ok()
    }

    fn literal(value: &Value, slot: Slot<'_>, spec: &TypeSpec) -> Result<String, EncodingError> {
        let unencodable = |reason: &str| EncodingError::unencodable(slot, value, reason);

        match value {
            Value::Integer(i) => Ok(i.to_string()),
            Value::Float(f) if f.is_finite() => Ok(format!("{f:?}")),
            Value::Float(_) => Err(unencodable("non-finite float")),
            Value::Symbol(name) => {
                if Self::reads_back(name, spec).as_ref() == Some(value) {
                    Ok(name.clone())
                } else {
                    Err(unencodable("symbol name is not a bare word"))
                }
            }
            Value::String(text) => {
                if !text.is_empty() && Self::reads_back(text, spec).as_ref() == Some(value) {
                    Ok(text.clone())
                } else {
                    Ok(token::quote(text))
                }
            }
            Value::Object { .. } => Err(unencodable("objects need a resource codec")),
        }
    }
}

fn into_value(token: Token) -> Value {
    match token {
        Token::Integer(i) => Value::Integer(i),
        Token::Float(f) => Value::Float(f),
        Token::Quoted(s) | Token::Plain(s) => Value::String(s),
        Token::Symbol(s) => Value::Symbol(s),
    }
}

impl ArgumentCodec for DefaultCodec {
    fn decode(&self, raw: &str, slot: Slot<'_>, spec: &TypeSpec) -> Result<Value, ArgumentError> {
        let text = decode_component(raw, slot.is_keyword()).map_err(|_| {
            ArgumentError::InvalidEncoding {
                slot: slot.to_string(),
            }
        })?;
        let token = Self::read(&text, slot)?;
        Self::conform(token, &text, slot, spec)
    }

    fn encode(&self, value: &Value, slot: Slot<'_>, spec: &TypeSpec) -> Result<String, EncodingError> {
        if !spec.accepts(value) {
            return Err(EncodingError::TypeMismatch {
                slot: slot.to_string(),
                value: value.to_string(),
                expected: spec.to_string(),
            });
        }
        Self::literal(value, slot, spec).map(|text| encode_component(&text))
    }

    fn name(&self) -> &'static str {
        "default"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: Slot<'static> = Slot::Positional(0);

    fn decode(raw: &str, spec: &TypeSpec) -> Result<Value, ArgumentError> {
        DefaultCodec.decode(raw, P0, spec)
    }

    fn encode(value: &Value, spec: &TypeSpec) -> Result<String, EncodingError> {
        DefaultCodec.encode(value, P0, spec)
    }

    #[test]
    fn test_decode_untyped() {
        assert_eq!(decode("42", &TypeSpec::Any).unwrap(), Value::Integer(42));
        assert_eq!(decode("4.5", &TypeSpec::Any).unwrap(), Value::Float(4.5));
        assert_eq!(decode("abc", &TypeSpec::Any).unwrap(), Value::symbol("abc"));
        assert_eq!(decode("%22x%20y%22", &TypeSpec::Any).unwrap(), Value::string("x y"));
        assert_eq!(decode("a%20b", &TypeSpec::Any).unwrap(), Value::string("a b"));
    }

    #[test]
    fn test_decode_typed() {
        assert_eq!(decode("42", &TypeSpec::Number).unwrap(), Value::Integer(42));
        assert_eq!(decode("42", &TypeSpec::Float).unwrap(), Value::Float(42.0));
        assert_eq!(decode("abc", &TypeSpec::Symbol).unwrap(), Value::symbol("abc"));
        assert_eq!(decode("abc", &TypeSpec::String).unwrap(), Value::string("abc"));
        assert_eq!(decode("42", &TypeSpec::String).unwrap(), Value::string("42"));
        assert_eq!(decode("%22q%22", &TypeSpec::String).unwrap(), Value::string("q"));
    }

    #[test]
    fn test_decode_type_mismatch() {
        let err = decode("abc", &TypeSpec::Integer).unwrap_err();
        assert!(matches!(err, ArgumentError::TypeMismatch { .. }));
        assert_eq!(err.slot(), "positional argument 0");

        assert!(decode("1.5", &TypeSpec::Integer).is_err());
        assert!(decode("42", &TypeSpec::Object("user".into())).is_err());
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode("%22open", &TypeSpec::Any).unwrap_err();
        assert!(matches!(err, ArgumentError::Malformed { .. }));
        assert!(matches!(
            decode("%FF", &TypeSpec::Any).unwrap_err(),
            ArgumentError::InvalidEncoding { .. }
        ));
    }

    #[test]
    fn test_keyword_plus_is_space() {
        let value = DefaultCodec
            .decode("a+b", Slot::Keyword("q"), &TypeSpec::String)
            .unwrap();
        assert_eq!(value, Value::string("a b"));

        let value = DefaultCodec
            .decode("a+b", Slot::Positional(0), &TypeSpec::String)
            .unwrap();
        assert_eq!(value, Value::string("a+b"));
    }

    #[test]
    fn test_encode_forms() {
        assert_eq!(encode(&Value::Integer(-3), &TypeSpec::Any).unwrap(), "-3");
        assert_eq!(encode(&Value::Float(2.0), &TypeSpec::Any).unwrap(), "2.0");
        assert_eq!(encode(&Value::symbol("abc"), &TypeSpec::Any).unwrap(), "abc");
        assert_eq!(encode(&Value::string("abc"), &TypeSpec::String).unwrap(), "abc");
        assert_eq!(encode(&Value::string("abc"), &TypeSpec::Any).unwrap(), "%22abc%22");
        assert_eq!(encode(&Value::string("42"), &TypeSpec::Any).unwrap(), "%2242%22");
        assert_eq!(encode(&Value::string(""), &TypeSpec::String).unwrap(), "%22%22");
        assert_eq!(encode(&Value::string("*"), &TypeSpec::Any).unwrap(), "%2A");
    }

    #[test]
    fn test_encode_rejects() {
        assert!(matches!(
            encode(&Value::Float(f64::NAN), &TypeSpec::Any).unwrap_err(),
            EncodingError::Unencodable { .. }
        ));
        assert!(matches!(
            encode(&Value::string("x"), &TypeSpec::Integer).unwrap_err(),
            EncodingError::TypeMismatch { .. }
        ));
        assert!(encode(&Value::symbol("not a word"), &TypeSpec::Any).is_err());
        assert!(encode(&Value::object("user", serde_json::json!(1)), &TypeSpec::Any).is_err());
    }

    #[test]
    fn test_encode_decode_inverse() {
        let cases = [
            (Value::Integer(42), TypeSpec::Integer),
            (Value::Float(0.1), TypeSpec::Float),
            (Value::Float(1e300), TypeSpec::Number),
            (Value::string("he said \"hi\""), TypeSpec::Any),
            (Value::string("back\\slash"), TypeSpec::String),
            (Value::string("+1"), TypeSpec::Any),
            (Value::symbol("widget"), TypeSpec::Symbol),
        ];
        for (value, spec) in cases {
            let raw = encode(&value, &spec).unwrap();
            assert_eq!(decode(&raw, &spec).unwrap(), value, "raw={raw}");
        }
    }
}
