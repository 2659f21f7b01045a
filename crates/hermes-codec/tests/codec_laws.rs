//! Property tests: encoding is inverted by decoding.

use hermes_codec::{ArgumentCodec, DefaultCodec, Slot};
use hermes_core::{TypeSpec, Value};
use proptest::prelude::*;

fn finite_float() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |f| f.is_finite())
}

/// A value together with a specializer it satisfies.
fn typed_value() -> impl Strategy<Value = (Value, TypeSpec)> {
    prop_oneof![
        any::<i64>().prop_map(|i| (Value::Integer(i), TypeSpec::Any)),
        any::<i64>().prop_map(|i| (Value::Integer(i), TypeSpec::Integer)),
        any::<i64>().prop_map(|i| (Value::Integer(i), TypeSpec::Number)),
        finite_float().prop_map(|f| (Value::Float(f), TypeSpec::Any)),
        finite_float().prop_map(|f| (Value::Float(f), TypeSpec::Float)),
        ".*".prop_map(|s| (Value::String(s), TypeSpec::Any)),
        ".*".prop_map(|s| (Value::String(s), TypeSpec::String)),
        "[a-zA-Z_][a-zA-Z0-9_-]{0,12}".prop_map(|s| (Value::Symbol(s), TypeSpec::Any)),
        "[a-zA-Z_][a-zA-Z0-9_-]{0,12}".prop_map(|s| (Value::Symbol(s), TypeSpec::Symbol)),
    ]
}

proptest! {
    #[test]
    fn positional_decode_inverts_encode((value, spec) in typed_value(), index in 0usize..8) {
        let slot = Slot::Positional(index);
        let raw = DefaultCodec.encode(&value, slot, &spec).unwrap();
        prop_assert_eq!(DefaultCodec.decode(&raw, slot, &spec).unwrap(), value);
    }

    #[test]
    fn keyword_decode_inverts_encode((value, spec) in typed_value()) {
        let slot = Slot::Keyword("k");
        let raw = DefaultCodec.encode(&value, slot, &spec).unwrap();
        prop_assert_eq!(DefaultCodec.decode(&raw, slot, &spec).unwrap(), value);
    }

    #[test]
    fn encoded_text_has_no_reserved_characters((value, spec) in typed_value()) {
        let raw = DefaultCodec.encode(&value, Slot::Positional(0), &spec).unwrap();
        prop_assert!(raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-._~%".contains(c)));
    }

    #[test]
    fn decoding_never_panics(raw in ".*") {
        let _ = DefaultCodec.decode(&raw, Slot::Positional(0), &TypeSpec::Any);
        let _ = DefaultCodec.decode(&raw, Slot::Keyword("k"), &TypeSpec::Number);
    }
}
