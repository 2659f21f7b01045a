//! Percent-escaping of path segments and query components.

use std::borrow::Cow;
use std::string::FromUtf8Error;

/// Percent-decodes one path segment or query component.
///
/// With `plus_as_space`, a literal `+` is read as a space first, as in
/// `application/x-www-form-urlencoded` query strings.
pub fn decode_component(raw: &str, plus_as_space: bool) -> Result<String, FromUtf8Error> {
    let raw: Cow<'_, str> = if plus_as_space && raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    urlencoding::decode(&raw).map(Cow::into_owned)
}

/// Percent-encodes everything outside the unreserved set (`A-Z a-z 0-9 - . _ ~`).
pub fn encode_component(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}
