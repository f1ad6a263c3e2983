//! Encoding values as JavaScript source expressions.
//!
//! Unlike JSON, the output is an expression evaluating to the value: object keys are only quoted
//! when they have to be, and strings are escaped so that the output can be placed inside a
//! `<script>` tag.

use crate::js;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt::{self, Write};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_$a-zA-Z][_$a-zA-Z0-9]*$").expect("regex must compile"));

/// A value which can be rendered as a source expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Literal>),
    Object(Vec<(String, Literal)>),
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if *n == 0.0 && n.is_sign_negative() => f.write_str("-0"),
            Self::Number(n) => f.write_str(&js::number(*n)),
            Self::String(s) => write_string(f, s),
            Self::Array(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Self::Object(entries) => {
                f.write_char('{')?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write_key(f, key)?;
                    write!(f, ":{value}")?;
                }
                f.write_char('}')
            }
        }
    }
}

/// Render a value as a source expression.
pub fn encode(value: &Literal) -> String {
    value.to_string()
}

/// Render a string as a quoted string literal.
pub fn quote(s: &str) -> String {
    Literal::String(s.to_string()).to_string()
}

/// Render an object key, quoting it only if it is not a valid identifier.
pub fn key(name: &str) -> String {
    if IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

fn write_key(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if IDENTIFIER.is_match(name) {
        f.write_str(name)
    } else {
        write_string(f, name)
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '<' => f.write_str("\\u003C")?,
            '>' => f.write_str("\\u003E")?,
            '/' => f.write_str("\\u002F")?,
            '\\' => f.write_str("\\\\")?,
            '\u{8}' => f.write_str("\\b")?,
            '\u{c}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{2028}' => f.write_str("\\u2028")?,
            '\u{2029}' => f.write_str("\\u2029")?,
            c if c < ' ' => write!(f, "\\u{:04X}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Literal::Null, "null")]
    #[case(Literal::Bool(true), "true")]
    #[case(Literal::Number(42.0), "42")]
    #[case(Literal::Number(-0.0), "-0")]
    #[case(Literal::Number(0.5), "0.5")]
    #[case(Literal::Number(f64::NAN), "NaN")]
    #[case(Literal::Number(f64::NEG_INFINITY), "-Infinity")]
    fn test_primitives(#[case] value: Literal, #[case] expected: &str) {
        assert_eq!(encode(&value), expected);
    }

    #[rstest]
    #[case("hello", r#""hello""#)]
    #[case(r#"say "hi""#, r#""say \"hi\"""#)]
    #[case("</script>", r#""\u003C\u002Fscript\u003E""#)]
    #[case(r"C:\pages", r#""C:\\pages""#)]
    #[case("a\nb\tc\r", r#""a\nb\tc\r""#)]
    #[case("\u{2028}\u{2029}", r#""\u2028\u2029""#)]
    #[case("\u{1}", r#""\u0001""#)]
    #[case("\u{0}1", r#""\u00001""#)]
    #[case("héllo ✓", "\"héllo ✓\"")]
    fn test_strings(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(quote(value), expected);
    }

    #[test]
    fn test_json() {
        let value = json!({
            "previewModeId": "abc",
            "previewMode-Signing": "def",
            "nested": {"list": [1, 2.5, null, true], "$ok": "x"},
            "1st": false
        });

        assert_eq!(
            encode(&value.into()),
            r#"{previewModeId:"abc","previewMode-Signing":"def",nested:{list:[1,2.5,null,true],$ok:"x"},"1st":false}"#
        );
    }

    #[test]
    fn test_key() {
        assert_eq!(key("pageModule"), "pageModule");
        assert_eq!(key("_app"), "_app");
        assert_eq!(key("content-type"), r#""content-type""#);
    }
}
