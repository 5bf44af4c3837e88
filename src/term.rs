//! Flat object encoding shared by the importers and the graph view.
//!
//! Every stored object is a single string. A leading [`LITERAL_TAG`] marks a
//! literal payload; anything else is the identifier of another subject.
//! Importers guarantee that entity identifiers never start with the tag.

use crate::error::TermError;

/// Result type for term operations.
pub type TermResult<T> = std::result::Result<T, TermError>;

/// Prefix that marks an object as a literal payload.
pub const LITERAL_TAG: char = ':';

/// A decoded object value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Literal payload with the tag stripped.
    Literal(String),
    /// Identifier of another subject.
    Reference(String),
}

impl Value {
    /// Encode back into the flat stored form.
    pub fn encode(&self) -> String {
        match self {
            Value::Literal(text) => encode_literal(text),
            Value::Reference(subject) => subject.clone(),
        }
    }
}

/// Tag `text` as a literal payload.
pub fn encode_literal(text: &str) -> String {
    let mut flat = String::with_capacity(text.len() + 1);
    flat.push(LITERAL_TAG);
    flat.push_str(text);
    flat
}

/// Decode a flat object by inspecting its tag.
pub fn decode(flat: &str) -> Value {
    match flat.strip_prefix(LITERAL_TAG) {
        Some(payload) => Value::Literal(payload.to_string()),
        None => Value::Reference(flat.to_string()),
    }
}

/// Check that `id` can be stored as an entity reference.
pub fn reference(id: &str) -> TermResult<&str> {
    if id.is_empty() {
        return Err(malformed(id, "empty entity identifier"));
    }
    if id.starts_with(LITERAL_TAG) {
        return Err(malformed(id, "entity identifier starts with the literal tag"));
    }
    Ok(id)
}

/// Parse one quoted term from a tabular fact row into its flat form.
///
/// `<Douglas_Adams>` becomes the reference `Douglas_Adams`. `"a ""b"""`
/// becomes the literal `:a "b"`; text after the last quote is dropped.
pub fn parse_term(raw: &str) -> TermResult<String> {
    let term = raw.trim();
    match term.chars().next() {
        Some('<') => {
            let mut chars = term.chars();
            chars.next();
            if chars.next_back().is_none() {
                return Err(malformed(term, "unterminated entity reference"));
            }
            reference(chars.as_str()).map(str::to_string)
        }
        Some('"') => {
            let close = term.rfind('"').unwrap_or(0);
            let inner = if close > 0 { &term[1..close] } else { "" };
            let text = inner.replace("\"\"", "\"").replace("\\\\", "\\");
            Ok(encode_literal(&text))
        }
        Some(_) => Err(malformed(term, "expected `<` or `\"`")),
        None => Err(malformed(term, "empty term")),
    }
}

/// Turn the numeric literal field of a fact row into a tagged literal.
///
/// Text containing `.`, `e` or `E` is read as a float and written in the
/// exponent style of the YAGO tooling: `1e+16`, `1e-05`, `1500.0`. Anything
/// else must be an integer of any width; it keeps its digits with the `+`
/// sign and leading zeros removed.
pub fn numeric_literal(raw: &str) -> TermResult<String> {
    let text = raw.trim();
    if text.contains(['.', 'e', 'E']) {
        let value: f64 = text
            .parse()
            .map_err(|e| malformed(text, &format!("invalid float literal: {e}")))?;
        Ok(encode_literal(&format_float(value)))
    } else {
        let integer = canonical_integer(text)
            .ok_or_else(|| malformed(text, "invalid integer literal"))?;
        Ok(encode_literal(&integer))
    }
}

fn canonical_integer(text: &str) -> Option<String> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let significant = digits.trim_start_matches('0');
    Some(match significant {
        "" => "0".to_string(),
        _ if negative => format!("-{significant}"),
        _ => significant.to_string(),
    })
}

/// Shortest round-trip digits, positional for exponents in `-4..16` and
/// `d.ddde±XX` otherwise.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if value.is_infinite() {
        return format!("{sign}inf");
    }

    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits = mantissa.replace('.', "");

    if !(-4..16).contains(&exponent) {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{mantissa}e{exp_sign}{:02}", exponent.abs());
    }
    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("{sign}0.{zeros}{digits}");
    }
    let point = exponent as usize + 1;
    if digits.len() <= point {
        let zeros = "0".repeat(point - digits.len());
        format!("{sign}{digits}{zeros}.0")
    } else {
        format!("{sign}{}.{}", &digits[..point], &digits[point..])
    }
}

fn malformed(term: &str, reason: &str) -> TermError {
    TermError::Malformed {
        term: term.to_string(),
        reason: reason.to_string(),
    }
}
