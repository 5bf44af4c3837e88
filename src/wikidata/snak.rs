//! Encoding of a single snak into a literal payload.
//!
//! Payloads are JSON scalars, JSON arrays, or one of two reference-like
//! shapes: `@Q42`/`@P31` for entity and property values and `#<url>` for
//! links. Datatypes without a dedicated encoding keep all their data as
//! `[datatype, value type, value]`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::json;

use crate::error::ImportError;
use crate::import::ImportResult;

use super::Snak;

/// Base URL for files named by `commonsMedia` values.
pub const COMMONS_FILE_URL: &str = "https://commons.wikimedia.org/wiki/File:";

/// Everything except unreserved characters and `/` is escaped.
const COMMONS_FILE_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// The outcome of one snak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnakValue {
    /// A concrete value, already encoded as a payload.
    Value(String),
    /// The property has some value, but it is unknown.
    SomeValue,
    /// The property explicitly has no value.
    NoValue,
}

impl SnakValue {
    /// The literal payload stored for this outcome.
    pub fn payload(&self) -> &str {
        match self {
            SnakValue::Value(payload) => payload,
            SnakValue::SomeValue => "true",
            SnakValue::NoValue => "null",
        }
    }
}

/// Encode a snak. Unknown datatypes are not an error; unknown snak types are.
pub fn process_snak(snak: &Snak) -> ImportResult<SnakValue> {
    match snak.snaktype.as_str() {
        "value" => encode_value(snak).map(SnakValue::Value),
        "somevalue" => Ok(SnakValue::SomeValue),
        "novalue" => Ok(SnakValue::NoValue),
        other => Err(ImportError::UnknownSnakType {
            snaktype: other.to_string(),
        }),
    }
}

fn encode_value(snak: &Snak) -> ImportResult<String> {
    let datatype = snak
        .datatype
        .as_deref()
        .ok_or_else(|| malformed("value snak without datatype".into()))?;
    let datavalue = snak
        .datavalue
        .as_ref()
        .ok_or_else(|| malformed(format!("{datatype} snak without datavalue")))?;
    let value = &datavalue.value;

    let payload = match datatype {
        "string" => json_string(text(datatype, value)?),
        "wikibase-item" => format!("@Q{}", numeric_id(datatype, value)?),
        "wikibase-property" => format!("@P{}", numeric_id(datatype, value)?),
        "url" => format!("#{}", text(datatype, value)?),
        "commonsMedia" => format!(
            "#{COMMONS_FILE_URL}{}",
            utf8_percent_encode(text(datatype, value)?, COMMONS_FILE_NAME)
        ),
        "monolingualtext" => {
            let inner = value
                .get("text")
                .ok_or_else(|| malformed("monolingualtext value without text".into()))?;
            json_string(text(datatype, inner)?)
        }
        _ => json!([datatype, datavalue.kind, value]).to_string(),
    };
    Ok(payload)
}

fn text<'v>(datatype: &str, value: &'v serde_json::Value) -> ImportResult<&'v str> {
    value
        .as_str()
        .ok_or_else(|| malformed(format!("{datatype} value is not a string: {value}")))
}

fn numeric_id(datatype: &str, value: &serde_json::Value) -> ImportResult<u64> {
    value
        .get("numeric-id")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| malformed(format!("{datatype} value without numeric-id: {value}")))
}

fn json_string(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

fn malformed(message: String) -> ImportError {
    ImportError::MalformedSnak { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snak(raw: &str) -> Snak {
        serde_json::from_str(raw).unwrap()
    }

    fn value_snak(datatype: &str, kind: &str, value: serde_json::Value) -> Snak {
        snak(
            &json!({
                "snaktype": "value",
                "datatype": datatype,
                "datavalue": {"type": kind, "value": value},
            })
            .to_string(),
        )
    }

    fn encoded(snak: &Snak) -> String {
        match process_snak(snak).unwrap() {
            SnakValue::Value(payload) => payload,
            other => panic!("expected a value, got {other:?}"),
        }
    }

    #[test]
    fn string_is_json_quoted() {
        let s = value_snak("string", "string", json!("say \"hi\""));
        assert_eq!(encoded(&s), r#""say \"hi\"""#);
    }

    #[test]
    fn entity_references() {
        let item = value_snak(
            "wikibase-item",
            "wikibase-entityid",
            json!({"entity-type": "item", "numeric-id": 5}),
        );
        assert_eq!(encoded(&item), "@Q5");

        let property = value_snak(
            "wikibase-property",
            "wikibase-entityid",
            json!({"entity-type": "property", "numeric-id": 31}),
        );
        assert_eq!(encoded(&property), "@P31");
    }

    #[test]
    fn url_is_tagged() {
        let s = value_snak("url", "string", json!("https://example.org/a b"));
        assert_eq!(encoded(&s), "#https://example.org/a b");
    }

    #[test]
    fn commons_media_is_percent_encoded() {
        let s = value_snak("commonsMedia", "string", json!("My File.jpg"));
        assert_eq!(
            encoded(&s),
            "#https://commons.wikimedia.org/wiki/File:My%20File.jpg"
        );

        let s = value_snak("commonsMedia", "string", json!("Zürich (2010)~a/b.png"));
        assert_eq!(
            encoded(&s),
            "#https://commons.wikimedia.org/wiki/File:Z%C3%BCrich%20%282010%29~a/b.png"
        );
    }

    #[test]
    fn monolingual_text_drops_language() {
        let s = value_snak(
            "monolingualtext",
            "monolingualtext",
            json!({"text": "Douglas Adams", "language": "en"}),
        );
        assert_eq!(encoded(&s), "\"Douglas Adams\"");
    }

    #[test]
    fn unknown_datatype_keeps_everything() {
        let s = value_snak("quantity", "quantity", json!({"amount": "+42", "unit": "1"}));
        let payload: serde_json::Value = serde_json::from_str(&encoded(&s)).unwrap();
        assert_eq!(
            payload,
            json!(["quantity", "quantity", {"amount": "+42", "unit": "1"}])
        );
    }

    #[test]
    fn somevalue_and_novalue_are_outcomes() {
        let some = snak(r#"{"snaktype":"somevalue","datatype":"string"}"#);
        assert_eq!(process_snak(&some).unwrap(), SnakValue::SomeValue);
        assert_eq!(SnakValue::SomeValue.payload(), "true");

        let none = snak(r#"{"snaktype":"novalue"}"#);
        assert_eq!(process_snak(&none).unwrap(), SnakValue::NoValue);
        assert_eq!(SnakValue::NoValue.payload(), "null");
    }

    #[test]
    fn unknown_snak_type_is_an_error() {
        let s = snak(r#"{"snaktype":"bogus"}"#);
        assert!(matches!(
            process_snak(&s),
            Err(ImportError::UnknownSnakType { ref snaktype }) if snaktype == "bogus"
        ));
    }

    #[test]
    fn malformed_value_snaks() {
        let no_datavalue = snak(r#"{"snaktype":"value","datatype":"string"}"#);
        assert!(matches!(
            process_snak(&no_datavalue),
            Err(ImportError::MalformedSnak { .. })
        ));

        let wrong_shape = value_snak("wikibase-item", "wikibase-entityid", json!("Q5"));
        assert!(matches!(
            process_snak(&wrong_shape),
            Err(ImportError::MalformedSnak { .. })
        ));
    }
}
