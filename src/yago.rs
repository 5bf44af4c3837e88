//! YAGO-style tab-separated facts.
//!
//! A row is `id<TAB>subject<TAB>predicate<TAB>object[<TAB>literal]`. The id
//! is not stored. When the literal field is present and non-blank it holds a
//! number that replaces the object; the object term is then never parsed.

use crate::error::ImportError;
use crate::graph::Triple;
use crate::import::ImportResult;
use crate::term::{numeric_literal, parse_term};

/// Convert one row into a triple. Blank rows yield `None`.
pub fn fact_triple(line: &str, confidence: f64) -> ImportResult<Option<Triple>> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.splitn(5, '\t').collect();
    if fields.len() < 4 {
        return Err(ImportError::MalformedRow {
            found: fields.len(),
        });
    }

    let subject = parse_term(fields[1])?;
    let predicate = parse_term(fields[2])?;
    let object = match fields.get(4).filter(|literal| !literal.trim().is_empty()) {
        Some(literal) => numeric_literal(literal)?,
        None => parse_term(fields[3])?,
    };

    Ok(Some(
        Triple::new(subject, predicate, object).with_confidence(confidence),
    ))
}
