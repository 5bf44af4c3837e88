//! Wikidata JSON dump records and their conversion into triples.
//!
//! A dump is one JSON array written one entity per line:
//!
//! ```text
//! [
//! {"id":"Q42","type":"item","labels":{...},"claims":{...}},
//! {"id":"P31","type":"property",...}
//! ]
//! ```
//!
//! [`parse_line`] turns one such line into an [`EntityRecord`];
//! [`entity::entity_triples`] flattens a record; [`snak::process_snak`]
//! encodes a single claim value.

pub mod entity;
pub mod snak;

use std::collections::{BTreeMap, HashMap};

use serde::de::{DeserializeOwned, Deserializer, IgnoredAny};
use serde::Deserialize;

use crate::error::ImportError;
use crate::import::ImportResult;

pub use entity::entity_triples;
pub use snak::{process_snak, SnakValue};

/// One entity of a Wikidata dump. Fields the importer ignores are skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    /// `item` or `property`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub labels: HashMap<String, LanguageValue>,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub descriptions: HashMap<String, LanguageValue>,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub aliases: HashMap<String, Vec<LanguageValue>>,
    /// Property id → claims. Ordered by property id.
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub claims: BTreeMap<String, Vec<Claim>>,
}

/// A label, description or alias in one language.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageValue {
    pub value: String,
}

/// One statement about an entity.
#[derive(Debug, Clone, Deserialize)]
pub struct Claim {
    /// `preferred`, `normal` or `deprecated`.
    #[serde(default = "normal_rank")]
    pub rank: String,
    pub mainsnak: Snak,
}

impl Claim {
    /// Deprecated claims are never imported.
    pub fn is_deprecated(&self) -> bool {
        self.rank == "deprecated"
    }
}

/// A single value assertion.
#[derive(Debug, Clone, Deserialize)]
pub struct Snak {
    /// `value`, `somevalue` or `novalue`.
    pub snaktype: String,
    #[serde(default)]
    pub datatype: Option<String>,
    #[serde(default)]
    pub datavalue: Option<DataValue>,
}

/// The typed payload of a `value` snak.
#[derive(Debug, Clone, Deserialize)]
pub struct DataValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: serde_json::Value,
}

fn normal_rank() -> String {
    "normal".to_string()
}

/// Wikibase writes empty maps as `[]`; accept both.
fn map_or_empty_list<'de, D, M>(deserializer: D) -> Result<M, D::Error>
where
    D: Deserializer<'de>,
    M: DeserializeOwned + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrList<M> {
        Map(M),
        List(Vec<IgnoredAny>),
    }

    Ok(match MapOrList::<M>::deserialize(deserializer)? {
        MapOrList::Map(map) => map,
        MapOrList::List(_) => M::default(),
    })
}

/// Parse one line of a dump.
///
/// Trailing commas and whitespace are stripped. Lines that do not start with
/// `{` (the array brackets, blank lines) yield `None`.
pub fn parse_line(line: &str) -> ImportResult<Option<EntityRecord>> {
    let line = line.trim_end_matches(['\r', '\n', ' ', '\t', ',']);
    if !line.starts_with('{') {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| ImportError::Json { source: e })
}
