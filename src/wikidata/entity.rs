//! Flattening of one Wikidata entity into triples.

use crate::error::ImportError;
use crate::graph::Triple;
use crate::import::ImportResult;
use crate::term::{encode_literal, reference};

use super::snak::process_snak;
use super::EntityRecord;

/// `:1` for properties, `:0` for items.
pub const IS_PROPERTY: &str = ":is_property";
pub const LABEL: &str = ":label";
pub const DESCRIPTION: &str = ":description";
pub const ALIAS: &str = ":alias";

/// Flatten `entity` into triples, in a fixed order.
///
/// The order is: the property flag, the label and description in
/// `language`, its aliases, then one triple per non-deprecated claim with
/// properties ascending and claims in source order. Entity triples carry no
/// confidence.
pub fn entity_triples(entity: &EntityRecord, language: &str) -> ImportResult<Vec<Triple>> {
    let id = reference(&entity.id)?;
    let is_property = match entity.kind.as_str() {
        "item" => false,
        "property" => true,
        other => {
            return Err(ImportError::UnknownEntityType {
                id: entity.id.clone(),
                kind: other.to_string(),
            });
        }
    };

    let mut triples = vec![Triple::new(
        id,
        IS_PROPERTY,
        encode_literal(if is_property { "1" } else { "0" }),
    )];

    if let Some(label) = entity.labels.get(language) {
        triples.push(Triple::new(id, LABEL, json_literal(&label.value)));
    }
    if let Some(description) = entity.descriptions.get(language) {
        triples.push(Triple::new(id, DESCRIPTION, json_literal(&description.value)));
    }
    for alias in entity.aliases.get(language).into_iter().flatten() {
        triples.push(Triple::new(id, ALIAS, json_literal(&alias.value)));
    }

    for (property, claims) in &entity.claims {
        for claim in claims.iter().filter(|c| !c.is_deprecated()) {
            let value = process_snak(&claim.mainsnak)?;
            triples.push(Triple::new(id, property.as_str(), encode_literal(value.payload())));
        }
    }

    Ok(triples)
}

fn json_literal(text: &str) -> String {
    encode_literal(&serde_json::Value::from(text).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TermError;
    use crate::wikidata::parse_line;

    fn entity(raw: serde_json::Value) -> EntityRecord {
        parse_line(&raw.to_string()).unwrap().unwrap()
    }

    fn objects(triples: &[Triple], predicate: &str) -> Vec<String> {
        triples
            .iter()
            .filter(|t| t.predicate == predicate)
            .map(|t| t.object.clone())
            .collect()
    }

    fn item_claim(rank: &str, numeric_id: u64) -> serde_json::Value {
        serde_json::json!({
            "rank": rank,
            "mainsnak": {
                "snaktype": "value",
                "property": "P31",
                "datatype": "wikibase-item",
                "datavalue": {
                    "type": "wikibase-entityid",
                    "value": {"entity-type": "item", "numeric-id": numeric_id}
                }
            }
        })
    }

    #[test]
    fn full_entity_in_fixed_order() {
        let record = entity(serde_json::json!({
            "id": "Q42",
            "type": "item",
            "labels": {"en": {"language": "en", "value": "Douglas Adams"},
                       "de": {"language": "de", "value": "Douglas Adams (de)"}},
            "descriptions": {"en": {"language": "en", "value": "English writer"}},
            "aliases": {"en": [{"language": "en", "value": "DNA"},
                               {"language": "en", "value": "Douglas Noël Adams"}]},
            "claims": {
                "P31": [item_claim("normal", 5)],
                "P18": [{"rank": "preferred", "mainsnak": {
                    "snaktype": "value", "datatype": "commonsMedia",
                    "datavalue": {"type": "string", "value": "Douglas adams portrait.jpg"}}}]
            }
        }));

        let triples = entity_triples(&record, "en").unwrap();
        let flat: Vec<(&str, &str)> = triples
            .iter()
            .map(|t| (t.predicate.as_str(), t.object.as_str()))
            .collect();
        assert_eq!(
            flat,
            vec![
                (IS_PROPERTY, ":0"),
                (LABEL, ":\"Douglas Adams\""),
                (DESCRIPTION, ":\"English writer\""),
                (ALIAS, ":\"DNA\""),
                (ALIAS, ":\"Douglas Noël Adams\""),
                (
                    "P18",
                    ":#https://commons.wikimedia.org/wiki/File:Douglas%20adams%20portrait.jpg"
                ),
                ("P31", ":@Q5"),
            ]
        );
        assert!(triples.iter().all(|t| t.subject == "Q42" && t.confidence.is_none()));
    }

    #[test]
    fn property_flag() {
        let record = entity(serde_json::json!({"id": "P31", "type": "property"}));
        let triples = entity_triples(&record, "en").unwrap();
        assert_eq!(objects(&triples, IS_PROPERTY), vec![":1"]);
        assert_eq!(triples.len(), 1);
    }

    #[test]
    fn other_language_is_ignored() {
        let record = entity(serde_json::json!({
            "id": "Q1", "type": "item",
            "labels": {"fr": {"language": "fr", "value": "univers"}}
        }));
        let triples = entity_triples(&record, "en").unwrap();
        assert!(objects(&triples, LABEL).is_empty());

        let triples = entity_triples(&record, "fr").unwrap();
        assert_eq!(objects(&triples, LABEL), vec![":\"univers\""]);
    }

    #[test]
    fn deprecated_claims_are_excluded() {
        let record = entity(serde_json::json!({
            "id": "Q1", "type": "item",
            "claims": {"P31": [item_claim("preferred", 5), item_claim("deprecated", 6)]}
        }));
        let triples = entity_triples(&record, "en").unwrap();
        assert_eq!(objects(&triples, "P31"), vec![":@Q5"]);
    }

    #[test]
    fn unknown_values_become_literals() {
        let record = entity(serde_json::json!({
            "id": "Q1", "type": "item",
            "claims": {
                "P569": [{"rank": "normal", "mainsnak": {"snaktype": "somevalue"}}],
                "P40": [{"rank": "normal", "mainsnak": {"snaktype": "novalue"}}]
            }
        }));
        let triples = entity_triples(&record, "en").unwrap();
        assert_eq!(objects(&triples, "P569"), vec![":true"]);
        assert_eq!(objects(&triples, "P40"), vec![":null"]);
    }

    #[test]
    fn unknown_entity_type_is_an_error() {
        let record = entity(serde_json::json!({"id": "L1", "type": "foo"}));
        assert!(matches!(
            entity_triples(&record, "en"),
            Err(ImportError::UnknownEntityType { ref kind, .. }) if kind == "foo"
        ));
    }

    #[test]
    fn unknown_snak_type_aborts_the_entity() {
        let record = entity(serde_json::json!({
            "id": "Q1", "type": "item",
            "claims": {"P31": [{"rank": "normal", "mainsnak": {"snaktype": "bogus"}}]}
        }));
        assert!(matches!(
            entity_triples(&record, "en"),
            Err(ImportError::UnknownSnakType { .. })
        ));
    }

    #[test]
    fn tagged_entity_id_is_rejected() {
        let record = entity(serde_json::json!({"id": ":Q1", "type": "item"}));
        assert!(matches!(
            entity_triples(&record, "en"),
            Err(ImportError::Term(TermError::Malformed { .. }))
        ));
    }
}
