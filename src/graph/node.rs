//! Lazy navigation from one subject to its values and referrers.
//!
//! A [`Node`] is only a store reference plus a subject string. Nothing is
//! read until a method is called, and the iterator-returning methods read
//! page by page as they are consumed. Each iterator is single-pass; the
//! `*_list` variants collect into a `Vec` for repeated access.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::error::GraphError;
use crate::store::{TripleCursor, TripleStore};
use crate::term::{self, Value};

use super::{check_identifier, GraphResult};

/// Handle for one subject of the graph.
///
/// Two nodes are equal when they name the same subject of the same store.
#[derive(Clone)]
pub struct Node<'g> {
    store: &'g TripleStore,
    subject: String,
}

/// A decoded object: a literal payload or another node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue<'g> {
    /// Literal payload with the tag stripped.
    Literal(String),
    /// Reference to another subject.
    Node(Node<'g>),
}

impl<'g> NodeValue<'g> {
    fn decode(store: &'g TripleStore, flat: &str) -> Self {
        match term::decode(flat) {
            Value::Literal(text) => NodeValue::Literal(text),
            Value::Reference(subject) => NodeValue::Node(Node {
                store,
                subject,
            }),
        }
    }

    /// The literal payload, if this is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            NodeValue::Literal(text) => Some(text),
            NodeValue::Node(_) => None,
        }
    }

    /// The referenced node, if this is a reference.
    pub fn as_node(&self) -> Option<&Node<'g>> {
        match self {
            NodeValue::Node(node) => Some(node),
            NodeValue::Literal(_) => None,
        }
    }
}

impl std::fmt::Display for NodeValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeValue::Literal(text) => write!(f, "{text}"),
            NodeValue::Node(node) => write!(f, "{node}"),
        }
    }
}

impl<'g> Node<'g> {
    pub(crate) fn new(store: &'g TripleStore, subject: &str) -> Self {
        Self {
            store,
            subject: subject.to_string(),
        }
    }

    /// The subject identifier.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Whether the subject occurs as the subject or object of any triple.
    pub fn is_known(&self) -> GraphResult<bool> {
        Ok(self.store.exists_as_subject_or_object(&self.subject)?)
    }

    /// Distinct predicates this subject has triples for, ascending. Single pass.
    pub fn predicates(&self) -> Predicates<'g> {
        Predicates {
            inner: self.store.triples_by_subject(&self.subject),
            last: None,
        }
    }

    /// Distinct predicates, materialized.
    pub fn predicates_list(&self) -> GraphResult<Vec<String>> {
        self.predicates().collect()
    }

    /// Decoded objects of `(subject, predicate)` triples. Single pass.
    pub fn objects(&self, predicate: &str) -> GraphResult<Objects<'g>> {
        check_identifier("predicate", predicate)?;
        Ok(Objects {
            store: self.store,
            inner: self
                .store
                .triples_by_subject_predicate(&self.subject, predicate),
        })
    }

    /// Decoded objects of `(subject, predicate)` triples, materialized.
    pub fn objects_list(&self, predicate: &str) -> GraphResult<Vec<NodeValue<'g>>> {
        self.objects(predicate)?.collect()
    }

    /// `(referrer, predicate)` for every triple whose object is this subject.
    /// Single pass.
    pub fn referenced_by(&self) -> ReferencedBy<'g> {
        ReferencedBy {
            store: self.store,
            inner: self.store.triples_by_object(&self.subject),
        }
    }

    /// Incoming references, materialized.
    pub fn referenced_by_list(&self) -> GraphResult<Vec<(Node<'g>, String)>> {
        self.referenced_by().collect()
    }

    /// Every predicate of this subject mapped to its decoded objects.
    ///
    /// Values within a predicate keep storage retrieval order.
    pub fn info(&self) -> GraphResult<BTreeMap<String, Vec<NodeValue<'g>>>> {
        let mut info: BTreeMap<String, Vec<NodeValue<'g>>> = BTreeMap::new();
        for triple in self.store.triples_by_subject(&self.subject) {
            let triple = triple?;
            info.entry(triple.predicate)
                .or_default()
                .push(NodeValue::decode(self.store, &triple.object));
        }
        Ok(info)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.store, other.store) && self.subject == other.subject
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.subject.hash(state);
    }
}

impl std::fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.subject)
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("subject", &self.subject)
            .finish()
    }
}

/// Lazy iterator over the distinct predicates of a node.
pub struct Predicates<'g> {
    inner: TripleCursor<'g>,
    last: Option<String>,
}

impl Iterator for Predicates<'_> {
    type Item = GraphResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let triple = match self.inner.next()? {
                Ok(triple) => triple,
                Err(e) => return Some(Err(GraphError::from(e))),
            };
            if self.last.as_deref() != Some(triple.predicate.as_str()) {
                self.last = Some(triple.predicate.clone());
                return Some(Ok(triple.predicate));
            }
        }
    }
}

/// Lazy iterator over the decoded objects of one predicate.
pub struct Objects<'g> {
    store: &'g TripleStore,
    inner: TripleCursor<'g>,
}

impl<'g> Iterator for Objects<'g> {
    type Item = GraphResult<NodeValue<'g>>;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        self.inner.next().map(|triple| {
            let triple = triple?;
            Ok(NodeValue::decode(store, &triple.object))
        })
    }
}

/// Lazy iterator over the incoming references of a node.
pub struct ReferencedBy<'g> {
    store: &'g TripleStore,
    inner: TripleCursor<'g>,
}

impl<'g> Iterator for ReferencedBy<'g> {
    type Item = GraphResult<(Node<'g>, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        self.inner.next().map(|triple| {
            let triple = triple?;
            Ok((Node::new(store, &triple.subject), triple.predicate))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, Triple};
    use tempfile::TempDir;

    fn graph_with(triples: &[(&str, &str, &str)]) -> (TempDir, Graph) {
        let dir = TempDir::new().unwrap();
        let store = TripleStore::open_with_page_size(&dir.path().join("k.redb"), 2).unwrap();
        store
            .upsert_all(triples.iter().map(|(s, p, o)| Triple::new(*s, *p, *o)))
            .unwrap();
        store.build_indexes().unwrap();
        (dir, Graph::from_store(store))
    }

    fn lit(text: &str) -> NodeValue<'static> {
        NodeValue::Literal(text.to_string())
    }

    #[test]
    fn is_known_checks_both_positions() {
        let (_dir, graph) = graph_with(&[("Sad_Movie", "directed", "Someone")]);
        assert!(graph.node("Sad_Movie").unwrap().is_known().unwrap());
        assert!(graph.node("Someone").unwrap().is_known().unwrap());
        assert!(!graph.node("directed").unwrap().is_known().unwrap());
    }

    #[test]
    fn predicates_are_distinct() {
        let (_dir, graph) = graph_with(&[
            ("m", "hasDuration", ":90"),
            ("m", "hasGenre", "Drama"),
            ("m", "hasGenre", "Comedy"),
            ("m", "hasGenre", "Romance"),
        ]);
        let node = graph.node("m").unwrap();
        assert_eq!(node.predicates_list().unwrap(), vec!["hasDuration", "hasGenre"]);
    }

    #[test]
    fn objects_decode_literals_and_references() {
        let (_dir, graph) = graph_with(&[
            ("m", "hasDuration", ":90"),
            ("m", "directedBy", "Someone"),
        ]);
        let node = graph.node("m").unwrap();

        assert_eq!(node.objects_list("hasDuration").unwrap(), vec![lit("90")]);

        let directors = node.objects_list("directedBy").unwrap();
        let director = directors[0].as_node().unwrap();
        assert_eq!(director, &graph.node("Someone").unwrap());
        assert_eq!(director.referenced_by_list().unwrap().len(), 1);
    }

    #[test]
    fn objects_rejects_invalid_predicate() {
        let (_dir, graph) = graph_with(&[]);
        let node = graph.node("m").unwrap();
        assert!(matches!(
            node.objects(""),
            Err(GraphError::InvalidArgument { name: "predicate", .. })
        ));
        assert!(node.objects("a\nb").is_err());
    }

    #[test]
    fn referenced_by_lists_incoming_edges() {
        let (_dir, graph) = graph_with(&[
            ("Berlin", "isLocatedIn", "Germany"),
            ("Hamburg", "isLocatedIn", "Germany"),
            ("Germany", "hasCapital", "Berlin"),
        ]);
        let refs = graph.node("Germany").unwrap().referenced_by_list().unwrap();
        let pairs: Vec<(String, String)> = refs
            .into_iter()
            .map(|(node, predicate)| (node.subject().to_string(), predicate))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Berlin".to_string(), "isLocatedIn".to_string()),
                ("Hamburg".to_string(), "isLocatedIn".to_string()),
            ]
        );
    }

    #[test]
    fn info_groups_values_by_predicate() {
        let (_dir, graph) = graph_with(&[
            ("s", "p", ":v1"),
            ("s", "p", ":v2"),
            ("s", "p", ":v3"),
            ("s", "q", ":v4"),
            ("other", "p", ":v5"),
        ]);
        let info = graph.node("s").unwrap().info().unwrap();

        let mut expected = BTreeMap::new();
        expected.insert("p".to_string(), vec![lit("v1"), lit("v2"), lit("v3")]);
        expected.insert("q".to_string(), vec![lit("v4")]);
        assert_eq!(info, expected);
    }

    #[test]
    fn unknown_node_is_empty() {
        let (_dir, graph) = graph_with(&[("a", "p", "b")]);
        let node = graph.node("nobody").unwrap();
        assert!(node.info().unwrap().is_empty());
        assert!(node.predicates_list().unwrap().is_empty());
        assert!(node.referenced_by_list().unwrap().is_empty());
    }

    #[test]
    fn nodes_for_same_subject_are_equal() {
        let (_dir, graph) = graph_with(&[]);
        assert_eq!(graph.node("x").unwrap(), graph.node("x").unwrap());
        assert_ne!(graph.node("x").unwrap(), graph.node("y").unwrap());
        assert_eq!(graph.node("x").unwrap().to_string(), "x");
    }
}
