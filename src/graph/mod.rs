//! Knowledge graph: flat triples and a lazy navigation layer over them.
//!
//! The graph stores triples (subject, predicate, object) with an optional
//! confidence. Objects use the tag convention from [`crate::term`].
//!
//! - [`Graph`] is one session over a [`TripleStore`]; dropping it releases the
//!   database file
//! - [`Node`] is a cheap handle for one subject that resolves predicates,
//!   objects and incoming references on demand

pub mod node;

use regex::RegexBuilder;

use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::store::{StoreResult, SubjectCursor, TripleStore};
use crate::term::{self, Value};

pub use node::{Node, NodeValue, Objects, Predicates, ReferencedBy};

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// A triple (subject, predicate, object) in the knowledge graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Triple {
    /// The subject identifier.
    pub subject: String,
    /// The predicate identifier.
    pub predicate: String,
    /// The flat object: an entity reference or a tagged literal.
    pub object: String,
    /// Confidence score in [0.0, 1.0], if the source provides one.
    pub confidence: Option<f64>,
}

impl Triple {
    /// Create a new triple without a confidence score.
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            confidence: None,
        }
    }

    /// Set the confidence score. The value is stored as given.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Decode the object.
    pub fn value(&self) -> Value {
        term::decode(&self.object)
    }
}

/// One session over a triple store.
pub struct Graph {
    store: TripleStore,
}

impl Graph {
    /// Open the store named by `config`.
    pub fn open(config: &GraphConfig) -> GraphResult<Self> {
        let store = TripleStore::open_with_page_size(&config.db_path, config.page_size)?;
        tracing::info!(path = %config.db_path.display(), "opened knowledge graph");
        Ok(Self { store })
    }

    /// Wrap an already open store.
    pub fn from_store(store: TripleStore) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &TripleStore {
        &self.store
    }

    /// Release the store. Equivalent to dropping the graph.
    pub fn close(self) {
        drop(self);
    }

    /// Get a handle for `subject`. The subject does not need to exist.
    pub fn node(&self, subject: &str) -> GraphResult<Node<'_>> {
        check_identifier("subject", subject)?;
        Ok(Node::new(&self.store, subject))
    }

    /// Every distinct subject as a node. Single pass.
    pub fn subjects(&self) -> Subjects<'_> {
        Subjects {
            store: &self.store,
            inner: self.store.distinct_subjects(),
        }
    }

    /// Every distinct subject, materialized.
    pub fn subjects_list(&self) -> GraphResult<Vec<Node<'_>>> {
        self.subjects().collect()
    }

    /// Subjects matching `pattern` case-insensitively from their first character.
    ///
    /// The match is anchored at the start only: `red.*` matches `RedApple`
    /// but not `greenApple`. Single pass.
    pub fn search_subjects(&self, pattern: &str) -> GraphResult<SearchResults<'_>> {
        let invalid = |e: regex::Error| GraphError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        };
        // Validate alone: a stray `)` must not close the anchoring group.
        RegexBuilder::new(pattern).build().map_err(invalid)?;
        let anchored = RegexBuilder::new(&format!("^(?:{pattern})"))
            .case_insensitive(true)
            .build()
            .map_err(invalid)?;
        Ok(SearchResults {
            inner: self.store.distinct_subjects_matching(anchored),
        })
    }

    /// Subjects matching `pattern`, materialized.
    pub fn search_subjects_list(&self, pattern: &str) -> GraphResult<Vec<String>> {
        self.search_subjects(pattern)?.collect()
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph").field("store", &self.store).finish()
    }
}

/// Lazy iterator over all subjects as nodes.
pub struct Subjects<'g> {
    store: &'g TripleStore,
    inner: SubjectCursor<'g>,
}

impl<'g> Iterator for Subjects<'g> {
    type Item = GraphResult<Node<'g>>;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        self.inner
            .next()
            .map(|subject| Ok(Node::new(store, &subject?)))
    }
}

/// Lazy iterator over subjects matching a search pattern.
pub struct SearchResults<'g> {
    inner: SubjectCursor<'g>,
}

impl Iterator for SearchResults<'_> {
    type Item = GraphResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|subject: StoreResult<String>| subject.map_err(GraphError::from))
    }
}

/// Reject identifiers that cannot come out of an importer.
pub(crate) fn check_identifier(name: &'static str, value: &str) -> GraphResult<()> {
    if value.is_empty() {
        return Err(GraphError::InvalidArgument {
            name,
            message: "must not be empty".into(),
        });
    }
    if value.chars().any(char::is_control) {
        return Err(GraphError::InvalidArgument {
            name,
            message: format!("{value:?} contains control characters"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn graph_with(triples: &[(&str, &str, &str)]) -> (TempDir, Graph) {
        let dir = TempDir::new().unwrap();
        let graph = Graph::open(&GraphConfig::new(dir.path().join("knowledge.redb"))).unwrap();
        graph
            .store()
            .upsert_all(triples.iter().map(|(s, p, o)| Triple::new(*s, *p, *o)))
            .unwrap();
        graph.store().build_indexes().unwrap();
        (dir, graph)
    }

    #[test]
    fn confidence_is_stored_as_given() {
        let t = Triple::new("a", "p", "b").with_confidence(0.25);
        assert_eq!(t.confidence, Some(0.25));
    }

    #[test]
    fn triple_value_decodes_tag() {
        assert_eq!(Triple::new("a", "p", ":x").value(), Value::Literal("x".into()));
        assert_eq!(Triple::new("a", "p", "b").value(), Value::Reference("b".into()));
    }

    #[test]
    fn search_is_case_insensitive_and_anchored() {
        let (_dir, graph) = graph_with(&[
            ("RedApple", "color", ":red"),
            ("greenApple", "color", ":green"),
            ("red_fruit", "color", ":red"),
        ]);
        let mut hits = graph.search_subjects_list("red.*").unwrap();
        hits.sort();
        assert_eq!(hits, vec!["RedApple", "red_fruit"]);
    }

    #[test]
    fn search_alternation_stays_anchored() {
        let (_dir, graph) = graph_with(&[("xa", "p", ":1"), ("b", "p", ":1")]);
        assert_eq!(graph.search_subjects_list("a|b").unwrap(), vec!["b"]);
    }

    #[test]
    fn unbalanced_group_cannot_escape_anchor() {
        let (_dir, graph) = graph_with(&[("greenApple", "color", ":green")]);
        assert!(matches!(
            graph.search_subjects_list("x)|(apple"),
            Err(GraphError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let (_dir, graph) = graph_with(&[]);
        assert!(matches!(
            graph.search_subjects("(").err(),
            Some(GraphError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn subjects_yield_nodes() {
        let (_dir, graph) = graph_with(&[("a", "p", "b"), ("b", "p", ":1")]);
        let subjects: Vec<String> = graph
            .subjects_list()
            .unwrap()
            .iter()
            .map(|n| n.subject().to_string())
            .collect();
        assert_eq!(subjects, vec!["a", "b"]);
    }

    #[test]
    fn node_rejects_bad_subjects() {
        let (_dir, graph) = graph_with(&[]);
        assert!(matches!(
            graph.node(""),
            Err(GraphError::InvalidArgument { name: "subject", .. })
        ));
        assert!(graph.node("a\tb").is_err());
        assert!(graph.node("Sad_Movie").is_ok());
    }
}
