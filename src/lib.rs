//! # episteme
//!
//! A persistent subject-predicate-object knowledge graph with importers for
//! YAGO-style TSV facts and Wikidata JSON dumps.
//!
//! ## Architecture
//!
//! - **Term encoding** (`term`): flat object strings, `:`-tagged literals vs. references
//! - **Importers** (`yago`, `wikidata`, `import`): source records → triples, one transaction per run
//! - **Storage** (`store`): redb tables keyed by `(s, p, o)` and `(o, s, p)`, paged cursors
//! - **Navigation** (`graph`): nodes, decoded values, reverse references, subject search
//!
//! ## Library usage
//!
//! ```no_run
//! use episteme::config::GraphConfig;
//! use episteme::graph::{Graph, Triple};
//!
//! let graph = Graph::open(&GraphConfig::new("knowledge.redb")).unwrap();
//! graph
//!     .store()
//!     .upsert_all([Triple::new("Ulm", "isLocatedIn", "Germany")])
//!     .unwrap();
//!
//! let ulm = graph.node("Ulm").unwrap();
//! for value in ulm.objects_list("isLocatedIn").unwrap() {
//!     println!("{value}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod import;
pub mod store;
pub mod term;
pub mod wikidata;
pub mod yago;
