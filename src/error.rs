//! Rich diagnostic error types for episteme.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for episteme.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum EpistemeError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Term(#[from] TermError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Term errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TermError {
    #[error("malformed term {term:?}: {reason}")]
    #[diagnostic(
        code(episteme::term::malformed),
        help(
            "Tabular terms must be an entity reference like `<Douglas_Adams>` \
             or a double-quoted literal like `\"42\"`. Entity identifiers may \
             not start with `:`, which is reserved for literals."
        )
    )]
    Malformed { term: String, reason: String },
}

// ---------------------------------------------------------------------------
// Import errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error("line {line}: {source}")]
    #[diagnostic(
        code(episteme::import::at_line),
        help("Fix or remove the offending record and re-run the import.")
    )]
    AtLine {
        line: usize,
        #[source]
        source: Box<ImportError>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Term(#[from] TermError),

    #[error("unknown snak type: {snaktype}")]
    #[diagnostic(
        code(episteme::import::unknown_snak_type),
        help("Valid snak types are: value, somevalue, novalue.")
    )]
    UnknownSnakType { snaktype: String },

    #[error("unknown entity type {kind:?} for entity {id}")]
    #[diagnostic(
        code(episteme::import::unknown_entity_type),
        help("Valid entity types are: item, property.")
    )]
    UnknownEntityType { id: String, kind: String },

    #[error("malformed snak: {message}")]
    #[diagnostic(
        code(episteme::import::malformed_snak),
        help(
            "A `value` snak needs a datatype and a datavalue whose shape matches \
             that datatype. Check that the dump is a Wikidata JSON export."
        )
    )]
    MalformedSnak { message: String },

    #[error("expected at least 4 tab-separated fields, found {found}")]
    #[diagnostic(
        code(episteme::import::malformed_row),
        help("Fact rows are `id<TAB>subject<TAB>predicate<TAB>object[<TAB>literal]`.")
    )]
    MalformedRow { found: usize },

    #[error("invalid entity JSON: {source}")]
    #[diagnostic(
        code(episteme::import::json),
        help("Each entity line must be a single JSON object, optionally followed by a comma.")
    )]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error while reading import source: {source}")]
    #[diagnostic(
        code(episteme::import::io),
        help("Check that the source file exists and is readable UTF-8 text.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl ImportError {
    /// Wrap an error with the 1-based source line it was raised on.
    pub fn at_line(line: usize) -> impl FnOnce(ImportError) -> ImportError {
        move |source| ImportError::AtLine {
            line,
            source: Box::new(source),
        }
    }

    /// The underlying error, with any line context removed.
    pub fn root(&self) -> &ImportError {
        match self {
            ImportError::AtLine { source, .. } => source.root(),
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(episteme::store::io),
        help(
            "A filesystem operation failed. Check that the database directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("redb error: {message}")]
    #[diagnostic(
        code(episteme::store::redb),
        help(
            "The embedded database reported an error. If the file was written by \
             another program or an incompatible version, re-import into a fresh database."
        )
    )]
    Redb { message: String },
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("invalid {name}: {message}")]
    #[diagnostic(
        code(episteme::graph::invalid_argument),
        help("Subjects and predicates must be non-empty and free of control characters.")
    )]
    InvalidArgument { name: &'static str, message: String },

    #[error("invalid search pattern {pattern:?}: {message}")]
    #[diagnostic(
        code(episteme::graph::invalid_pattern),
        help("Search patterns use Rust `regex` syntax and are matched from the start of each subject.")
    )]
    InvalidPattern { pattern: String, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(episteme::config::read),
        help("Check that the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    #[diagnostic(
        code(episteme::config::parse),
        help("The config file must be TOML with keys `language`, `default_confidence` and `row_limit`.")
    )]
    Parse { path: String, message: String },

    #[error("invalid {key}: {message}")]
    #[diagnostic(
        code(episteme::config::invalid),
        help("`default_confidence` must lie between 0.0 and 1.0.")
    )]
    Invalid { key: &'static str, message: String },
}

/// Convenience alias for functions returning episteme results.
pub type EpistemeResult<T> = std::result::Result<T, EpistemeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_error_converts_to_episteme_error() {
        let err = TermError::Malformed {
            term: "bogus".into(),
            reason: "no delimiter".into(),
        };
        let top: EpistemeError = err.into();
        assert!(matches!(top, EpistemeError::Term(TermError::Malformed { .. })));
    }

    #[test]
    fn graph_error_wraps_store_error() {
        let err = StoreError::Redb {
            message: "boom".into(),
        };
        let graph: GraphError = err.into();
        assert!(matches!(graph, GraphError::Store(StoreError::Redb { .. })));
    }

    #[test]
    fn term_error_carries_line_number() {
        let err = ImportError::at_line(7)(
            TermError::Malformed {
                term: "x".into(),
                reason: "no delimiter".into(),
            }
            .into(),
        );
        let msg = format!("{err}");
        assert!(msg.starts_with("line 7:"));
        assert!(msg.contains("\"x\""));
        assert!(matches!(err.root(), ImportError::Term(TermError::Malformed { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = ImportError::UnknownEntityType {
            id: "Q1".into(),
            kind: "foo".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("foo"));
        assert!(msg.contains("Q1"));
    }
}
