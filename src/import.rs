//! Batch import of knowledge-base dumps into a [`TripleStore`].
//!
//! Both importers stream their source line by line into a single write
//! transaction, so a failing record aborts the run and leaves the store as it
//! was. The object index is rebuilt once after the load commits.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::store::TripleStore;
use crate::wikidata::{entity_triples, parse_line};
use crate::yago::fact_triple;

/// Result type for import operations.
pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Counters for one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Source lines read, including skipped ones.
    pub lines: usize,
    /// Fact rows or entities converted.
    pub records: usize,
    /// Triples written.
    pub triples: usize,
    /// Lines that held no record.
    pub skipped: usize,
}

/// Import YAGO-style TSV facts from `reader`.
///
/// Stops after `config.row_limit` facts when a limit is set. A confidence
/// outside `0.0..=1.0` is rejected before anything is read.
pub fn import_facts<R: BufRead>(
    reader: R,
    store: &TripleStore,
    config: &ImportConfig,
) -> ImportResult<ImportStats> {
    config.validate()?;
    tracing::info!(
        confidence = config.default_confidence,
        row_limit = ?config.row_limit,
        "importing facts"
    );

    let mut stats = ImportStats::default();
    let limit = config.row_limit.unwrap_or(usize::MAX);
    let confidence = config.default_confidence;
    let mut lines = reader.lines();

    let triples = std::iter::from_fn(|| {
        loop {
            if stats.records >= limit {
                return None;
            }
            let line = match lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(ImportError::Io { source: e })),
            };
            stats.lines += 1;
            match fact_triple(&line, confidence) {
                Ok(Some(triple)) => {
                    stats.records += 1;
                    return Some(Ok(triple));
                }
                Ok(None) => {
                    stats.skipped += 1;
                    tracing::debug!(line = stats.lines, "skipping blank fact row");
                }
                Err(e) => return Some(Err(ImportError::at_line(stats.lines)(e))),
            }
        }
    });
    let written = store.try_upsert_all(triples)?;
    stats.triples = written;

    finish(store, stats)
}

/// Import a Wikidata JSON dump from `reader`.
///
/// The first line is a header and is skipped, as is every line that does
/// not start with `{`.
pub fn import_entities<R: BufRead>(
    reader: R,
    store: &TripleStore,
    config: &ImportConfig,
) -> ImportResult<ImportStats> {
    tracing::info!(language = %config.language, "importing entities");

    let mut stats = ImportStats::default();
    let mut lines = reader.lines();
    if let Some(header) = lines.next() {
        header.map_err(|e| ImportError::Io { source: e })?;
        stats.lines += 1;
        stats.skipped += 1;
    }

    let language = config.language.as_str();
    let mut pending = VecDeque::new();
    let triples = std::iter::from_fn(|| {
        loop {
            if let Some(triple) = pending.pop_front() {
                return Some(Ok(triple));
            }
            let line = match lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(ImportError::Io { source: e })),
            };
            stats.lines += 1;
            let entity = match parse_line(&line) {
                Ok(Some(entity)) => entity,
                Ok(None) => {
                    stats.skipped += 1;
                    tracing::debug!(line = stats.lines, "skipping non-entity line");
                    continue;
                }
                Err(e) => return Some(Err(ImportError::at_line(stats.lines)(e))),
            };
            match entity_triples(&entity, language) {
                Ok(triples) => {
                    stats.records += 1;
                    pending.extend(triples);
                }
                Err(e) => return Some(Err(ImportError::at_line(stats.lines)(e))),
            }
        }
    });
    let written = store.try_upsert_all(triples)?;
    stats.triples = written;

    finish(store, stats)
}

/// Import a TSV fact file.
pub fn import_facts_file(
    path: &Path,
    store: &TripleStore,
    config: &ImportConfig,
) -> ImportResult<ImportStats> {
    import_facts(open(path)?, store, config)
}

/// Import a Wikidata JSON dump file.
pub fn import_entities_file(
    path: &Path,
    store: &TripleStore,
    config: &ImportConfig,
) -> ImportResult<ImportStats> {
    import_entities(open(path)?, store, config)
}

fn open(path: &Path) -> ImportResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| ImportError::Io { source: e })
}

fn finish(store: &TripleStore, stats: ImportStats) -> ImportResult<ImportStats> {
    store.build_indexes()?;
    tracing::info!(
        lines = stats.lines,
        records = stats.records,
        triples = stats.triples,
        skipped = stats.skipped,
        "import finished"
    );
    Ok(stats)
}
