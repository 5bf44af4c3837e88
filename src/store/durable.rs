//! ACID-durable triple table backed by redb.
//!
//! The primary table is keyed by `(subject, predicate, object)`, so inserting
//! an existing key replaces its confidence and subject lookups are prefix
//! scans. Object lookups use a second table keyed by `(object, subject,
//! predicate)` that is rebuilt in one pass after a bulk load.

use std::path::Path;

use redb::{Database, ReadTransaction, ReadableTable, ReadableTableMetadata, TableDefinition};
use regex::Regex;

use crate::error::StoreError;
use crate::graph::Triple;
use crate::store::cursor::{Scan, SubjectCursor, TripleCursor};
use crate::store::{redb_error, StoreResult, DEFAULT_PAGE_SIZE};

/// Primary table: `(subject, predicate, object)` → confidence.
pub(crate) const TRIPLES: TableDefinition<(&str, &str, &str), Option<f64>> =
    TableDefinition::new("knowledge");

/// Object index: `(object, subject, predicate)` → confidence.
pub(crate) const BY_OBJECT: TableDefinition<(&str, &str, &str), Option<f64>> =
    TableDefinition::new("knowledge_by_object");

/// Store bookkeeping flags.
const META: TableDefinition<&str, bool> = TableDefinition::new("meta");

const OBJECT_INDEX_FRESH: &str = "object_index_fresh";

/// Triple store using redb.
///
/// The database file stays locked for as long as the store lives and is
/// released when it is dropped.
pub struct TripleStore {
    db: Database,
    page_size: usize,
}

impl TripleStore {
    /// Open or create a triple store at `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_with_page_size(path, DEFAULT_PAGE_SIZE)
    }

    /// Open or create a triple store, fetching `page_size` rows per cursor page.
    pub fn open_with_page_size(path: &Path, page_size: usize) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io { source: e })?;
        }
        let db = Database::create(path).map_err(|e| StoreError::Redb {
            message: format!("failed to open redb at {}: {e}", path.display()),
        })?;

        // Create every table up front so read transactions never miss one.
        let txn = db.begin_write().map_err(redb_error("begin_write"))?;
        {
            txn.open_table(TRIPLES).map_err(redb_error("open_table"))?;
            txn.open_table(BY_OBJECT).map_err(redb_error("open_table"))?;
            txn.open_table(META).map_err(redb_error("open_table"))?;
        }
        txn.commit().map_err(redb_error("commit"))?;

        tracing::debug!(path = %path.display(), page_size, "opened triple store");
        Ok(Self {
            db,
            page_size: page_size.max(1),
        })
    }

    /// Insert triples in one atomic write transaction.
    ///
    /// A triple whose `(subject, predicate, object)` already exists replaces
    /// the stored row. Returns the number of triples written.
    pub fn upsert_all<I>(&self, triples: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = Triple>,
    {
        self.try_upsert_all(triples.into_iter().map(Ok::<_, StoreError>))
    }

    /// Insert fallible triples in one atomic write transaction.
    ///
    /// The first `Err` aborts the transaction: nothing from this call is
    /// committed and the error is returned unchanged.
    pub fn try_upsert_all<I, E>(&self, triples: I) -> Result<usize, E>
    where
        I: IntoIterator<Item = Result<Triple, E>>,
        E: From<StoreError>,
    {
        let txn = self.db.begin_write().map_err(redb_error("begin_write"))?;
        let mut count = 0;
        {
            let mut table = txn.open_table(TRIPLES).map_err(redb_error("open_table"))?;
            for triple in triples {
                let triple = triple?;
                table
                    .insert(
                        (
                            triple.subject.as_str(),
                            triple.predicate.as_str(),
                            triple.object.as_str(),
                        ),
                        triple.confidence,
                    )
                    .map_err(redb_error("insert"))?;
                count += 1;
            }

            let mut meta = txn.open_table(META).map_err(redb_error("open_table"))?;
            meta.insert(OBJECT_INDEX_FRESH, false)
                .map_err(redb_error("insert"))?;
        }
        txn.commit().map_err(redb_error("commit"))?;
        Ok(count)
    }

    /// Rebuild the object index from the primary table.
    ///
    /// Returns the number of indexed triples.
    pub fn build_indexes(&self) -> StoreResult<usize> {
        let txn = self.db.begin_write().map_err(redb_error("begin_write"))?;
        let mut count = 0;
        {
            txn.delete_table(BY_OBJECT)
                .map_err(redb_error("delete_table"))?;
            let triples = txn.open_table(TRIPLES).map_err(redb_error("open_table"))?;
            let mut by_object = txn.open_table(BY_OBJECT).map_err(redb_error("open_table"))?;
            for entry in triples.iter().map_err(redb_error("iter"))? {
                let (key, confidence) = entry.map_err(redb_error("iter"))?;
                let (subject, predicate, object) = key.value();
                by_object
                    .insert((object, subject, predicate), confidence.value())
                    .map_err(redb_error("insert"))?;
                count += 1;
            }

            let mut meta = txn.open_table(META).map_err(redb_error("open_table"))?;
            meta.insert(OBJECT_INDEX_FRESH, true)
                .map_err(redb_error("insert"))?;
        }
        txn.commit().map_err(redb_error("commit"))?;

        tracing::info!(triples = count, "built object index");
        Ok(count)
    }

    /// Whether the object index reflects every committed write.
    pub fn object_index_fresh(&self) -> StoreResult<bool> {
        let txn = self.begin_read()?;
        index_fresh(&txn)
    }

    /// Number of stored triples.
    pub fn len(&self) -> StoreResult<u64> {
        let txn = self.begin_read()?;
        let table = txn.open_table(TRIPLES).map_err(redb_error("open_table"))?;
        table.len().map_err(redb_error("len"))
    }

    /// Whether the store holds no triples.
    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|n| n == 0)
    }

    /// All triples, in `(subject, predicate, object)` order.
    pub fn all_triples(&self) -> TripleCursor<'_> {
        TripleCursor::new(self, Scan::All, self.page_size)
    }

    /// Triples whose subject is `subject`, ordered by predicate then object.
    pub fn triples_by_subject(&self, subject: &str) -> TripleCursor<'_> {
        TripleCursor::new(self, Scan::Subject(subject.to_string()), self.page_size)
    }

    /// Triples matching `(subject, predicate)`, ordered by object.
    pub fn triples_by_subject_predicate(&self, subject: &str, predicate: &str) -> TripleCursor<'_> {
        TripleCursor::new(
            self,
            Scan::SubjectPredicate(subject.to_string(), predicate.to_string()),
            self.page_size,
        )
    }

    /// Triples whose object is exactly `object`, ordered by subject then predicate.
    ///
    /// Uses the object index when it is fresh and a filtered full scan otherwise.
    pub fn triples_by_object(&self, object: &str) -> TripleCursor<'_> {
        TripleCursor::new(self, Scan::Object(object.to_string()), self.page_size)
    }

    /// Every distinct subject, ascending.
    pub fn distinct_subjects(&self) -> SubjectCursor<'_> {
        SubjectCursor::new(self.all_triples(), None)
    }

    /// Distinct subjects accepted by `pattern`, ascending.
    pub fn distinct_subjects_matching(&self, pattern: Regex) -> SubjectCursor<'_> {
        SubjectCursor::new(self.all_triples(), Some(pattern))
    }

    /// Whether `term` occurs as the subject or the object of any triple.
    pub fn exists_as_subject_or_object(&self, term: &str) -> StoreResult<bool> {
        let scans = [Scan::Subject(term.to_string()), Scan::Object(term.to_string())];
        for scan in scans {
            if TripleCursor::new(self, scan, self.page_size).next().transpose()?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub(crate) fn begin_read(&self) -> StoreResult<ReadTransaction> {
        self.db.begin_read().map_err(redb_error("begin_read"))
    }
}

/// Read the object index flag inside an existing read transaction.
pub(crate) fn index_fresh(txn: &ReadTransaction) -> StoreResult<bool> {
    let meta = txn.open_table(META).map_err(redb_error("open_table"))?;
    let fresh = meta
        .get(OBJECT_INDEX_FRESH)
        .map_err(redb_error("get"))?
        .map(|guard| guard.value())
        .unwrap_or(true);
    Ok(fresh)
}

impl std::fmt::Debug for TripleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripleStore")
            .field("page_size", &self.page_size)
            .finish()
    }
}
