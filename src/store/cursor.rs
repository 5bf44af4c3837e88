//! Lazy, single-pass scans over the triple store.
//!
//! A cursor holds no transaction between pages. Each page opens a fresh read
//! transaction, resumes strictly after the last key it returned, and reads at
//! most `page_size` rows. Once a cursor reports the end of its range it stays
//! exhausted; a cursor cannot be rewound.

use std::collections::VecDeque;
use std::ops::Bound;

use redb::ReadableTable;
use regex::Regex;

use crate::graph::Triple;
use crate::store::durable::{index_fresh, BY_OBJECT, TRIPLES};
use crate::store::{redb_error, StoreResult, TripleStore};

/// Which slice of the store a cursor walks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scan {
    All,
    Subject(String),
    SubjectPredicate(String, String),
    Object(String),
}

/// What to do with one key read from a table.
enum Step {
    Take,
    Skip,
    Stop,
}

impl Scan {
    /// The first two key components the scan starts from.
    fn start(&self, by_object: bool) -> (String, String) {
        match self {
            Scan::All => (String::new(), String::new()),
            Scan::Subject(s) => (s.clone(), String::new()),
            Scan::SubjectPredicate(s, p) => (s.clone(), p.clone()),
            Scan::Object(o) if by_object => (o.clone(), String::new()),
            Scan::Object(_) => (String::new(), String::new()),
        }
    }

    /// Classify a key. Keys arrive in table order, so the first key past the
    /// scanned prefix ends the scan.
    fn step(&self, by_object: bool, key: (&str, &str, &str)) -> Step {
        let (first, second, third) = key;
        let within = match self {
            Scan::All => true,
            Scan::Subject(s) => first == s,
            Scan::SubjectPredicate(s, p) => first == s && second == p,
            Scan::Object(o) if by_object => first == o,
            Scan::Object(o) => return if third == o { Step::Take } else { Step::Skip },
        };
        if within { Step::Take } else { Step::Stop }
    }
}

/// Lazy cursor over stored triples.
///
/// Yields `Err` at most once, after which it is exhausted.
pub struct TripleCursor<'s> {
    store: &'s TripleStore,
    scan: Scan,
    page_size: usize,
    resume: Option<(String, String, String)>,
    buffer: VecDeque<Triple>,
    done: bool,
}

impl<'s> TripleCursor<'s> {
    pub(crate) fn new(store: &'s TripleStore, scan: Scan, page_size: usize) -> Self {
        Self {
            store,
            scan,
            page_size: page_size.max(1),
            resume: None,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    fn fetch_page(&mut self) -> StoreResult<()> {
        let txn = self.store.begin_read()?;
        let by_object = matches!(self.scan, Scan::Object(_)) && index_fresh(&txn)?;
        if matches!(self.scan, Scan::Object(_)) && !by_object && self.resume.is_none() {
            tracing::debug!(scan = ?self.scan, "object index is stale, scanning all triples");
        }
        let table = txn
            .open_table(if by_object { BY_OBJECT } else { TRIPLES })
            .map_err(redb_error("open_table"))?;

        let resume = self.resume.take();
        let start = self.scan.start(by_object);
        let lower = match &resume {
            Some((a, b, c)) => Bound::Excluded((a.as_str(), b.as_str(), c.as_str())),
            None => Bound::Included((start.0.as_str(), start.1.as_str(), "")),
        };

        let mut read = 0;
        for entry in table
            .range((lower, Bound::Unbounded))
            .map_err(redb_error("range"))?
        {
            let (guard, confidence) = entry.map_err(redb_error("range"))?;
            let key = guard.value();
            match self.scan.step(by_object, key) {
                Step::Stop => {
                    self.done = true;
                    return Ok(());
                }
                Step::Skip => {}
                Step::Take => {
                    let (first, second, third) = key;
                    let (subject, predicate, object) = if by_object {
                        (second, third, first)
                    } else {
                        (first, second, third)
                    };
                    self.buffer.push_back(Triple {
                        subject: subject.to_string(),
                        predicate: predicate.to_string(),
                        object: object.to_string(),
                        confidence: confidence.value(),
                    });
                }
            }

            read += 1;
            if read >= self.page_size {
                let (first, second, third) = key;
                self.resume = Some((first.to_string(), second.to_string(), third.to_string()));
                return Ok(());
            }
        }

        self.done = true;
        Ok(())
    }
}

impl Iterator for TripleCursor<'_> {
    type Item = StoreResult<Triple>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.buffer.is_empty() && !self.done {
            if let Err(e) = self.fetch_page() {
                self.done = true;
                self.buffer.clear();
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

impl std::fmt::Debug for TripleCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripleCursor")
            .field("scan", &self.scan)
            .field("buffered", &self.buffer.len())
            .field("done", &self.done)
            .finish()
    }
}

/// Lazy cursor over distinct subjects, optionally filtered by a pattern.
///
/// Relies on the primary table being sorted by subject.
pub struct SubjectCursor<'s> {
    inner: TripleCursor<'s>,
    pattern: Option<Regex>,
    last: Option<String>,
}

impl<'s> SubjectCursor<'s> {
    pub(crate) fn new(inner: TripleCursor<'s>, pattern: Option<Regex>) -> Self {
        Self {
            inner,
            pattern,
            last: None,
        }
    }
}

impl Iterator for SubjectCursor<'_> {
    type Item = StoreResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let triple = match self.inner.next()? {
                Ok(triple) => triple,
                Err(e) => return Some(Err(e)),
            };
            if self.last.as_deref() == Some(triple.subject.as_str()) {
                continue;
            }
            self.last = Some(triple.subject.clone());
            if self.pattern.as_ref().is_none_or(|re| re.is_match(&triple.subject)) {
                return Some(Ok(triple.subject));
            }
        }
    }
}
