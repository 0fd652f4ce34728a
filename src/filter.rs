//! Record filters with identity.
//!
//! A [`Filter`] wraps a predicate over a [`Record`]. Every filter gets a
//! unique id when it is built; clones share it. The grid locates filters
//! by that id, never by comparing predicates, so two filters built from
//! the same closure are still distinct.
//!
//! # Example
//!
//! ```
//! use prepgrid::{Filter, Record};
//!
//! let paris = Filter::equals("city", "Paris");
//! let same = paris.clone();
//! assert_eq!(paris, same);
//! assert_ne!(paris, Filter::equals("city", "Paris"));
//!
//! let record = Record::from_pairs([("city", "Paris")]);
//! assert!(paris.test(&record));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use regex::Regex;

use crate::dataset::Record;

/// Predicate signature accepted by [`Filter::new`].
pub type Predicate = dyn Fn(&Record) -> bool + Send + Sync;

static NEXT_FILTER_ID: AtomicU64 = AtomicU64::new(1);

/// A record predicate with a stable identity.
#[derive(Clone)]
pub struct Filter {
    id: u64,
    predicate: Arc<Predicate>,
}

impl Filter {
    /// Creates a new filter from a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        Self {
            id: NEXT_FILTER_ID.fetch_add(1, Ordering::Relaxed),
            predicate: Arc::new(predicate),
        }
    }

    /// Keeps records whose cell contains `term` (case-sensitive).
    pub fn contains(column_id: impl Into<String>, term: impl Into<String>) -> Self {
        let column_id = column_id.into();
        let term = term.into();
        Self::new(move |record| {
            record
                .get(&column_id)
                .is_some_and(|value| value.contains(term.as_str()))
        })
    }

    /// Keeps records whose cell contains `term`, ignoring case.
    pub fn contains_ignore_case(column_id: impl Into<String>, term: &str) -> Self {
        let column_id = column_id.into();
        let term = term.to_lowercase();
        Self::new(move |record| {
            record
                .get(&column_id)
                .is_some_and(|value| value.to_lowercase().contains(term.as_str()))
        })
    }

    /// Keeps records whose cell equals `value` exactly.
    pub fn equals(column_id: impl Into<String>, value: impl Into<String>) -> Self {
        let column_id = column_id.into();
        let value = value.into();
        Self::new(move |record| record.get(&column_id) == Some(value.as_str()))
    }

    /// Keeps records whose cell is present and empty.
    pub fn empty(column_id: impl Into<String>) -> Self {
        Self::equals(column_id, "")
    }

    /// Keeps records whose cell matches `pattern`.
    pub fn matches(column_id: impl Into<String>, pattern: Regex) -> Self {
        let column_id = column_id.into();
        Self::new(move |record| {
            record
                .get(&column_id)
                .is_some_and(|value| pattern.is_match(value))
        })
    }

    /// Identity of this filter.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Evaluates the predicate.
    #[inline]
    pub fn test(&self, record: &Record) -> bool {
        (self.predicate)(record)
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Filter {}

impl Hash for Filter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filter").field(&self.id).finish()
    }
}

/// Immutable snapshot of an ordered filter list.
///
/// A record passes when every filter accepts it. Filters run in list
/// order and evaluation stops at the first rejection.
#[derive(Debug, Clone)]
pub struct FilterChain {
    filters: Arc<[Filter]>,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self {
            filters: Arc::new([]),
        }
    }
}

impl FilterChain {
    /// Snapshot the given filters.
    pub fn new(filters: &[Filter]) -> Self {
        Self {
            filters: filters.into(),
        }
    }

    /// Check a record against every filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|f| f.test(record))
    }

    /// Number of filters in the chain.
    #[inline]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if the chain accepts everything.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Iterate the filters in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }
}
