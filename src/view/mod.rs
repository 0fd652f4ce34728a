//! Indexed, filterable views over a record set.
//!
//! The grid never reads records for display directly. It pushes the
//! record set and the active filter chain into an [`IndexedView`] and
//! reads rows back by position. [`MemoryView`] is the in-memory
//! implementation; any other structure that honours the trait contract
//! can be plugged into [`DatasetGrid`](crate::DatasetGrid).

mod memory;

use std::sync::Arc;

pub use memory::MemoryView;

use crate::dataset::{Record, RowId};
use crate::filter::FilterChain;

/// Extracts the primary key of a record.
pub type KeyFn = fn(&Record) -> RowId;

/// Position-addressable projection of the records passing a filter chain.
///
/// Implementations must keep their visible rows equal to the records
/// accepted by the current chain, in record order, after every call to
/// [`replace_all`](Self::replace_all) or [`set_filter`](Self::set_filter).
pub trait IndexedView {
    /// Replace every item, keyed by `key`, and re-apply the current filter.
    fn replace_all(&mut self, records: Arc<[Record]>, key: KeyFn);

    /// Install a new filter chain and refresh the visible rows.
    fn set_filter(&mut self, chain: FilterChain);

    /// Number of visible rows.
    fn len(&self) -> usize;

    /// Visible row at a display position.
    fn item_at(&self, position: usize) -> Option<&Record>;

    /// Item by key, whether or not it is visible.
    fn item_by_key(&self, key: RowId) -> Option<&Record>;

    /// Display position of a key, `None` when filtered out or unknown.
    fn position_of(&self, key: RowId) -> Option<usize>;

    /// Close any pending batch and bring the visible rows up to date.
    ///
    /// Views that refresh eagerly have nothing to do.
    fn flush(&mut self) {}

    /// Check if no row is visible.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the visible rows in display order.
    fn rows(&self) -> impl Iterator<Item = &Record> {
        (0..self.len()).filter_map(move |position| self.item_at(position))
    }
}
