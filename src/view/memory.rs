//! In-memory indexed view.

use std::collections::HashMap;
use std::sync::Arc;

use super::{IndexedView, KeyFn};
use crate::dataset::{Record, RowId};
use crate::filter::FilterChain;

/// Indexed view keeping visible record indices in a vector
///
/// Refreshes are eager: every mutation recomputes the visible rows unless
/// it happens between [`begin_update`](Self::begin_update) and
/// [`end_update`](Self::end_update), in which case a single refresh runs
/// when the batch ends.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use prepgrid::{Filter, FilterChain, IndexedView, MemoryView, Record};
///
/// let mut view = MemoryView::new();
/// view.replace_all(
///     Arc::from(vec![Record::from_pairs([("a", "x")]), Record::from_pairs([("a", "y")])]),
///     Record::tdp_id,
/// );
/// view.set_filter(FilterChain::new(&[Filter::equals("a", "y")]));
/// assert_eq!(view.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryView {
    /// All items in load order
    records: Arc<[Record]>,
    /// Key to index in `records`
    key_index: HashMap<RowId, usize>,
    /// Active filter chain
    filter: FilterChain,
    /// Indices in `records` of the visible rows
    visible: Vec<usize>,
    /// Key to display position
    positions: HashMap<RowId, usize>,
    /// Key extractor of the last load
    key: Option<KeyFn>,
    /// Batch nesting depth
    suspended: usize,
    /// Refresh requested while suspended
    dirty: bool,
}

impl Default for MemoryView {
    fn default() -> Self {
        Self {
            records: Arc::new([]),
            key_index: HashMap::new(),
            filter: FilterChain::default(),
            visible: Vec::new(),
            positions: HashMap::new(),
            key: None,
            suspended: 0,
            dirty: false,
        }
    }
}

impl MemoryView {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a batch of mutations; refreshes are deferred until the
    /// matching [`end_update`](Self::end_update).
    pub fn begin_update(&mut self) {
        self.suspended += 1;
    }

    /// End a batch and run the deferred refresh, if any.
    pub fn end_update(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
        if self.suspended == 0 && self.dirty {
            self.refresh();
        }
    }

    /// Every item, visible or not, in load order.
    pub fn items(&self) -> &[Record] {
        &self.records
    }

    /// Active filter chain.
    pub fn filter(&self) -> &FilterChain {
        &self.filter
    }

    fn refresh(&mut self) {
        if self.suspended > 0 {
            self.dirty = true;
            return;
        }
        self.dirty = false;

        self.visible.clear();
        self.positions.clear();
        for (index, record) in self.records.iter().enumerate() {
            if self.filter.matches(record) {
                if let Some(key) = self.key {
                    self.positions.insert(key(record), self.visible.len());
                }
                self.visible.push(index);
            }
        }

        tracing::trace!(
            total = self.records.len(),
            visible = self.visible.len(),
            filters = self.filter.len(),
            "view refreshed"
        );
    }
}

impl IndexedView for MemoryView {
    fn replace_all(&mut self, records: Arc<[Record]>, key: KeyFn) {
        self.key_index = records
            .iter()
            .enumerate()
            .map(|(index, record)| (key(record), index))
            .collect();
        self.records = records;
        self.key = Some(key);
        self.refresh();
    }

    fn set_filter(&mut self, chain: FilterChain) {
        self.filter = chain;
        self.refresh();
    }

    fn flush(&mut self) {
        self.suspended = 0;
        if self.dirty {
            self.refresh();
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.visible.len()
    }

    fn item_at(&self, position: usize) -> Option<&Record> {
        self.visible
            .get(position)
            .and_then(|&index| self.records.get(index))
    }

    fn item_by_key(&self, key: RowId) -> Option<&Record> {
        self.key_index
            .get(&key)
            .and_then(|&index| self.records.get(index))
    }

    fn position_of(&self, key: RowId) -> Option<usize> {
        self.positions.get(&key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;

    fn create_test_records(rows: usize) -> Arc<[Record]> {
        (0..rows)
            .map(|i| {
                let mut record = Record::from_pairs([("id", format!("id_{i}"))]);
                record.set_tdp_id(i);
                record
            })
            .collect()
    }

    fn create_test_view(rows: usize) -> MemoryView {
        let mut view = MemoryView::new();
        view.replace_all(create_test_records(rows), Record::tdp_id);
        view
    }

    #[test]
    fn test_view_empty() {
        let view = MemoryView::new();
        assert!(view.is_empty());
        assert!(view.item_at(0).is_none());
        assert!(view.item_by_key(0).is_none());
    }

    #[test]
    fn test_view_replace_all() {
        let view = create_test_view(10);
        assert_eq!(view.len(), 10);
        assert_eq!(view.item_at(3).and_then(|r| r.get("id")), Some("id_3"));
        assert!(view.item_at(10).is_none());
        assert_eq!(view.items().len(), 10);
    }

    #[test]
    fn test_view_filter_positions() {
        let mut view = create_test_view(10);
        view.set_filter(FilterChain::new(&[Filter::new(|r| r.tdp_id() % 2 == 1)]));
        assert_eq!(view.len(), 5);
        assert_eq!(view.item_at(0).map(Record::tdp_id), Some(1));
        assert_eq!(view.position_of(7), Some(3));
        assert_eq!(view.position_of(4), None);
        assert_eq!(view.item_by_key(4).map(Record::tdp_id), Some(4));
    }

    #[test]
    fn test_view_replace_keeps_filter() {
        let mut view = create_test_view(4);
        view.set_filter(FilterChain::new(&[Filter::equals("id", "id_2")]));
        view.replace_all(create_test_records(6), Record::tdp_id);
        assert_eq!(view.len(), 1);
        assert_eq!(view.filter().len(), 1);
    }

    #[test]
    fn test_view_rows_iter() {
        let mut view = create_test_view(6);
        view.set_filter(FilterChain::new(&[Filter::new(|r| r.tdp_id() >= 4)]));
        let ids: Vec<RowId> = view.rows().map(Record::tdp_id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn test_view_batched_update_defers_refresh() {
        let mut view = create_test_view(5);
        view.begin_update();
        view.set_filter(FilterChain::new(&[Filter::new(|_| false)]));
        assert_eq!(view.len(), 5);
        view.end_update();
        assert_eq!(view.len(), 0);
    }

    #[test]
    fn test_view_nested_batches() {
        let mut view = create_test_view(5);
        view.begin_update();
        view.begin_update();
        view.set_filter(FilterChain::new(&[Filter::new(|_| false)]));
        view.end_update();
        assert_eq!(view.len(), 5);
        view.end_update();
        assert_eq!(view.len(), 0);
    }

    #[test]
    fn test_view_flush_closes_open_batch() {
        let mut view = create_test_view(5);
        view.begin_update();
        view.set_filter(FilterChain::new(&[Filter::new(|r| r.tdp_id() < 2)]));
        view.flush();
        assert_eq!(view.len(), 2);
        view.set_filter(FilterChain::default());
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn test_view_unbalanced_end_update() {
        let mut view = create_test_view(2);
        view.end_update();
        view.set_filter(FilterChain::default());
        assert_eq!(view.len(), 2);
    }
}
