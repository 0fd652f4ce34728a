//! The dataset grid: loaded dataset, filter list and indexed view.
//!
//! [`DatasetGrid`] owns one dataset at a time. Every mutation (a new
//! dataset, new records, any filter change) rebuilds the view before it
//! returns, so reads always see exactly the records passing every active
//! filter.
//!
//! # Example
//!
//! ```
//! use prepgrid::{Column, Data, DatasetGrid, Filter, Metadata, Record};
//!
//! let mut grid = DatasetGrid::new();
//! grid.set_dataset(
//!     Metadata::default(),
//!     Data::new(
//!         vec![Column::new("city", "string")],
//!         vec![
//!             Record::from_pairs([("city", "Nantes")]),
//!             Record::from_pairs([("city", "Paris")]),
//!         ],
//!     ),
//! );
//!
//! grid.add_filter(Filter::equals("city", "Paris"));
//! assert_eq!(grid.len(), 1);
//! assert_eq!(grid.rows_containing("city", "ar").unwrap(), vec![0]);
//! ```

use std::sync::Arc;

use arrow::array::RecordBatch;
use regex::Regex;

use crate::config::GridConfig;
use crate::dataset::{records_to_batch, Column, ColumnType, Data, DatasetPayload, Metadata, Record, RowId};
use crate::error::{Error, Result};
use crate::filter::{Filter, FilterChain};
use crate::view::{IndexedView, MemoryView};

/// State of a loaded dataset.
#[derive(Debug, Clone)]
struct Loaded {
    metadata: Metadata,
    columns: Vec<Column>,
    records: Arc<[Record]>,
}

/// Grid and filter engine over one dataset
///
/// The grid starts with no dataset; queries fail with
/// [`Error::DatasetNotLoaded`] until [`set_dataset`](Self::set_dataset) or
/// [`load_payload`](Self::load_payload) is called. Filters can be managed
/// at any time.
#[derive(Debug)]
pub struct DatasetGrid<V: IndexedView = MemoryView> {
    /// Engine settings
    config: GridConfig,
    /// Current dataset, if any
    dataset: Option<Loaded>,
    /// Filtered projection of the records
    view: V,
    /// Active filters in evaluation order
    filters: Vec<Filter>,
    /// Selected column
    selected_column: Option<Column>,
}

impl DatasetGrid<MemoryView> {
    /// Create a grid with default settings and an in-memory view.
    pub fn new() -> Self {
        Self::with_config(GridConfig::default())
    }

    /// Create a grid with the given settings and an in-memory view.
    pub fn with_config(config: GridConfig) -> Self {
        Self::with_view(MemoryView::new(), config)
    }
}

impl Default for DatasetGrid<MemoryView> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: IndexedView> DatasetGrid<V> {
    /// Create a grid backed by a custom view implementation.
    ///
    /// Any update batch left open on `view` is closed first.
    pub fn with_view(mut view: V, config: GridConfig) -> Self {
        view.flush();
        Self {
            config,
            dataset: None,
            view,
            filters: Vec::new(),
            selected_column: None,
        }
    }

    // ------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------

    /// Replace metadata, columns and records.
    ///
    /// Records get `tdpId` 0..n-1 by position, overwriting any previous
    /// id, and the view is rebuilt. Active filters and the selected
    /// column are kept.
    pub fn set_dataset(&mut self, metadata: Metadata, data: Data) {
        tracing::debug!(
            dataset = metadata.id().unwrap_or_default(),
            columns = data.columns.len(),
            records = data.records.len(),
            "loading dataset"
        );

        let records = self.load_records(data.records);
        self.dataset = Some(Loaded {
            metadata,
            columns: data.columns,
            records,
        });
    }

    /// Load a decoded dataset payload.
    pub fn load_payload(&mut self, payload: DatasetPayload) {
        self.set_dataset(payload.metadata, payload.data);
    }

    /// Replace the records, keeping metadata and columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetNotLoaded`] if no dataset is loaded.
    pub fn update_records(&mut self, records: Vec<Record>) -> Result<()> {
        if self.dataset.is_none() {
            return Err(Error::DatasetNotLoaded);
        }

        tracing::debug!(records = records.len(), "updating records");
        let records = self.load_records(records);
        if let Some(loaded) = self.dataset.as_mut() {
            loaded.records = records;
        }
        Ok(())
    }

    fn load_records(&mut self, mut records: Vec<Record>) -> Arc<[Record]> {
        for (index, record) in records.iter_mut().enumerate() {
            record.set_tdp_id(index);
        }
        let records: Arc<[Record]> = records.into();
        self.view.replace_all(Arc::clone(&records), Record::tdp_id);
        records
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.dataset.as_ref().ok_or(Error::DatasetNotLoaded)
    }

    // ------------------------------------------------------------------
    // Data utils
    // ------------------------------------------------------------------

    /// Column ids in display order, optionally without numeric and/or
    /// boolean columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetNotLoaded`] if no dataset is loaded.
    pub fn columns(&self, exclude_numeric: bool, exclude_boolean: bool) -> Result<Vec<String>> {
        let loaded = self.loaded()?;
        Ok(loaded
            .columns
            .iter()
            .filter(|c| !(exclude_numeric && self.config.is_numeric(&c.column_type)))
            .filter(|c| !(exclude_boolean && c.column_type == ColumnType::Boolean))
            .map(|c| c.id.clone())
            .collect())
    }

    /// Ids of the columns holding at least one cell that matches `pattern`.
    ///
    /// Cells are lower-cased before matching (see
    /// [`GridConfig::lowercase_cells`]), so the pattern should be written in
    /// lower case. Records are scanned in load order, ignoring filters; a
    /// column leaves the candidate set at its first match and the scan ends
    /// once no candidate is left. Results come in order of first match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetNotLoaded`] if no dataset is loaded.
    pub fn columns_containing(
        &self,
        pattern: &Regex,
        can_be_numeric: bool,
        can_be_boolean: bool,
    ) -> Result<Vec<String>> {
        let lowercase = self.config.lowercase_cells;
        self.scan_columns(can_be_numeric, can_be_boolean, |value| {
            if lowercase {
                pattern.is_match(&value.to_lowercase())
            } else {
                pattern.is_match(value)
            }
        })
    }

    /// Same scan as [`columns_containing`](Self::columns_containing) with a
    /// case-insensitive literal substring instead of a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetNotLoaded`] if no dataset is loaded.
    pub fn columns_containing_term(
        &self,
        term: &str,
        can_be_numeric: bool,
        can_be_boolean: bool,
    ) -> Result<Vec<String>> {
        let term = term.to_lowercase();
        self.scan_columns(can_be_numeric, can_be_boolean, |value| {
            value.to_lowercase().contains(term.as_str())
        })
    }

    fn scan_columns(
        &self,
        can_be_numeric: bool,
        can_be_boolean: bool,
        matches: impl Fn(&str) -> bool,
    ) -> Result<Vec<String>> {
        let loaded = self.loaded()?;
        let mut candidates = self.columns(!can_be_numeric, !can_be_boolean)?;
        let mut results = Vec::new();

        let mut scanned = 0usize;
        for record in loaded.records.iter() {
            if candidates.is_empty() {
                break;
            }
            scanned += 1;
            candidates.retain(|column_id| {
                let matched = record.get(column_id).is_some_and(&matches);
                if matched {
                    results.push(column_id.clone());
                }
                !matched
            });
        }

        tracing::trace!(scanned, found = results.len(), "column search");
        Ok(results)
    }

    /// Display positions of the visible rows whose cell contains `term`.
    ///
    /// An empty `term` selects rows whose cell is exactly empty. Matching is
    /// case-sensitive and runs over the filtered view, not the raw records.
    /// Rows without the cell never match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetNotLoaded`] if no dataset is loaded, or
    /// [`Error::ColumnNotFound`] if the column is not in the schema.
    pub fn rows_containing(&self, column_id: &str, term: &str) -> Result<Vec<usize>> {
        let loaded = self.loaded()?;
        if !loaded.columns.iter().any(|c| c.id == column_id) {
            return Err(Error::column_not_found(column_id));
        }

        let positions: Vec<usize> = (0..self.view.len())
            .filter(|&position| {
                self.view
                    .item_at(position)
                    .and_then(|record| record.get(column_id))
                    .is_some_and(|value| {
                        if term.is_empty() {
                            value.is_empty()
                        } else {
                            value.contains(term)
                        }
                    })
            })
            .collect();

        tracing::trace!(column = column_id, found = positions.len(), "row search");
        Ok(positions)
    }

    /// Select the first column with the given id.
    ///
    /// Clears the selection when no such column exists or no dataset is
    /// loaded.
    pub fn set_selected_column(&mut self, column_id: &str) -> Option<&Column> {
        self.selected_column = self
            .dataset
            .as_ref()
            .and_then(|loaded| loaded.columns.iter().find(|c| c.id == column_id))
            .cloned();
        self.selected_column.as_ref()
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Append a filter and refresh the view.
    pub fn add_filter(&mut self, filter: Filter) {
        tracing::debug!(filter = filter.id(), "adding filter");
        self.filters.push(filter);
        self.refresh_filters();
    }

    /// Replace `old` in place with `new` and refresh the view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FilterNotFound`] if `old` is not active; the filter
    /// list and the view are left untouched.
    pub fn update_filter(&mut self, old: &Filter, new: Filter) -> Result<()> {
        let Some(index) = self.filters.iter().position(|f| f == old) else {
            tracing::warn!(filter = old.id(), "cannot update inactive filter");
            return Err(Error::FilterNotFound { id: old.id() });
        };

        tracing::debug!(old = old.id(), new = new.id(), "updating filter");
        self.filters[index] = new;
        self.refresh_filters();
        Ok(())
    }

    /// Remove the first occurrence of `filter` and refresh the view.
    ///
    /// Returns `false`, without touching the view, if the filter is not
    /// active.
    pub fn remove_filter(&mut self, filter: &Filter) -> bool {
        let Some(index) = self.filters.iter().position(|f| f == filter) else {
            return false;
        };

        tracing::debug!(filter = filter.id(), "removing filter");
        self.filters.remove(index);
        self.refresh_filters();
        true
    }

    /// Remove every filter and refresh the view.
    pub fn reset_filters(&mut self) {
        tracing::debug!(count = self.filters.len(), "resetting filters");
        self.filters.clear();
        self.refresh_filters();
    }

    fn refresh_filters(&mut self) {
        self.view.set_filter(FilterChain::new(&self.filters));
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Check if a dataset is loaded.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// Metadata of the loaded dataset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetNotLoaded`] if no dataset is loaded.
    pub fn metadata(&self) -> Result<&Metadata> {
        Ok(&self.loaded()?.metadata)
    }

    /// Column schema of the loaded dataset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetNotLoaded`] if no dataset is loaded.
    pub fn schema(&self) -> Result<&[Column]> {
        Ok(&self.loaded()?.columns)
    }

    /// All records in load order, ignoring filters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetNotLoaded`] if no dataset is loaded.
    pub fn records(&self) -> Result<&[Record]> {
        Ok(&self.loaded()?.records)
    }

    /// Active filters in evaluation order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Selected column.
    pub fn selected_column(&self) -> Option<&Column> {
        self.selected_column.as_ref()
    }

    /// The backing view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Engine settings.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Number of visible rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.view.len()
    }

    /// Check if no row is visible.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Visible row at a display position.
    pub fn row_at(&self, position: usize) -> Option<&Record> {
        self.view.item_at(position)
    }

    /// Record by id, visible or not.
    pub fn row_by_id(&self, id: RowId) -> Option<&Record> {
        self.view.item_by_key(id)
    }

    /// Display position of a record id, `None` when filtered out.
    pub fn position_of(&self, id: RowId) -> Option<usize> {
        self.view.position_of(id)
    }

    /// Export the visible rows as an Arrow batch.
    ///
    /// The batch starts with the id column named by
    /// [`GridConfig::id_field`], followed by one `Utf8` column per schema
    /// column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatasetNotLoaded`] if no dataset is loaded, or
    /// [`Error::Arrow`] if the batch cannot be built.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let loaded = self.loaded()?;
        records_to_batch(&loaded.columns, self.view.rows(), &self.config.id_field)
    }
}
