//! prepgrid - Dataset grid and filter engine
//!
//! Holds one dataset (opaque metadata, a column schema and text records)
//! behind an indexed, filterable view, and answers the column and row
//! searches a data preparation grid needs.
//!
//! # Design Principles
//!
//! 1. **Always consistent** - every mutation rebuilds the view before it
//!    returns
//! 2. **Identity filters** - filters are handles, replaced and removed by
//!    identity
//! 3. **Pluggable view** - any [`IndexedView`] can back the grid
//! 4. **Arrow interop** - import from and export to `RecordBatch`
//!
//! # Quick Start
//!
//! ```
//! use prepgrid::{DatasetGrid, DatasetPayload, Filter};
//!
//! let payload = DatasetPayload::from_json(
//!     r#"{
//!         "metadata": {"id": "ds-1", "name": "customers"},
//!         "data": {
//!             "columns": [{"id": "0000", "type": "string"}, {"id": "0001", "type": "integer"}],
//!             "records": [{"0000": "Nantes", "0001": "44"}, {"0000": "", "0001": "75"}]
//!         }
//!     }"#,
//! )
//! .unwrap();
//!
//! let mut grid = DatasetGrid::new();
//! grid.load_payload(payload);
//!
//! assert_eq!(grid.columns(true, false).unwrap(), vec!["0000"]);
//! assert_eq!(grid.rows_containing("0000", "").unwrap(), vec![1]);
//!
//! let non_empty = Filter::new(|r| r.get("0000") != Some(""));
//! grid.add_filter(non_empty.clone());
//! assert_eq!(grid.len(), 1);
//! grid.remove_filter(&non_empty);
//! assert_eq!(grid.len(), 2);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::redundant_clone,
        clippy::too_many_lines
    )
)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod grid;
pub mod view;

// Re-exports for convenience
pub use arrow::array::RecordBatch;
pub use config::GridConfig;
pub use dataset::{Column, ColumnType, Data, DatasetPayload, Metadata, Record, RowId, TDP_ID};
pub use error::{Error, Result};
pub use filter::{Filter, FilterChain, Predicate};
pub use grid::DatasetGrid;
pub use view::{IndexedView, KeyFn, MemoryView};
