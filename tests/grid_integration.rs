//! Integration tests for the dataset grid public API.
//!
//! Drives a grid the way a grid widget does: load a payload, push filters
//! from search widgets, query columns and rows, export the view.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use arrow::array::{AsArray, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use prepgrid::{
    Column, Data, DatasetGrid, DatasetPayload, Error, Filter, GridConfig, IndexedView, Metadata,
    Record,
};
use regex::Regex;

// ============================================================================
// Test Helpers
// ============================================================================

const PAYLOAD: &str = r#"{
    "metadata": {"id": "6d3b", "name": "customers", "author": "anonymousUser"},
    "data": {
        "columns": [
            {"id": "0000", "name": "id", "type": "integer"},
            {"id": "0001", "name": "firstname", "type": "string"},
            {"id": "0002", "name": "state", "type": "string"},
            {"id": "0003", "name": "active", "type": "boolean"},
            {"id": "0004", "name": "balance", "type": "double"}
        ],
        "records": [
            {"0000": "1", "0001": "Grover", "0002": "Texas", "0003": "true", "0004": "10.5"},
            {"0000": "2", "0001": "Warren", "0002": "", "0003": "false", "0004": "0"},
            {"0000": "3", "0001": "Herbert", "0002": "Ohio", "0003": "true", "0004": "42.0"},
            {"0000": "4", "0001": "Calvin", "0002": "Vermont", "0003": "false", "0004": "7"},
            {"0000": "5", "0001": "Lyndon", "0002": "", "0003": "true", "0004": "3.25"}
        ]
    }
}"#;

fn create_test_grid() -> DatasetGrid {
    let mut grid = DatasetGrid::new();
    grid.load_payload(DatasetPayload::from_json(PAYLOAD).unwrap());
    grid
}

fn visible_ids(grid: &DatasetGrid) -> Vec<usize> {
    grid.view().rows().map(Record::tdp_id).collect()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_payload_ids_match_positions() {
    let grid = create_test_grid();
    assert_eq!(grid.len(), 5);
    assert_eq!(visible_ids(&grid), vec![0, 1, 2, 3, 4]);
    assert_eq!(grid.metadata().unwrap().id(), Some("6d3b"));
}

#[test]
fn test_reload_replaces_everything() {
    let mut grid = create_test_grid();
    grid.set_selected_column("0001");
    grid.set_dataset(
        Metadata::new(serde_json::json!({"id": "other"})),
        Data::new(
            vec![Column::new("x", "string")],
            vec![Record::from_pairs([("x", "1")])],
        ),
    );
    assert_eq!(grid.len(), 1);
    assert_eq!(grid.columns(false, false).unwrap(), vec!["x"]);
    assert_eq!(grid.metadata().unwrap().id(), Some("other"));
}

#[test]
fn test_load_from_record_batch() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("city", DataType::Utf8, true),
        Field::new("population", DataType::Int64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec![Some("Nantes"), None, Some("Lyon")])),
            Arc::new(Int64Array::from(vec![320_000, 1, 520_000])),
        ],
    )
    .unwrap();

    let mut grid = DatasetGrid::new();
    grid.set_dataset(Metadata::default(), Data::from_record_batch(&batch).unwrap());

    assert_eq!(grid.columns(true, true).unwrap(), vec!["city"]);
    assert_eq!(grid.rows_containing("city", "").unwrap(), vec![1]);
    assert_eq!(
        grid.columns_containing_term("000", true, true).unwrap(),
        vec!["population"]
    );
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn test_columns_containing_pattern() {
    let grid = create_test_grid();
    let pattern = Regex::new("^[a-z]+$").unwrap();
    // the first row matches firstname, state and active, none of the others
    // ever match
    assert_eq!(
        grid.columns_containing(&pattern, true, true).unwrap(),
        vec!["0001", "0002", "0003"]
    );
    assert_eq!(
        grid.columns_containing(&pattern, true, false).unwrap(),
        vec!["0001", "0002"]
    );
}

#[test]
fn test_columns_containing_term_numeric() {
    let grid = create_test_grid();
    assert_eq!(
        grid.columns_containing_term(".", true, false).unwrap(),
        vec!["0004"]
    );
    assert!(grid.columns_containing_term(".", false, false).unwrap().is_empty());
}

#[test]
fn test_rows_containing_after_filter() {
    let mut grid = create_test_grid();
    assert_eq!(grid.rows_containing("0002", "").unwrap(), vec![1, 4]);

    grid.add_filter(Filter::equals("0003", "true"));
    assert_eq!(visible_ids(&grid), vec![0, 2, 4]);
    assert_eq!(grid.rows_containing("0002", "").unwrap(), vec![2]);
    assert_eq!(grid.rows_containing("0001", "er").unwrap(), vec![0, 1]);
}

#[test]
fn test_rows_containing_unknown_column() {
    let grid = create_test_grid();
    assert!(matches!(
        grid.rows_containing("9999", ""),
        Err(Error::ColumnNotFound { .. })
    ));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_filter_lifecycle() {
    let mut grid = create_test_grid();
    let active = Filter::equals("0003", "true");
    let texan = Filter::contains("0002", "Tex");

    grid.add_filter(active.clone());
    grid.add_filter(texan.clone());
    assert_eq!(visible_ids(&grid), vec![0]);

    let ohio = Filter::contains("0002", "Ohio");
    grid.update_filter(&texan, ohio.clone()).unwrap();
    assert_eq!(visible_ids(&grid), vec![2]);

    // the replaced filter is gone
    assert!(!grid.remove_filter(&texan));
    assert!(matches!(
        grid.update_filter(&texan, Filter::new(|_| true)),
        Err(Error::FilterNotFound { .. })
    ));

    assert!(grid.remove_filter(&ohio));
    assert_eq!(visible_ids(&grid), vec![0, 2, 4]);

    grid.reset_filters();
    assert_eq!(visible_ids(&grid), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_filter_order_independent() {
    let mut forward = create_test_grid();
    forward.add_filter(Filter::equals("0003", "false"));
    forward.add_filter(Filter::contains("0001", "n"));

    let mut backward = create_test_grid();
    backward.add_filter(Filter::contains("0001", "n"));
    backward.add_filter(Filter::equals("0003", "false"));

    assert_eq!(visible_ids(&forward), visible_ids(&backward));
    assert_eq!(visible_ids(&forward), vec![1, 3]);
}

#[test]
fn test_reset_matches_fresh_grid() {
    let mut grid = create_test_grid();
    grid.add_filter(Filter::new(|_| false));
    grid.reset_filters();

    let fresh = create_test_grid();
    assert_eq!(
        grid.rows_containing("0001", "o").unwrap(),
        fresh.rows_containing("0001", "o").unwrap()
    );
    assert_eq!(grid.len(), fresh.len());
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_filtered_view() {
    let mut grid = create_test_grid();
    grid.add_filter(Filter::empty("0002"));
    let batch = grid.to_record_batch().unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 6);
    let ids = batch.column(0).as_primitive::<arrow::datatypes::UInt64Type>();
    assert_eq!(ids.values().to_vec(), vec![1, 4]);
    let names = batch.column(2).as_string::<i32>();
    assert_eq!(names.value(1), "Lyndon");
}

#[test]
fn test_export_custom_id_field() {
    let config = GridConfig::from_json(r#"{"id_field": "rowId"}"#).unwrap();
    let mut grid = DatasetGrid::with_config(config);
    grid.load_payload(DatasetPayload::from_json(PAYLOAD).unwrap());
    let batch = grid.to_record_batch().unwrap();
    assert_eq!(batch.schema().field(0).name(), "rowId");
}
