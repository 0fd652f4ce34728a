//! Dataset model: metadata, column schema and records.
//!
//! A dataset arrives as a JSON payload of the form
//!
//! ```text
//! { "metadata": {...}, "data": { "columns": [{"id": "0000", "type": "string"}], "records": [{"0000": "a"}] } }
//! ```
//!
//! Cell values are kept as text. The grid assigns each record a synthetic
//! `tdpId` when the records are loaded.

mod batch;

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use self::batch::records_to_batch;
use crate::error::Result;

/// Name of the synthetic record id key.
///
/// Inside a [`Data`] payload the key is only dropped from records when no
/// schema column carries this id. A [`Record`] decoded on its own always
/// drops it.
pub const TDP_ID: &str = "tdpId";

/// Synthetic record id, the 0-based position of the record in its load.
pub type RowId = usize;

/// Opaque dataset descriptor, stored and handed back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(serde_json::Value);

impl Metadata {
    /// Wrap a raw JSON descriptor.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Dataset id, when the descriptor carries one.
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(serde_json::Value::as_str)
    }

    /// Dataset name, when the descriptor carries one.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(serde_json::Value::as_str)
    }

    /// The raw descriptor.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for Metadata {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Column domain type as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    /// Generic number
    Numeric,
    /// Integer number
    Integer,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// true/false
    Boolean,
    /// Free text
    String,
    /// Calendar date
    Date,
    /// Any other type name, kept verbatim
    Other(String),
}

impl ColumnType {
    /// Types excluded from numeric-free column lists by default.
    pub const NUMERIC: [ColumnType; 4] = [
        ColumnType::Numeric,
        ColumnType::Integer,
        ColumnType::Float,
        ColumnType::Double,
    ];

    /// Wire name of the type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Numeric => "numeric",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Date => "date",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ColumnType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "numeric" => Self::Numeric,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "double" => Self::Double,
            "boolean" => Self::Boolean,
            "string" => Self::String,
            "date" => Self::Date,
            _ => Self::Other(name),
        }
    }
}

impl From<&str> for ColumnType {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<ColumnType> for String {
    fn from(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of the dataset schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column id, the key used in records
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Domain type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    /// Create a column without display name.
    pub fn new(id: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        Self {
            id: id.into(),
            name: None,
            column_type: column_type.into(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// One dataset row: column id to text value, plus its synthetic id.
///
/// Values are ordered by column id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    tdp_id: RowId,
    values: BTreeMap<String, String>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record from `(column id, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            tdp_id: 0,
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Synthetic id assigned on the last load.
    #[inline]
    pub fn tdp_id(&self) -> RowId {
        self.tdp_id
    }

    pub(crate) fn set_tdp_id(&mut self, id: RowId) {
        self.tdp_id = id;
    }

    /// Value of a cell, `None` when the record has no such column.
    pub fn get(&self, column_id: &str) -> Option<&str> {
        self.values.get(column_id).map(String::as_str)
    }

    /// Set a cell value.
    pub fn set(&mut self, column_id: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(column_id.into(), value.into());
        self
    }

    /// Iterate `(column id, value)` pairs in column id order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the record has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Record {
    /// Build a record from raw JSON cells, keeping a `tdpId` cell only when
    /// it is a real column.
    fn from_json_cells(raw: BTreeMap<String, serde_json::Value>, keep_id_cell: bool) -> Self {
        let values = raw
            .into_iter()
            .filter(|(k, _)| keep_id_cell || k != TDP_ID)
            .map(|(k, v)| (k, cell_text(v)))
            .collect();
        Self { tdp_id: 0, values }
    }
}

impl Serialize for Record {
    /// The synthetic id is written under [`TDP_ID`] unless a cell already
    /// uses that key.
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let has_id_cell = self.values.contains_key(TDP_ID);
        let mut map = serializer.serialize_map(Some(self.values.len() + usize::from(!has_id_cell)))?;
        for (k, v) in &self.values {
            map.serialize_entry(k, v)?;
        }
        if !has_id_cell {
            map.serialize_entry(TDP_ID, &self.tdp_id)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_json_cells(raw, false))
    }
}

/// Text form of a JSON cell value.
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Column schema and records of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawData")]
pub struct Data {
    /// Columns in display order
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Records in load order
    #[serde(default)]
    pub records: Vec<Record>,
}

/// Wire form of [`Data`], decoded before the schema is known.
#[derive(Deserialize)]
struct RawData {
    #[serde(default)]
    columns: Vec<Column>,
    #[serde(default)]
    records: Vec<BTreeMap<String, serde_json::Value>>,
}

impl From<RawData> for Data {
    fn from(raw: RawData) -> Self {
        let keep_id_cell = raw.columns.iter().any(|c| c.id == TDP_ID);
        let records = raw
            .records
            .into_iter()
            .map(|cells| Record::from_json_cells(cells, keep_id_cell))
            .collect();
        Self {
            columns: raw.columns,
            records,
        }
    }
}

impl Data {
    /// Create a dataset body.
    pub fn new(columns: Vec<Column>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }
}

/// A full dataset payload as delivered by the dataset service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetPayload {
    /// Dataset descriptor
    #[serde(default)]
    pub metadata: Metadata,
    /// Schema and records
    pub data: Data,
}

impl DatasetPayload {
    /// Decode a payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](crate::Error::Parse) if the text is not a valid payload.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode a payload from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](crate::Error::Parse) if the bytes are not a valid payload.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
