//! Grid configuration.

use serde::{Deserialize, Serialize};

use crate::dataset::{ColumnType, TDP_ID};
use crate::error::{Error, Result};

/// Settings of a [`DatasetGrid`](crate::DatasetGrid).
///
/// # Example
///
/// ```
/// use prepgrid::{ColumnType, GridConfig};
///
/// let config = GridConfig::default()
///     .numeric_types([ColumnType::Integer, ColumnType::Double])
///     .id_field("rowId");
/// assert!(config.is_numeric(&ColumnType::Double));
/// assert!(!config.is_numeric(&ColumnType::Float));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Types dropped from column lists when numeric columns are excluded
    pub numeric_types: Vec<ColumnType>,
    /// Lower-case cells before matching them in column search
    pub lowercase_cells: bool,
    /// Name of the record id column in exports
    pub id_field: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            numeric_types: ColumnType::NUMERIC.to_vec(),
            lowercase_cells: true,
            id_field: TDP_ID.to_string(),
        }
    }
}

impl GridConfig {
    /// Parse a configuration from JSON; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on malformed JSON and
    /// [`Error::InvalidConfig`] if the result fails [`validate`](Self::validate).
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for unusable values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `id_field` is empty.
    pub fn validate(&self) -> Result<()> {
        if self.id_field.is_empty() {
            return Err(Error::invalid_config("id_field must not be empty"));
        }
        Ok(())
    }

    /// Set the numeric type set.
    #[must_use]
    pub fn numeric_types(mut self, types: impl IntoIterator<Item = ColumnType>) -> Self {
        self.numeric_types = types.into_iter().collect();
        self
    }

    /// Enable or disable cell lower-casing in column search.
    #[must_use]
    pub fn lowercase_cells(mut self, enabled: bool) -> Self {
        self.lowercase_cells = enabled;
        self
    }

    /// Set the id column name used in exports.
    #[must_use]
    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.id_field = name.into();
        self
    }

    /// Check if a type belongs to the numeric set.
    pub fn is_numeric(&self, column_type: &ColumnType) -> bool {
        self.numeric_types.contains(column_type)
    }
}
