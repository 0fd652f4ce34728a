//! Error types for prepgrid.

/// Result type alias for prepgrid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in grid operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A query was made before any dataset was loaded.
    #[error("No dataset loaded")]
    DatasetNotLoaded,

    /// Column not found in the loaded schema.
    #[error("Column '{name}' not found in schema")]
    ColumnNotFound {
        /// The id of the missing column.
        name: String,
    },

    /// Filter is not part of the active filter list.
    #[error("Filter #{id} is not active")]
    FilterNotFound {
        /// The identity of the missing filter.
        id: u64,
    },

    /// Payload or configuration could not be decoded.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },

    /// Arrow column type with no text representation.
    #[error("Unsupported Arrow type: {type_name}")]
    UnsupportedType {
        /// The unsupported type name.
        type_name: String,
    },

    /// Arrow error while building an export batch.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },
}

impl Error {
    /// Create a column not found error.
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}
