//! Result frames returned by the driver and their row/column views.
//!
//! A [`ResultFrame`] is the raw, untyped result of one submission: column
//! metadata plus rows of [`Value`]s. Typed access happens through the borrowed
//! [`Row`] view and the processors in [`processor`].

pub mod processor;

use crate::error::PostProcessingError;
use crate::statement::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// CQL column type as reported in result metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CqlType {
    /// boolean
    Boolean,
    /// int (32-bit)
    Int,
    /// bigint (64-bit)
    BigInt,
    /// double
    Double,
    /// text / varchar
    Text,
    /// blob
    Blob,
    /// uuid / timeuuid
    Uuid,
    /// timestamp
    Timestamp,
}

impl fmt::Display for CqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CqlType::Boolean => "boolean",
            CqlType::Int => "int",
            CqlType::BigInt => "bigint",
            CqlType::Double => "double",
            CqlType::Text => "text",
            CqlType::Blob => "blob",
            CqlType::Uuid => "uuid",
            CqlType::Timestamp => "timestamp",
        };
        write!(f, "{}", name)
    }
}

/// Name and type of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// Column type
    pub data_type: CqlType,
}

impl ColumnSpec {
    /// Create a column spec.
    pub fn new(name: impl Into<String>, data_type: CqlType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Raw result of one submission: column metadata plus rows of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultFrame {
    columns: Vec<ColumnSpec>,
    rows: Vec<Vec<Value>>,
}

impl ResultFrame {
    /// Create a frame from columns and rows.
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Create an empty frame, as returned for acknowledged writes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the column metadata.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Number of rows in the frame.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrowed view of the row at `index`.
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// Iterate over borrowed row views.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// Concatenate frames row-wise, keeping the first non-empty frame's
    /// columns. Used for fan-out reads where every sub-result shares a shape.
    pub(crate) fn concat(frames: Vec<ResultFrame>) -> ResultFrame {
        let mut columns = Vec::new();
        let mut rows = Vec::new();
        for frame in frames {
            if columns.is_empty() && !frame.columns.is_empty() {
                columns = frame.columns;
            }
            rows.extend(frame.rows);
        }
        ResultFrame { columns, rows }
    }
}

/// Borrowed view of one result row with typed accessors.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [ColumnSpec],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    /// Number of values in the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a positional index.
    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index)
    }

    /// Value of the named column.
    pub fn get_by_name(&self, name: &str) -> Option<&'a Value> {
        let index = self.columns.iter().position(|c| c.name == name)?;
        self.values.get(index)
    }

    /// Value of the named column, or a `MissingColumn` error.
    pub fn try_get(&self, name: &str) -> Result<&'a Value, PostProcessingError> {
        self.get_by_name(name)
            .ok_or_else(|| PostProcessingError::MissingColumn(name.to_string()))
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: &'static str,
        extract: impl Fn(&Value) -> Option<T>,
    ) -> Result<T, PostProcessingError> {
        let value = self.try_get(name)?;
        extract(value).ok_or_else(|| PostProcessingError::TypeMismatch {
            column: name.to_string(),
            expected,
            found: value.type_name(),
        })
    }

    /// The named column as an i64 (accepts int, bigint, timestamp).
    pub fn i64(&self, name: &str) -> Result<i64, PostProcessingError> {
        self.typed(name, "bigint", Value::as_i64)
    }

    /// The named column as an f64.
    pub fn f64(&self, name: &str) -> Result<f64, PostProcessingError> {
        self.typed(name, "double", Value::as_f64)
    }

    /// The named column as a string slice.
    pub fn str(&self, name: &str) -> Result<&'a str, PostProcessingError> {
        let value = self.try_get(name)?;
        value.as_str().ok_or_else(|| PostProcessingError::TypeMismatch {
            column: name.to_string(),
            expected: "text",
            found: value.type_name(),
        })
    }

    /// The named column as a bool.
    pub fn bool(&self, name: &str) -> Result<bool, PostProcessingError> {
        self.typed(name, "boolean", Value::as_bool)
    }

    /// The named column as a UUID.
    pub fn uuid(&self, name: &str) -> Result<uuid::Uuid, PostProcessingError> {
        self.typed(name, "uuid", Value::as_uuid)
    }
}
