//! Pluggable transformation from a raw result frame to a typed value.
//!
//! Every operation kind routes its frame through exactly one
//! [`ResultProcessor`]. A processor failure fails the whole operation and
//! travels the same failure channel as a network failure.

use crate::error::PostProcessingError;
use crate::result::{ResultFrame, Row};
use crate::statement::Value;
use std::collections::HashMap;
use std::marker::PhantomData;

/// Transforms one raw result frame into the operation's value.
pub trait ResultProcessor<T>: Send + Sync {
    /// Transform the frame.
    ///
    /// # Errors
    ///
    /// Any [`PostProcessingError`] fails the operation that produced the
    /// frame.
    fn process(&self, frame: ResultFrame) -> Result<T, PostProcessingError>;
}

/// Closures compose directly as processors.
impl<T, F> ResultProcessor<T> for F
where
    F: Fn(ResultFrame) -> Result<T, PostProcessingError> + Send + Sync,
{
    fn process(&self, frame: ResultFrame) -> Result<T, PostProcessingError> {
        self(frame)
    }
}

/// Maps one result row to a typed value.
///
/// Supplied by the surrounding entity-mapping layer; this crate only invokes
/// it row by row.
pub trait RowMapper<T>: Send + Sync {
    /// Map a single row.
    fn map_row(&self, row: &Row<'_>) -> Result<T, PostProcessingError>;
}

impl<T, F> RowMapper<T> for F
where
    F: Fn(&Row<'_>) -> Result<T, PostProcessingError> + Send + Sync,
{
    fn map_row(&self, row: &Row<'_>) -> Result<T, PostProcessingError> {
        self(row)
    }
}

/// Maps every row of the frame, yielding a `Vec<T>` in row order.
pub struct RowsProcessor<T, M> {
    mapper: M,
    _marker: PhantomData<fn() -> T>,
}

impl<T, M: RowMapper<T>> RowsProcessor<T, M> {
    /// Wrap a row mapper.
    pub fn new(mapper: M) -> Self {
        Self {
            mapper,
            _marker: PhantomData,
        }
    }
}

impl<T: Send, M: RowMapper<T>> ResultProcessor<Vec<T>> for RowsProcessor<T, M> {
    fn process(&self, frame: ResultFrame) -> Result<Vec<T>, PostProcessingError> {
        let mut out = Vec::with_capacity(frame.row_count());
        for row in frame.rows() {
            out.push(self.mapper.map_row(&row)?);
        }
        Ok(out)
    }
}

/// Maps at most one row; more than one row is a multiplicity violation.
///
/// Zero rows yield `None`, one row yields `Some(mapped)`, two or more rows
/// fail with [`PostProcessingError::Multiplicity`].
pub struct OneRowProcessor<T, M> {
    mapper: M,
    _marker: PhantomData<fn() -> T>,
}

impl<T, M: RowMapper<T>> OneRowProcessor<T, M> {
    /// Wrap a row mapper.
    pub fn new(mapper: M) -> Self {
        Self {
            mapper,
            _marker: PhantomData,
        }
    }
}

impl<T: Send, M: RowMapper<T>> ResultProcessor<Option<T>> for OneRowProcessor<T, M> {
    fn process(&self, frame: ResultFrame) -> Result<Option<T>, PostProcessingError> {
        match frame.row_count() {
            0 => Ok(None),
            1 => {
                let row = frame.row(0).expect("row 0 exists when row_count is 1");
                Ok(Some(self.mapper.map_row(&row)?))
            }
            found => Err(PostProcessingError::Multiplicity { found }),
        }
    }
}

/// Extracts the first column of every row as raw values.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstColumnProcessor;

impl ResultProcessor<Vec<Value>> for FirstColumnProcessor {
    fn process(&self, frame: ResultFrame) -> Result<Vec<Value>, PostProcessingError> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }
        if frame.columns().is_empty() {
            return Err(PostProcessingError::NoColumns);
        }
        let mut out = Vec::with_capacity(frame.row_count());
        for (index, row) in frame.rows().enumerate() {
            let value = row.get(0).ok_or(PostProcessingError::Mapping {
                row: index,
                message: "row is shorter than the column list".to_string(),
            })?;
            out.push(value.clone());
        }
        Ok(out)
    }
}

/// Converts every row into a name-to-value map.
#[derive(Debug, Default, Clone, Copy)]
pub struct MapProcessor;

impl ResultProcessor<Vec<HashMap<String, Value>>> for MapProcessor {
    fn process(
        &self,
        frame: ResultFrame,
    ) -> Result<Vec<HashMap<String, Value>>, PostProcessingError> {
        let names: Vec<String> = frame.columns().iter().map(|c| c.name.clone()).collect();
        let mut out = Vec::with_capacity(frame.row_count());
        for row in frame.rows() {
            let mut map = HashMap::with_capacity(names.len());
            for (index, name) in names.iter().enumerate() {
                if let Some(value) = row.get(index) {
                    map.insert(name.clone(), value.clone());
                }
            }
            out.push(map);
        }
        Ok(out)
    }
}

/// Discards the frame and acknowledges completion. Used by write operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct AckProcessor;

impl ResultProcessor<()> for AckProcessor {
    fn process(&self, _frame: ResultFrame) -> Result<(), PostProcessingError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ColumnSpec, CqlType};

    fn frame_with(rows: Vec<Vec<Value>>) -> ResultFrame {
        ResultFrame::new(
            vec![
                ColumnSpec::new("id", CqlType::BigInt),
                ColumnSpec::new("name", CqlType::Text),
            ],
            rows,
        )
    }

    fn name_mapper() -> impl RowMapper<String> {
        |row: &Row<'_>| row.str("name").map(str::to_string)
    }

    #[test]
    fn test_rows_processor_maps_in_order() {
        let frame = frame_with(vec![
            vec![Value::BigInt(1), Value::Text("a".into())],
            vec![Value::BigInt(2), Value::Text("b".into())],
        ]);
        let names = RowsProcessor::new(name_mapper()).process(frame).unwrap();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_rows_processor_propagates_mapper_error() {
        let frame = frame_with(vec![vec![Value::BigInt(1), Value::Null]]);
        let result = RowsProcessor::new(name_mapper()).process(frame);
        assert!(matches!(
            result,
            Err(PostProcessingError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_one_row_zero_rows_is_none() {
        let frame = frame_with(vec![]);
        let result = OneRowProcessor::new(name_mapper()).process(frame).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_one_row_single_row_is_some() {
        let frame = frame_with(vec![vec![Value::BigInt(1), Value::Text("only".into())]]);
        let result = OneRowProcessor::new(name_mapper()).process(frame).unwrap();
        assert_eq!(result.as_deref(), Some("only"));
    }

    #[test]
    fn test_one_row_two_rows_is_multiplicity_error() {
        let frame = frame_with(vec![
            vec![Value::BigInt(1), Value::Text("a".into())],
            vec![Value::BigInt(2), Value::Text("b".into())],
        ]);
        let result = OneRowProcessor::new(name_mapper()).process(frame);
        assert!(matches!(
            result,
            Err(PostProcessingError::Multiplicity { found: 2 })
        ));
    }

    #[test]
    fn test_first_column_extraction() {
        let frame = frame_with(vec![
            vec![Value::BigInt(10), Value::Text("a".into())],
            vec![Value::BigInt(20), Value::Text("b".into())],
        ]);
        let firsts = FirstColumnProcessor.process(frame).unwrap();
        assert_eq!(firsts, vec![Value::BigInt(10), Value::BigInt(20)]);
    }

    #[test]
    fn test_first_column_empty_frame() {
        let firsts = FirstColumnProcessor.process(ResultFrame::empty()).unwrap();
        assert!(firsts.is_empty());
    }

    #[test]
    fn test_map_processor() {
        let frame = frame_with(vec![vec![Value::BigInt(1), Value::Text("a".into())]]);
        let maps = MapProcessor.process(frame).unwrap();
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].get("id"), Some(&Value::BigInt(1)));
        assert_eq!(maps[0].get("name"), Some(&Value::Text("a".into())));
    }

    #[test]
    fn test_ack_processor_ignores_frame() {
        AckProcessor.process(ResultFrame::empty()).unwrap();
        AckProcessor
            .process(frame_with(vec![vec![Value::BigInt(1), Value::Null]]))
            .unwrap();
    }

    #[test]
    fn test_closure_processor() {
        let count = |frame: ResultFrame| Ok(frame.row_count());
        let frame = frame_with(vec![vec![Value::BigInt(1), Value::Text("a".into())]]);
        assert_eq!(count.process(frame).unwrap(), 1);
    }
}
