//! The row-to-column builder: stages rows into per-column buffers plus NA
//! masks, then encodes every column.

use std::collections::HashMap;

use binvec_error::{binvec_bail, BinVecResult};
use binvec_mask::NaMaskBuilder;
use bytes::Bytes;

use crate::dtype::DType;
use crate::encode::{encode_primitive, encode_strings, EncodeOptions};
use crate::row::RowReader;

/// One column of the schema handed to the builder.
#[derive(Clone, Debug)]
pub struct ColumnDef {
    pub name: String,
    pub dtype: DType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, dtype: DType) -> Self {
        Self { name: name.into(), dtype }
    }
}

/// Typed staging for one column: the value buffer plus its mask builder.
/// Missing rows append a placeholder value and a set mask bit.
#[derive(Debug)]
enum ColumnStage {
    Bool(Vec<bool>, NaMaskBuilder),
    Int32(Vec<i32>, NaMaskBuilder),
    Int64(Vec<i64>, NaMaskBuilder),
    Float32(Vec<f32>, NaMaskBuilder),
    Float64(Vec<f64>, NaMaskBuilder),
    Str(Vec<String>, NaMaskBuilder),
}

impl ColumnStage {
    fn for_dtype(dtype: DType) -> Self {
        let na = NaMaskBuilder::default();
        match dtype {
            DType::Bool => Self::Bool(Vec::new(), na),
            DType::Int32 => Self::Int32(Vec::new(), na),
            DType::Int64 | DType::DateTime | DType::SqlTimestamp => Self::Int64(Vec::new(), na),
            DType::Float32 => Self::Float32(Vec::new(), na),
            DType::Float64 => Self::Float64(Vec::new(), na),
            DType::Utf8 | DType::Utf8View => Self::Str(Vec::new(), na),
        }
    }

    fn append<R: RowReader>(&mut self, row: &R, col: usize) {
        let present = row.is_present(col);
        match self {
            Self::Bool(values, na) => {
                values.push(present && row.get_bool(col));
                na.append(!present);
            }
            Self::Int32(values, na) => {
                values.push(if present { row.get_i32(col) } else { 0 });
                na.append(!present);
            }
            Self::Int64(values, na) => {
                values.push(if present { row.get_i64(col) } else { 0 });
                na.append(!present);
            }
            Self::Float32(values, na) => {
                values.push(if present { row.get_f32(col) } else { 0.0 });
                na.append(!present);
            }
            Self::Float64(values, na) => {
                values.push(if present { row.get_f64(col) } else { 0.0 });
                na.append(!present);
            }
            Self::Str(values, na) => {
                values.push(if present { row.get_str(col).to_owned() } else { String::new() });
                na.append(!present);
            }
        }
    }

    fn encode(self, options: &EncodeOptions) -> BinVecResult<Bytes> {
        match self {
            Self::Bool(values, na) => encode_primitive(&values, &na.finish()),
            Self::Int32(values, na) => encode_primitive(&values, &na.finish()),
            Self::Int64(values, na) => encode_primitive(&values, &na.finish()),
            Self::Float32(values, na) => encode_primitive(&values, &na.finish()),
            Self::Float64(values, na) => encode_primitive(&values, &na.finish()),
            Self::Str(values, na) => encode_strings(&values, &na.finish(), options),
        }
    }
}

/// Collects rows against a schema and encodes one blob per column.
#[derive(Debug)]
pub struct RowToColumnBuilder {
    defs: Vec<ColumnDef>,
    stages: Vec<ColumnStage>,
    options: EncodeOptions,
}

impl RowToColumnBuilder {
    pub fn new(schema: Vec<ColumnDef>) -> Self {
        Self::with_options(schema, EncodeOptions::default())
    }

    pub fn with_options(schema: Vec<ColumnDef>, options: EncodeOptions) -> Self {
        let stages = schema.iter().map(|def| ColumnStage::for_dtype(def.dtype)).collect();
        Self { defs: schema, stages, options }
    }

    /// Number of rows staged so far.
    pub fn row_count(&self) -> usize {
        match self.stages.first() {
            None => 0,
            Some(ColumnStage::Bool(values, _)) => values.len(),
            Some(ColumnStage::Int32(values, _)) => values.len(),
            Some(ColumnStage::Int64(values, _)) => values.len(),
            Some(ColumnStage::Float32(values, _)) => values.len(),
            Some(ColumnStage::Float64(values, _)) => values.len(),
            Some(ColumnStage::Str(values, _)) => values.len(),
        }
    }

    /// Stage one row across every column.
    pub fn append<R: RowReader>(&mut self, row: &R) {
        for (col, stage) in self.stages.iter_mut().enumerate() {
            stage.append(row, col);
        }
    }

    /// Encode every staged column into `name -> blob`.
    pub fn finish(self) -> BinVecResult<HashMap<String, Bytes>> {
        let mut columns = HashMap::with_capacity(self.defs.len());
        for (def, stage) in self.defs.into_iter().zip(self.stages) {
            let blob = stage.encode(&self.options)?;
            if columns.insert(def.name.clone(), blob).is_some() {
                binvec_bail!("duplicate column name {:?}", def.name);
            }
        }
        Ok(columns)
    }
}

/// Stage and encode a full row stream in one call.
pub fn pack_rows<R, I>(schema: Vec<ColumnDef>, rows: I) -> BinVecResult<HashMap<String, Bytes>>
where
    R: RowReader,
    I: IntoIterator<Item = R>,
{
    let mut builder = RowToColumnBuilder::new(schema);
    for row in rows {
        builder.append(&row);
    }
    builder.finish()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::row::TupleRowReader;
    use crate::vector::{BinaryVector, PrimitiveVector};

    #[test]
    fn duplicate_column_names_fail_at_encode_time() {
        let schema = vec![
            ColumnDef::new("x", DType::Int32),
            ColumnDef::new("x", DType::Int64),
        ];
        let rows = vec![TupleRowReader::new(vec![Some(1i32.into()), Some(2i64.into())])];
        assert!(pack_rows(schema, rows).is_err());
    }

    #[test]
    fn datetime_columns_reduce_to_epoch_millis() {
        let schema = vec![ColumnDef::new("ts", DType::DateTime)];
        let millis = 1_700_000_000_123i64;
        let rows = vec![TupleRowReader::new(vec![Some(millis.into())])];
        let columns = pack_rows(schema, rows).unwrap();

        let v = PrimitiveVector::<i64>::parse(columns["ts"].clone()).unwrap();
        assert_eq!(v.get(0), millis);
    }
}
