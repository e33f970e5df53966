//! Row readers: the narrow capability set the builder consumes rows through.
//!
//! A reader answers `is_present(col)` plus typed getters. Calling a getter
//! on a missing cell or with the wrong type is a programmer error and
//! panics; the builder always checks presence first.

use std::any::Any;

use binvec_error::binvec_panic;

use crate::view::Utf8Str;

/// One cell of a staged row.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Str(String),
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f32> for CellValue {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Read access to one row of typed cells.
pub trait RowReader {
    /// Whether column `col` holds a value in this row.
    fn is_present(&self, col: usize) -> bool;

    fn get_bool(&self, col: usize) -> bool;
    fn get_i32(&self, col: usize) -> i32;
    fn get_i64(&self, col: usize) -> i64;
    fn get_f32(&self, col: usize) -> f32;
    fn get_f64(&self, col: usize) -> f64;
    fn get_str(&self, col: usize) -> &str;

    /// The string cell as an owned view.
    fn get_utf8(&self, col: usize) -> Utf8Str {
        Utf8Str::from(self.get_str(col))
    }

    /// Extension hook for element types outside the fixed set.
    fn get_any(&self, _col: usize) -> Option<&dyn Any> {
        None
    }

    /// Downcast an extension cell.
    fn get_as<T: 'static>(&self, col: usize) -> Option<&T>
    where
        Self: Sized,
    {
        self.get_any(col).and_then(|v| v.downcast_ref())
    }
}

fn expect_cell<'a>(cell: &'a Option<CellValue>, col: usize) -> &'a CellValue {
    match cell {
        Some(cell) => cell,
        None => binvec_panic!("column {col} is missing; check is_present first"),
    }
}

macro_rules! cell_getters {
    ($cell:ident) => {
        fn get_bool(&self, col: usize) -> bool {
            match self.$cell(col) {
                CellValue::Bool(v) => *v,
                other => binvec_panic!("column {col} is not a bool: {other:?}"),
            }
        }

        fn get_i32(&self, col: usize) -> i32 {
            match self.$cell(col) {
                CellValue::Int32(v) => *v,
                other => binvec_panic!("column {col} is not an i32: {other:?}"),
            }
        }

        fn get_i64(&self, col: usize) -> i64 {
            match self.$cell(col) {
                CellValue::Int32(v) => i64::from(*v),
                CellValue::Int64(v) => *v,
                other => binvec_panic!("column {col} is not an i64: {other:?}"),
            }
        }

        fn get_f32(&self, col: usize) -> f32 {
            match self.$cell(col) {
                CellValue::Float32(v) => *v,
                other => binvec_panic!("column {col} is not an f32: {other:?}"),
            }
        }

        fn get_f64(&self, col: usize) -> f64 {
            match self.$cell(col) {
                CellValue::Float64(v) => *v,
                CellValue::Float32(v) => f64::from(*v),
                other => binvec_panic!("column {col} is not an f64: {other:?}"),
            }
        }

        fn get_str(&self, col: usize) -> &str {
            match self.$cell(col) {
                CellValue::Str(v) => v,
                other => binvec_panic!("column {col} is not a string: {other:?}"),
            }
        }
    };
}

/// A positional row whose cells may individually be missing.
#[derive(Clone, Debug, PartialEq)]
pub struct TupleRowReader {
    cells: Vec<Option<CellValue>>,
}

impl TupleRowReader {
    pub fn new(cells: Vec<Option<CellValue>>) -> Self {
        Self { cells }
    }

    fn cell(&self, col: usize) -> &CellValue {
        expect_cell(&self.cells[col], col)
    }
}

impl From<Vec<Option<CellValue>>> for TupleRowReader {
    fn from(cells: Vec<Option<CellValue>>) -> Self {
        Self::new(cells)
    }
}

impl RowReader for TupleRowReader {
    fn is_present(&self, col: usize) -> bool {
        self.cells.get(col).is_some_and(Option::is_some)
    }

    cell_getters!(cell);
}

/// A row over a value sequence with every cell present.
#[derive(Clone, Debug, PartialEq)]
pub struct SeqRowReader {
    cells: Vec<CellValue>,
}

impl SeqRowReader {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    fn cell(&self, col: usize) -> &CellValue {
        &self.cells[col]
    }
}

impl RowReader for SeqRowReader {
    fn is_present(&self, col: usize) -> bool {
        col < self.cells.len()
    }

    cell_getters!(cell);
}

/// A single-column row.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleValueRowReader {
    cell: CellValue,
}

impl SingleValueRowReader {
    pub fn new(cell: impl Into<CellValue>) -> Self {
        Self { cell: cell.into() }
    }

    fn cell(&self, col: usize) -> &CellValue {
        if col != 0 {
            binvec_panic!("single-value row has no column {col}");
        }
        &self.cell
    }
}

impl RowReader for SingleValueRowReader {
    fn is_present(&self, col: usize) -> bool {
        col == 0
    }

    cell_getters!(cell);
}

/// A row of raw strings parsed on demand; an empty string reads as missing.
#[derive(Clone, Debug, PartialEq)]
pub struct StringArrayRowReader {
    strings: Vec<String>,
}

impl StringArrayRowReader {
    pub fn new(strings: Vec<String>) -> Self {
        Self { strings }
    }

    fn parse<T: std::str::FromStr>(&self, col: usize, what: &str) -> T {
        match self.strings[col].parse() {
            Ok(v) => v,
            Err(_) => binvec_panic!("column {col} ({:?}) does not parse as {what}", self.strings[col]),
        }
    }
}

impl RowReader for StringArrayRowReader {
    fn is_present(&self, col: usize) -> bool {
        self.strings.get(col).is_some_and(|s| !s.is_empty())
    }

    fn get_bool(&self, col: usize) -> bool {
        self.parse(col, "bool")
    }

    fn get_i32(&self, col: usize) -> i32 {
        self.parse(col, "i32")
    }

    fn get_i64(&self, col: usize) -> i64 {
        self.parse(col, "i64")
    }

    fn get_f32(&self, col: usize) -> f32 {
        self.parse(col, "f32")
    }

    fn get_f64(&self, col: usize) -> f64 {
        self.parse(col, "f64")
    }

    fn get_str(&self, col: usize) -> &str {
        &self.strings[col]
    }
}

/// Remaps column indices onto an inner reader: column `c` reads from
/// `routes[c]` of the wrapped row.
#[derive(Clone, Debug)]
pub struct RoutingRowReader<R> {
    inner: R,
    routes: Vec<usize>,
}

impl<R: RowReader> RoutingRowReader<R> {
    pub fn new(inner: R, routes: Vec<usize>) -> Self {
        Self { inner, routes }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Routing wrappers compare by the underlying reader.
impl<R: PartialEq> PartialEq for RoutingRowReader<R> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<R: RowReader> RowReader for RoutingRowReader<R> {
    fn is_present(&self, col: usize) -> bool {
        self.inner.is_present(self.routes[col])
    }

    fn get_bool(&self, col: usize) -> bool {
        self.inner.get_bool(self.routes[col])
    }

    fn get_i32(&self, col: usize) -> i32 {
        self.inner.get_i32(self.routes[col])
    }

    fn get_i64(&self, col: usize) -> i64 {
        self.inner.get_i64(self.routes[col])
    }

    fn get_f32(&self, col: usize) -> f32 {
        self.inner.get_f32(self.routes[col])
    }

    fn get_f64(&self, col: usize) -> f64 {
        self.inner.get_f64(self.routes[col])
    }

    fn get_str(&self, col: usize) -> &str {
        self.inner.get_str(self.routes[col])
    }

    fn get_any(&self, col: usize) -> Option<&dyn Any> {
        self.inner.get_any(self.routes[col])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tuple_rows_track_presence() {
        let row = TupleRowReader::new(vec![Some("ada".into()), None, Some(36i32.into())]);
        assert!(row.is_present(0));
        assert!(!row.is_present(1));
        assert_eq!(row.get_str(0), "ada");
        assert_eq!(row.get_i32(2), 36);
        assert_eq!(row.get_i64(2), 36);
    }

    #[test]
    fn string_rows_parse_on_demand() {
        let row = StringArrayRowReader::new(vec!["".into(), "42".into(), "2.5".into()]);
        assert!(!row.is_present(0));
        assert_eq!(row.get_i64(1), 42);
        assert_eq!(row.get_f64(2), 2.5);
        assert_eq!(row.get_str(1), "42");
    }

    #[test]
    fn routing_remaps_and_compares_by_inner() {
        let inner = SeqRowReader::new(vec![1i32.into(), "x".into()]);
        let routed = RoutingRowReader::new(inner.clone(), vec![1, 0]);
        assert_eq!(routed.get_str(0), "x");
        assert_eq!(routed.get_i32(1), 1);

        let other_routes = RoutingRowReader::new(inner, vec![0, 1]);
        assert_eq!(routed, other_routes);
    }

    #[test]
    fn single_value_rows() {
        let row = SingleValueRowReader::new(true);
        assert!(row.is_present(0));
        assert!(!row.is_present(1));
        assert!(row.get_bool(0));
    }
}
