//! The type-erased decoder registry.
//!
//! Maps a [`DType`] to a maker that parses a blob into a boxed column
//! handle. The defaults cover every built-in element type; callers may
//! register makers for their own extension types.

use std::any::Any;
use std::collections::HashMap;

use binvec_error::{binvec_err, BinVecResult};
use bytes::Bytes;

use crate::dtype::{DType, Primitive};
use crate::vector::{BinaryVector, PrimitiveVector, StrElement, StringVector};
use crate::view::Utf8Str;

/// Boxed read access for interop callers that dispatch on [`DType`] at
/// runtime.
pub trait AnyVector: Send + Sync + std::fmt::Debug {
    fn len(&self) -> usize;
    fn is_available(&self, index: usize) -> bool;
    /// The element at `index` boxed as [`Any`], or `None` when missing or
    /// out of range.
    fn get_boxed(&self, index: usize) -> Option<Box<dyn Any>>;
}

impl<V> AnyVector for V
where
    V: BinaryVector + Send + Sync + std::fmt::Debug,
    V::Elem: Send + Sync,
{
    fn len(&self) -> usize {
        BinaryVector::len(self)
    }

    fn is_available(&self, index: usize) -> bool {
        BinaryVector::is_available(self, index)
    }

    fn get_boxed(&self, index: usize) -> Option<Box<dyn Any>> {
        self.get_safe(index).map(|v| Box::new(v) as Box<dyn Any>)
    }
}

/// Parses an optional byte region (plus a length hint for absent regions)
/// into a boxed handle.
pub type VectorMaker = fn(Option<Bytes>, usize) -> BinVecResult<Box<dyn AnyVector>>;

fn primitive_maker<T: Primitive>(
    blob: Option<Bytes>,
    len_hint: usize,
) -> BinVecResult<Box<dyn AnyVector>> {
    Ok(Box::new(PrimitiveVector::<T>::parse_opt(blob, len_hint)?))
}

fn string_maker<S: StrElement>(
    blob: Option<Bytes>,
    len_hint: usize,
) -> BinVecResult<Box<dyn AnyVector>> {
    Ok(Box::new(StringVector::<S>::parse_opt(blob, len_hint)?))
}

/// A user-extensible mapping from element type to column-handle maker.
#[derive(Clone)]
pub struct Registry {
    makers: HashMap<DType, VectorMaker>,
}

impl Registry {
    /// A registry covering the built-in element types.
    pub fn with_defaults() -> Self {
        let mut registry = Self { makers: HashMap::new() };
        registry.register(DType::Bool, primitive_maker::<bool>);
        registry.register(DType::Int32, primitive_maker::<i32>);
        registry.register(DType::Int64, primitive_maker::<i64>);
        registry.register(DType::Float32, primitive_maker::<f32>);
        registry.register(DType::Float64, primitive_maker::<f64>);
        registry.register(DType::Utf8, string_maker::<String>);
        registry.register(DType::Utf8View, string_maker::<Utf8Str>);
        registry.register(DType::DateTime, primitive_maker::<i64>);
        registry.register(DType::SqlTimestamp, primitive_maker::<i64>);
        registry
    }

    /// Add or replace the maker for an element type.
    pub fn register(&mut self, dtype: DType, maker: VectorMaker) {
        self.makers.insert(dtype, maker);
    }

    /// Parse `blob` as a column of `dtype`. An absent region yields an
    /// all-missing handle of `len_hint` rows.
    pub fn open(
        &self,
        dtype: DType,
        blob: Option<Bytes>,
        len_hint: usize,
    ) -> BinVecResult<Box<dyn AnyVector>> {
        let maker = self
            .makers
            .get(&dtype)
            .ok_or_else(|| binvec_err!(TypeMismatch: "no maker registered for {dtype:?}"))?;
        maker(blob, len_hint)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::{encode_primitive_opt, encode_strings_opt};

    #[test]
    fn boxed_access_round_trips() {
        let registry = Registry::with_defaults();
        let blob = encode_primitive_opt(&[Some(11i32), None]).unwrap();
        let column = registry.open(DType::Int32, Some(blob), 0).unwrap();

        assert_eq!(column.len(), 2);
        assert!(column.is_available(0));
        let boxed = column.get_boxed(0).unwrap();
        assert_eq!(*boxed.downcast_ref::<i32>().unwrap(), 11);
        assert!(column.get_boxed(1).is_none());
        assert!(column.get_boxed(9).is_none());
    }

    #[test]
    fn string_views_come_out_boxed() {
        let registry = Registry::with_defaults();
        let blob = encode_strings_opt(&[Some("zero"), Some("copy")], &Default::default()).unwrap();
        let column = registry.open(DType::Utf8View, Some(blob), 0).unwrap();
        let boxed = column.get_boxed(1).unwrap();
        assert_eq!(boxed.downcast_ref::<Utf8Str>().unwrap().as_str(), "copy");
    }

    #[test]
    fn unknown_types_are_rejected() {
        let registry = Registry { makers: HashMap::new() };
        let err = registry.open(DType::Bool, None, 0).unwrap_err();
        assert!(matches!(err, binvec_error::BinVecError::TypeMismatch(_)));
    }

    #[test]
    fn absent_regions_honor_the_length_hint() {
        let registry = Registry::with_defaults();
        let column = registry.open(DType::Utf8, None, 3).unwrap();
        assert_eq!(column.len(), 3);
        assert!(!column.is_available(2));
    }
}
