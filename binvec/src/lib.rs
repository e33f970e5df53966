//! Columnar binary vectors with minimal-deserialization reads.
//!
//! One blob encodes one column: a four-byte header naming the encoding,
//! followed by a FlatBuffers-compatible payload. The encoder picks the
//! smallest representation that preserves the data (empty, constant,
//! dictionary, or bit-packed), and the readers answer `len`, `is_available`
//! and `get` straight out of the byte buffer without copying the payload.
//!
//! ```
//! use binvec::{pack_rows, BinaryVector, ColumnDef, DType, PrimitiveVector, TupleRowReader};
//!
//! let schema = vec![
//!     ColumnDef::new("name", DType::Utf8),
//!     ColumnDef::new("age", DType::Int32),
//! ];
//! let rows = vec![
//!     TupleRowReader::new(vec![Some("Ada".into()), Some(36i32.into())]),
//!     TupleRowReader::new(vec![Some("Grace".into()), None]),
//! ];
//! let columns = pack_rows(schema, rows)?;
//!
//! let ages = PrimitiveVector::<i32>::parse(columns["age"].clone())?;
//! assert_eq!(ages.get_safe(0), Some(36));
//! assert_eq!(ages.get_safe(1), None);
//! # Ok::<(), binvec::BinVecError>(())
//! ```
//!
//! Blobs are immutable once written; handles hold a reference-counted view
//! of the bytes and are safe to share across threads.

mod build;
mod dtype;
mod encode;
mod packed;
mod registry;
mod row;
mod vector;
mod view;
mod wire;

pub use binvec_error::{BinVecError, BinVecResult};
pub use binvec_mask::{MaskWords, NaMask, NaMaskBuilder};

pub use crate::build::{pack_rows, ColumnDef, RowToColumnBuilder};
pub use crate::dtype::{DType, Primitive};
pub use crate::encode::{
    encode_primitive, encode_primitive_opt, encode_strings, encode_strings_opt, scratch,
    EncodeOptions,
};
pub use crate::packed::PackedData;
pub use crate::registry::{AnyVector, Registry, VectorMaker};
pub use crate::row::{
    CellValue, RoutingRowReader, RowReader, SeqRowReader, SingleValueRowReader,
    StringArrayRowReader, TupleRowReader,
};
pub use crate::vector::{
    inspect, AvailableIter, BinaryVector, EmptyVector, OptionIter, PrimitiveVector, StrElement,
    StringVector, VectorSummary,
};
pub use crate::view::Utf8Str;
pub use crate::wire::{subtype, MajorType, WireHeader, HEADER_LEN};
