//! The table layout carried inside binvec payloads.
//!
//! Payloads use a FlatBuffers-compatible layout so that any stock
//! FlatBuffers runtime can read them; this crate implements the small slice
//! of the format the five fixed tables need, reader and writer both, with
//! every read bounds-checked.
//!
//! `vector.fbs`:
//! ```flatbuffers
#![doc = include_str!("../flatbuffers/vector.fbs")]
//! ```

pub mod bytes;
pub mod read;
pub mod vector;
pub mod write;
