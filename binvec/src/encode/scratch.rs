//! Per-thread scratch buffers for the table builder.
//!
//! Each thread keeps one growable buffer, 64 KiB on first use; if a larger
//! payload grows it, the larger buffer stays with the thread. Encoder output
//! is always copied out into a fresh caller-owned region.

use std::cell::RefCell;

use binvec_flatbuffers::write::Builder;

const INITIAL_CAPACITY: usize = 64 * 1024;

thread_local! {
    static SCRATCH: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

/// Run `f` with a builder backed by this thread's scratch buffer, returning
/// the buffer (possibly grown) to the thread afterwards.
pub(crate) fn with_builder<R>(f: impl FnOnce(&mut Builder) -> R) -> R {
    let mut buf = SCRATCH.with(|cell| std::mem::take(&mut *cell.borrow_mut()));
    if buf.len() < INITIAL_CAPACITY {
        buf.resize(INITIAL_CAPACITY, 0);
    }
    let mut builder = Builder::reuse(buf);
    let result = f(&mut builder);
    SCRATCH.with(|cell| *cell.borrow_mut() = builder.into_inner());
    result
}

/// Drop the calling thread's scratch buffer. Exposed so tests can exercise
/// the first-use path.
pub fn reset() {
    SCRATCH.with(|cell| *cell.borrow_mut() = Vec::new());
}
