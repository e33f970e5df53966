//! Builder for the table layout.
//!
//! Construction mirrors the reference FlatBuffers builder: the buffer is
//! written back-to-front so that every unsigned offset points forward, each
//! table gets a vtable mapping field slots to inline positions, and scalar
//! writes are padded so elements land on their natural alignment relative to
//! the finished payload. Positions are tracked as distances from the end of
//! the buffer ("rev" positions), which stay stable while the buffer grows at
//! the front.

/// Position of a finished object, measured from the end of the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WIPOffset(usize);

#[derive(Debug)]
pub struct Builder {
    buf: Vec<u8>,
    head: usize,
    field_locs: Vec<(u16, usize)>,
    object_start: usize,
    nested: bool,
    min_align: usize,
}

impl Builder {
    pub fn new() -> Self {
        Self::reuse(vec![0; 1024])
    }

    /// Build into a caller-provided scratch buffer. The buffer's full length
    /// is used as initial capacity and is returned, possibly grown, by
    /// [`Builder::into_inner`].
    pub fn reuse(buf: Vec<u8>) -> Self {
        let head = buf.len();
        Self {
            buf,
            head,
            field_locs: Vec::new(),
            object_start: 0,
            nested: false,
            min_align: 1,
        }
    }

    /// Reclaim the scratch buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// The finished payload. Call after [`Builder::finish`].
    pub fn finished_data(&self) -> &[u8] {
        &self.buf[self.head..]
    }

    /// Bytes written so far; doubles as the rev position of the next write.
    #[inline]
    fn used(&self) -> usize {
        self.buf.len() - self.head
    }

    fn make_space(&mut self, want: usize) {
        if self.head >= want {
            return;
        }
        let old_len = self.buf.len();
        let grow = old_len.max(want - self.head).max(64);
        let mut grown = vec![0u8; old_len + grow];
        grown[grow..].copy_from_slice(&self.buf);
        self.buf = grown;
        self.head += grow;
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.make_space(bytes.len());
        self.head -= bytes.len();
        self.buf[self.head..self.head + bytes.len()].copy_from_slice(bytes);
    }

    /// Write `count` zero bytes of padding.
    fn fill(&mut self, count: usize) {
        self.make_space(count);
        self.head -= count;
        self.buf[self.head..self.head + count].fill(0);
    }

    /// Pad so that after `len` more bytes the write position is aligned to
    /// `alignment` relative to the end of the finished payload.
    fn pre_align(&mut self, len: usize, alignment: usize) {
        debug_assert!(alignment.is_power_of_two());
        self.min_align = self.min_align.max(alignment);
        let misalign = (self.used() + len) & (alignment - 1);
        if misalign != 0 {
            self.fill(alignment - misalign);
        }
    }

    fn push_u16(&mut self, value: u16) {
        self.pre_align(2, 2);
        self.push_bytes(&value.to_le_bytes());
    }

    fn push_u32(&mut self, value: u32) {
        self.pre_align(4, 4);
        self.push_bytes(&value.to_le_bytes());
    }

    /// Write an unsigned forward offset to `target` at the current position.
    fn push_uoffset(&mut self, target: WIPOffset) {
        self.pre_align(4, 4);
        self.make_space(4);
        self.head -= 4;
        let here = self.used();
        debug_assert!(target.0 < here, "offset target must already be written");
        let rel = (here - target.0) as u32;
        self.buf[self.head..self.head + 4].copy_from_slice(&rel.to_le_bytes());
    }

    /// Begin a table. Offsets referenced by its fields must be created
    /// before this call.
    pub fn start_table(&mut self) {
        assert!(!self.nested, "tables cannot nest while being written");
        self.nested = true;
        self.field_locs.clear();
        self.object_start = self.used();
    }

    pub fn push_slot_u8(&mut self, slot: u16, value: u8, default: u8) {
        if value == default {
            return;
        }
        self.pre_align(1, 1);
        self.push_bytes(&[value]);
        self.field_locs.push((slot, self.used()));
    }

    pub fn push_slot_i32(&mut self, slot: u16, value: i32, default: i32) {
        if value == default {
            return;
        }
        self.pre_align(4, 4);
        self.push_bytes(&value.to_le_bytes());
        self.field_locs.push((slot, self.used()));
    }

    pub fn push_slot_offset(&mut self, slot: u16, offset: WIPOffset) {
        self.push_uoffset(offset);
        self.field_locs.push((slot, self.used()));
    }

    /// Finish the table: write its vtable and the signed offset that links
    /// the two.
    pub fn end_table(&mut self) -> WIPOffset {
        assert!(self.nested, "end_table without start_table");
        self.nested = false;

        // Placeholder for the vtable soffset, patched below.
        self.pre_align(4, 4);
        self.fill(4);
        let table_rev = self.used();

        let num_slots = self
            .field_locs
            .iter()
            .map(|(slot, _)| *slot as usize + 1)
            .max()
            .unwrap_or(0);
        let mut slot_offsets = vec![0u16; num_slots];
        for (slot, rev) in &self.field_locs {
            slot_offsets[*slot as usize] = (table_rev - rev) as u16;
        }

        for offset in slot_offsets.iter().rev() {
            self.push_u16(*offset);
        }
        self.push_u16((table_rev - self.object_start) as u16);
        self.push_u16((4 + 2 * num_slots) as u16);
        let vtable_rev = self.used();

        let soffset = (vtable_rev - table_rev) as i32;
        let idx = self.buf.len() - table_rev;
        self.buf[idx..idx + 4].copy_from_slice(&soffset.to_le_bytes());

        WIPOffset(table_rev)
    }

    /// Create a `[ubyte]` vector. `alignment` positions the first element on
    /// the given power-of-two boundary relative to the payload, e.g. the
    /// alignment implied by a packed bit-width.
    pub fn create_byte_vector(&mut self, data: &[u8], alignment: usize) -> WIPOffset {
        self.pre_align(data.len(), 4);
        self.pre_align(data.len(), alignment);
        self.push_bytes(data);
        self.push_u32(data.len() as u32);
        WIPOffset(self.used())
    }

    /// Create a `[ulong]` vector.
    pub fn create_u64_vector(&mut self, words: &[u64]) -> WIPOffset {
        self.pre_align(words.len() * 8, 4);
        self.pre_align(words.len() * 8, 8);
        for word in words.iter().rev() {
            self.push_bytes(&word.to_le_bytes());
        }
        self.push_u32(words.len() as u32);
        WIPOffset(self.used())
    }

    /// Create a string: length-prefixed UTF-8 with a nul terminator that is
    /// excluded from the length.
    pub fn create_string(&mut self, value: &str) -> WIPOffset {
        self.pre_align(value.len() + 1, 4);
        self.push_bytes(&[0]);
        self.push_bytes(value.as_bytes());
        self.push_u32(value.len() as u32);
        WIPOffset(self.used())
    }

    /// Create a vector of offsets to previously created objects.
    pub fn create_offset_vector(&mut self, offsets: &[WIPOffset]) -> WIPOffset {
        self.pre_align(offsets.len() * 4, 4);
        for offset in offsets.iter().rev() {
            self.push_uoffset(*offset);
        }
        self.push_u32(offsets.len() as u32);
        WIPOffset(self.used())
    }

    /// Write the root offset. The payload is complete after this call.
    pub fn finish(&mut self, root: WIPOffset) {
        self.pre_align(4, self.min_align);
        self.push_uoffset(root);
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
