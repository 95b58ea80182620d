//! Explicit-offset byte cursors
//!
//! Every wire field is written and read at an explicit position with an
//! explicit byte order. Callers check the total length up front; the
//! cursors themselves never read or write past the slice they wrap.

/// Sequential writer over a fixed output buffer
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    pub fn put_u32_le(&mut self, value: u32) {
        self.put(&value.to_le_bytes());
    }

    pub fn put_u16_le(&mut self, value: u16) {
        self.put(&value.to_le_bytes());
    }

    pub fn put_i16_be(&mut self, value: i16) {
        self.put(&value.to_be_bytes());
    }

    /// Write a register triplet in the sensor's native big-endian order
    pub fn put_triplet_be(&mut self, triplet: &[i16; 3]) {
        for &axis in triplet {
            self.put_i16_be(axis);
        }
    }
}

/// Sequential reader over an input buffer
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    pub fn u32_le(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    pub fn u16_le(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    pub fn i16_be(&mut self) -> i16 {
        i16::from_be_bytes(self.take())
    }

    pub fn triplet_be(&mut self) -> [i16; 3] {
        [self.i16_be(), self.i16_be(), self.i16_be()]
    }
}
