// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Bit-level reader for de-stuffed entropy-coded scan data.
//!
//! Byte stuffing (0xFF00 → 0xFF) is removed when the scan is extracted (see
//! [`extract_scan_data`](super::scan::extract_scan_data)), so the reader is a
//! plain MSB-first cursor. Callers guarantee two trailing zero bytes so that a
//! 16-bit Huffman peek at the last code never runs off the end.

use super::error::{BitstreamFault, JpegError, Result};

/// MSB-first bit cursor over a byte slice.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Bit accumulator. Valid bits are the low `bits_left` bits, MSB first.
    buf: u32,
    bits_left: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            buf: 0,
            bits_left: 0,
        }
    }

    /// Return the next `count` bits (1–16) right-aligned, without consuming them.
    pub fn peek(&mut self, count: u8) -> Result<u16> {
        debug_assert!((1..=16).contains(&count));
        self.ensure(count)?;
        let val = (self.buf >> (self.bits_left - count)) & ((1u32 << count) - 1);
        Ok(val as u16)
    }

    /// Return the next `count` bits (0–16) right-aligned and consume them.
    /// A zero-bit read yields 0 and touches nothing.
    pub fn read(&mut self, count: u8) -> Result<u16> {
        if count == 0 {
            return Ok(0);
        }
        let val = self.peek(count)?;
        self.bits_left -= count;
        Ok(val)
    }

    /// Consume `count` bits (0–16) without returning them.
    pub fn skip(&mut self, count: u8) -> Result<()> {
        debug_assert!(count <= 16);
        self.ensure(count)?;
        self.bits_left -= count;
        Ok(())
    }

    /// Number of bits consumed so far.
    pub fn bit_position(&self) -> usize {
        self.pos * 8 - self.bits_left as usize
    }

    /// Byte offset of the next unconsumed bit.
    pub fn byte_position(&self) -> usize {
        self.bit_position() / 8
    }

    fn ensure(&mut self, count: u8) -> Result<()> {
        while self.bits_left < count {
            let Some(&byte) = self.data.get(self.pos) else {
                return Err(JpegError::corrupt(self.pos, BitstreamFault::Exhausted));
            };
            self.pos += 1;
            self.buf = (self.buf << 8) | byte as u32;
            self.bits_left += 8;
        }
        Ok(())
    }
}
