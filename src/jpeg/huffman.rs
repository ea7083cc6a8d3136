// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Huffman decode tables with a direct 16-bit prefix lookup.
//!
//! Every table is a flat 65536-entry array indexed by the next 16 bits of the
//! bitstream. Each entry holds the code length and symbol of the unique code
//! that prefixes those bits, or length 0 if no code does. Decoding a symbol is
//! one `peek(16)`, one array load and one `skip`.

use std::fmt;

use super::bitio::BitReader;
use super::error::{BitstreamFault, JpegError, Result};

/// Number of lookup entries: one per 16-bit pattern.
pub const LOOKUP_SIZE: usize = 1 << 16;

/// DC or AC table class (the high nibble of a DHT `Tc/Th` byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableClass {
    Dc,
    Ac,
}

impl fmt::Display for TableClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dc => f.write_str("DC"),
            Self::Ac => f.write_str("AC"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    /// Code length in bits; 0 marks an unpopulated pattern.
    length: u8,
    symbol: u8,
}

impl Entry {
    const EMPTY: Self = Self { length: 0, symbol: 0 };
}

/// Canonical Huffman decode table for one (class, index) slot.
pub struct HuffmanTable {
    class: TableClass,
    index: u8,
    lookup: Box<[Entry; LOOKUP_SIZE]>,
}

impl HuffmanTable {
    /// Build from the 16 per-length code counts and the symbol list.
    ///
    /// Codes are assigned per ITU-T T.81 Annex C: lengths ascending, code value
    /// incremented per symbol and shifted left once per length step. Returns
    /// `None` if the counts do not match `symbols` or oversubscribe the code
    /// space of some length.
    pub fn build(class: TableClass, index: u8, counts: &[u8; 16], symbols: &[u8]) -> Option<Self> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total != symbols.len() || total > 256 {
            return None;
        }

        let mut lookup: Box<[Entry; LOOKUP_SIZE]> = vec![Entry::EMPTY; LOOKUP_SIZE]
            .into_boxed_slice()
            .try_into()
            .ok()?;

        let mut code: u32 = 0;
        let mut next = symbols.iter();
        for length in 1..=16u8 {
            for _ in 0..counts[length as usize - 1] {
                if code >= 1 << length {
                    return None;
                }
                let symbol = *next.next()?;
                let shift = 16 - length;
                let lo = (code << shift) as usize;
                let hi = lo + (1usize << shift);
                lookup[lo..hi].fill(Entry { length, symbol });
                code += 1;
            }
            code <<= 1;
        }

        log::trace!("built {class} Huffman table {index}: {total} symbols");
        Some(Self { class, index, lookup })
    }

    /// Resolve a 16-bit bitstream prefix to `(code_length, symbol)`.
    #[inline]
    pub fn lookup(&self, bits: u16) -> Option<(u8, u8)> {
        let e = self.lookup[bits as usize];
        (e.length != 0).then_some((e.length, e.symbol))
    }

    /// Decode one symbol: peek 16 bits, look up, skip the code length.
    #[inline]
    pub fn decode(&self, reader: &mut BitReader) -> Result<u8> {
        let bits = reader.peek(16)?;
        match self.lookup(bits) {
            Some((length, symbol)) => {
                reader.skip(length)?;
                Ok(symbol)
            }
            None => Err(JpegError::corrupt(
                reader.byte_position(),
                BitstreamFault::InvalidCode { class: self.class, index: self.index },
            )),
        }
    }
}

/// Sign-extend `bits` additional bits of magnitude category `size`
/// (T.81 Table F.1). Values below `2^(size-1)` are negative.
#[inline]
pub fn extend(value: u16, size: u8) -> i32 {
    if size == 0 {
        return 0;
    }
    let value = value as i32;
    if value < 1 << (size - 1) {
        value - ((1 << size) - 1)
    } else {
        value
    }
}
