// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! DQT (Define Quantization Table) and DHT (Define Huffman Table) parsing.
//!
//! Both segment kinds may define several tables back to back. Quantization
//! values arrive in zigzag order and are stored in natural order.

use super::dct::QuantTable;
use super::error::{JpegError, Result, Unsupported};
use super::huffman::{HuffmanTable, TableClass};
use super::zigzag::ZIGZAG_TO_NATURAL;

/// Quantization table slots 0–3.
pub type QuantSlots = [Option<QuantTable>; 4];

/// Huffman table slots indexed by `class * 2 + index`: DC0, DC1, AC0, AC1.
pub type HuffmanSlots = [Option<HuffmanTable>; 4];

/// Slot position of a Huffman table within [`HuffmanSlots`].
pub fn huffman_slot(class: TableClass, index: u8) -> usize {
    match class {
        TableClass::Dc => index as usize,
        TableClass::Ac => 2 + index as usize,
    }
}

/// Parse a DQT segment body and store each table in its slot.
/// `offset` is the position of the body in the input.
pub fn parse_dqt(data: &[u8], offset: usize, slots: &mut QuantSlots) -> Result<()> {
    let mut pos = 0;
    while pos < data.len() {
        let pq_tq = data[pos];
        let precision = pq_tq >> 4;
        let id = pq_tq & 0x0F;
        if precision != 0 {
            return Err(JpegError::unsupported(offset + pos, Unsupported::QuantPrecision(precision)));
        }
        if id > 3 {
            return Err(JpegError::malformed(offset + pos, "quantization table id out of range"));
        }
        pos += 1;

        let Some(zz) = data.get(pos..pos + 64) else {
            return Err(JpegError::malformed(offset + pos, "DQT segment shorter than 64 values"));
        };
        let mut values = [0u8; 64];
        for (k, &q) in zz.iter().enumerate() {
            values[ZIGZAG_TO_NATURAL[k]] = q;
        }
        pos += 64;

        log::debug!("DQT: table {id}");
        slots[id as usize] = Some(QuantTable::new(values));
    }
    Ok(())
}

/// Parse a DHT segment body, build each table and store it in its slot.
pub fn parse_dht(data: &[u8], offset: usize, slots: &mut HuffmanSlots) -> Result<()> {
    let mut pos = 0;
    while pos < data.len() {
        let tc_th = data[pos];
        let class = match tc_th >> 4 {
            0 => TableClass::Dc,
            1 => TableClass::Ac,
            _ => return Err(JpegError::malformed(offset + pos, "Huffman table class out of range")),
        };
        let index = tc_th & 0x0F;
        if index > 3 {
            return Err(JpegError::malformed(offset + pos, "Huffman table id out of range"));
        }
        if index > 1 {
            return Err(JpegError::unsupported(offset + pos, Unsupported::HuffmanTableIndex(index)));
        }
        pos += 1;

        let Some(count_bytes) = data.get(pos..pos + 16) else {
            return Err(JpegError::malformed(offset + pos, "DHT segment missing code counts"));
        };
        let mut counts = [0u8; 16];
        counts.copy_from_slice(count_bytes);
        pos += 16;

        let total: usize = counts.iter().map(|&c| c as usize).sum();
        let Some(symbols) = data.get(pos..pos + total) else {
            return Err(JpegError::malformed(offset + pos, "DHT segment shorter than its symbol list"));
        };
        let table = HuffmanTable::build(class, index, &counts, symbols)
            .ok_or(JpegError::malformed(offset + pos, "invalid Huffman code lengths"))?;
        pos += total;

        log::debug!("DHT: {class} table {index}, {total} symbols");
        slots[huffman_slot(class, index)] = Some(table);
    }
    Ok(())
}
