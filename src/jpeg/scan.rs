// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Entropy-coded scan extraction and per-block coefficient decoding.
//!
//! A 4:2:0 MCU is coded as four luma blocks followed by one Cb and one Cr
//! block. Each component keeps its own DC predictor for the whole image since
//! restart markers are not supported.

use super::bitio::BitReader;
use super::dct::{Block, McuBlocks, QuantTable, CB_BLOCK, CR_BLOCK};
use super::error::{BitstreamFault, JpegError, Result};
use super::huffman::{extend, HuffmanTable};
use super::zigzag::ZIGZAG_TO_NATURAL;

/// Largest DC difference category for 8-bit samples.
const MAX_DC_CATEGORY: u8 = 11;

/// End of block: remaining coefficients are zero.
const EOB: u8 = 0x00;
/// Zero run length: sixteen zero coefficients.
const ZRL: u8 = 0xF0;

/// Copy the entropy-coded segment starting at `start`, removing byte
/// stuffing, and append two zero bytes so a trailing 16-bit peek stays in
/// bounds.
///
/// Returns the data and the offset of the 0xFF that ended the scan (or the end
/// of input), where marker parsing resumes.
pub fn extract_scan_data(data: &[u8], start: usize) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(data.len().saturating_sub(start) + 2);
    let mut pos = start;
    while let Some(&byte) = data.get(pos) {
        if byte == 0xFF {
            if data.get(pos + 1) != Some(&0x00) {
                break;
            }
            out.push(0xFF);
            pos += 2;
        } else {
            out.push(byte);
            pos += 1;
        }
    }
    out.extend_from_slice(&[0, 0]);
    (out, pos)
}

/// Running DC value per component, threaded through the MCU loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DcPredictors {
    pub y: i32,
    pub cb: i32,
    pub cr: i32,
}

/// Huffman tables for one component class.
#[derive(Clone, Copy)]
pub struct ClassTables<'t> {
    pub dc: &'t HuffmanTable,
    pub ac: &'t HuffmanTable,
}

/// Decode one 8×8 block into `block` (natural order), updating `pred`.
///
/// The running predictor is unbounded; the DC written to `block` is clamped
/// to the i16 range.
pub fn decode_block(
    reader: &mut BitReader,
    tables: ClassTables,
    pred: &mut i32,
    block: &mut Block,
) -> Result<()> {
    let size = tables.dc.decode(reader)?;
    if size > MAX_DC_CATEGORY {
        return Err(JpegError::corrupt(reader.byte_position(), BitstreamFault::DcCategory(size)));
    }
    let diff = extend(reader.read(size)?, size);
    *pred = pred.saturating_add(diff);
    // Stored coefficients stay in i16 range so dequantization cannot overflow.
    block[0] = (*pred).clamp(i16::MIN as i32, i16::MAX as i32);
    block[1..].fill(0);

    let mut k = 1usize;
    while k < 64 {
        let rs = tables.ac.decode(reader)?;
        match rs {
            EOB => break,
            ZRL => k += 16,
            _ => {
                let run = (rs >> 4) as usize;
                let size = rs & 0x0F;
                if size == 0 {
                    return Err(JpegError::corrupt(reader.byte_position(), BitstreamFault::ZeroSizeRun(rs)));
                }
                k += run;
                if k > 63 {
                    return Err(JpegError::corrupt(reader.byte_position(), BitstreamFault::CoefficientOverrun));
                }
                block[ZIGZAG_TO_NATURAL[k]] = extend(reader.read(size)?, size);
                k += 1;
            }
        }
    }
    Ok(())
}

/// Entropy-decode and dequantize the six blocks of one MCU.
///
/// `quant` holds the Y, Cb and Cr tables; `luma` and `chroma` the Huffman
/// tables for table ids 0 and 1.
pub fn decode_mcu(
    reader: &mut BitReader,
    luma: ClassTables,
    chroma: ClassTables,
    quant: &[QuantTable; 3],
    dc: &mut DcPredictors,
    blocks: &mut McuBlocks,
) -> Result<()> {
    for block in blocks[..CB_BLOCK].iter_mut() {
        decode_block(reader, luma, &mut dc.y, block)?;
        quant[0].dequantize(block);
    }
    decode_block(reader, chroma, &mut dc.cb, &mut blocks[CB_BLOCK])?;
    quant[1].dequantize(&mut blocks[CB_BLOCK]);
    decode_block(reader, chroma, &mut dc.cr, &mut blocks[CR_BLOCK])?;
    quant[2].dequantize(&mut blocks[CR_BLOCK]);
    Ok(())
}
