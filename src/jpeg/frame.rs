// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Frame header (SOF0) parsing.
//!
//! Only 8-bit, three-component YCbCr with 4:2:0 sampling is accepted: the luma
//! component samples 2×2 and both chroma components 1×1, so every MCU covers
//! 16×16 pixels.

use super::error::{JpegError, Result, Unsupported};

/// Pixels per MCU side for 4:2:0.
pub const MCU_SIZE: usize = 16;

/// Largest width or height a SOF0 header can express.
pub const MAX_DIMENSION: u16 = u16::MAX;

const LUMA_SAMPLING: u8 = 0x22;
const CHROMA_SAMPLING: u8 = 0x11;

/// One image component as declared in SOF0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// Component identifier, referenced again by SOS.
    pub id: u8,
    /// Packed `H << 4 | V` sampling factors.
    pub sampling: u8,
    /// Quantization table slot (0–3).
    pub quant_table_id: u8,
}

/// Frame header: immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub width: u16,
    pub height: u16,
    /// Sample precision in bits; always 8 after validation.
    pub precision: u8,
    /// Y, Cb, Cr in frame order.
    pub components: [Component; 3],
}

impl FrameHeader {
    /// MCUs per row, `ceil(width / 16)`.
    pub fn mcu_cols(&self) -> usize {
        (self.width as usize).div_ceil(MCU_SIZE)
    }

    /// MCU rows, `ceil(height / 16)`.
    pub fn mcu_rows(&self) -> usize {
        (self.height as usize).div_ceil(MCU_SIZE)
    }

    /// Output row length in bytes: 3 bytes per pixel over the full MCU
    /// width, padded to a multiple of 4.
    pub fn stride(&self) -> usize {
        (self.mcu_cols() * MCU_SIZE * 3 + 3) & !3
    }

    /// Size of the output buffer in bytes, `stride * mcu_rows * 16`.
    pub fn output_len(&self) -> usize {
        self.stride() * self.mcu_rows() * MCU_SIZE
    }
}

/// Parse a SOF0 segment body (after the 2-byte length). `offset` is the
/// position of the body in the input, used for error reporting.
pub fn parse_sof0(data: &[u8], offset: usize) -> Result<FrameHeader> {
    if data.len() < 6 {
        return Err(JpegError::malformed(offset, "SOF0 segment too short"));
    }

    let precision = data[0];
    if precision != 8 {
        return Err(JpegError::unsupported(offset, Unsupported::Precision(precision)));
    }

    let height = u16::from_be_bytes([data[1], data[2]]);
    let width = u16::from_be_bytes([data[3], data[4]]);
    if height == 0 {
        return Err(JpegError::unsupported(offset + 1, Unsupported::DefinedByDnl));
    }
    if width == 0 {
        return Err(JpegError::malformed(offset + 3, "zero image width"));
    }

    let count = data[5];
    if count != 3 {
        return Err(JpegError::unsupported(offset + 5, Unsupported::ComponentCount(count)));
    }
    if data.len() < 6 + 3 * 3 {
        return Err(JpegError::malformed(offset, "SOF0 segment too short for components"));
    }

    let mut components = [Component { id: 0, sampling: 0, quant_table_id: 0 }; 3];
    for (i, comp) in components.iter_mut().enumerate() {
        let at = 6 + i * 3;
        let (id, sampling, quant_table_id) = (data[at], data[at + 1], data[at + 2]);

        let expected = if i == 0 { LUMA_SAMPLING } else { CHROMA_SAMPLING };
        if sampling != expected {
            return Err(JpegError::unsupported(
                offset + at + 1,
                Unsupported::Sampling { component: i, factors: sampling },
            ));
        }
        if quant_table_id > 3 {
            return Err(JpegError::malformed(offset + at + 2, "quantization table selector out of range"));
        }
        *comp = Component { id, sampling, quant_table_id };
    }

    Ok(FrameHeader {
        width,
        height,
        precision,
        components,
    })
}
