// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! YCbCr → RGB conversion with nearest-neighbour chroma upsampling.
//!
//! Works on one 4:2:0 MCU at a time: four luma blocks tile the 16×16 area and
//! each chroma sample covers a 2×2 pixel group. Samples are still level-shifted
//! (centred on zero) when they arrive here.

use super::dct::{McuBlocks, CB_BLOCK, CR_BLOCK};
use super::frame::MCU_SIZE;

/// Byte order of each output pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ChannelOrder {
    /// Byte offsets of red and blue within a 3-byte pixel.
    #[inline]
    fn red_blue(self) -> (usize, usize) {
        match self {
            ChannelOrder::Rgb => (0, 2),
            ChannelOrder::Bgr => (2, 0),
        }
    }
}

#[inline]
fn clamp_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert one level-shifted YCbCr sample triple to `(r, g, b)`.
#[inline]
pub fn ycbcr_to_rgb(luma: i32, cb: i32, cr: i32) -> (u8, u8, u8) {
    let y = (luma + 128) as f64;
    let cb = cb as f64;
    let cr = cr as f64;
    (
        clamp_u8(y + 1.402 * cr),
        clamp_u8(y - 0.344 * cb - 0.714 * cr),
        clamp_u8(y + 1.772 * cb),
    )
}

/// Write the 16×16 pixels of the MCU in column `mcu_x` into `band`, the
/// `stride * 16` byte slice holding that MCU row.
pub fn write_mcu(blocks: &McuBlocks, band: &mut [u8], stride: usize, mcu_x: usize, order: ChannelOrder) {
    let (ri, bi) = order.red_blue();
    let cb = &blocks[CB_BLOCK];
    let cr = &blocks[CR_BLOCK];
    let x0 = mcu_x * MCU_SIZE * 3;

    for y in 0..MCU_SIZE {
        let row = &mut band[y * stride + x0..y * stride + x0 + MCU_SIZE * 3];
        let luma_row = (y / 8) * 2;
        let chroma_row = (y / 2) * 8;
        for (x, px) in row.chunks_exact_mut(3).enumerate() {
            let luma = blocks[luma_row + x / 8][(y % 8) * 8 + x % 8];
            let c = chroma_row + x / 2;
            let (r, g, b) = ycbcr_to_rgb(luma, cb[c], cr[c]);
            px[ri] = r;
            px[1] = g;
            px[bi] = b;
        }
    }
}
