// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Coefficient blocks, quantization tables and dequantization.

/// One 8×8 block of 64 signed values in natural (row-major) order.
///
/// Holds entropy-decoded coefficients, then dequantized coefficients, then
/// (after [`idct`](super::idct::idct)) level-shifted spatial samples.
pub type Block = [i32; 64];

/// The six blocks of one 4:2:0 MCU: Y top-left, Y top-right, Y bottom-left,
/// Y bottom-right, Cb, Cr.
pub type McuBlocks = [Block; 6];

/// Index of the Cb block within [`McuBlocks`].
pub const CB_BLOCK: usize = 4;
/// Index of the Cr block within [`McuBlocks`].
pub const CR_BLOCK: usize = 5;

/// Quantization table: 64 values in natural (row-major) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantTable {
    /// Quantization values, indexed by row * 8 + col.
    pub values: [u8; 64],
}

impl QuantTable {
    pub fn new(values: [u8; 64]) -> Self {
        Self { values }
    }

    /// Elementwise `block[i] *= values[i]`.
    #[inline]
    pub fn dequantize(&self, block: &mut Block) {
        for (c, &q) in block.iter_mut().zip(self.values.iter()) {
            *c *= q as i32;
        }
    }
}
