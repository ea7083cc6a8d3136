// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Index maps between transmission (zigzag) order and natural row-major order.

/// Zigzag position (0–63) → natural index `row * 8 + col`.
///
/// Applied when de-zigzagging DQT payloads and when placing decoded AC
/// coefficients into a [`Block`](super::dct::Block).
#[rustfmt::skip]
pub const ZIGZAG_TO_NATURAL: [usize; 64] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Natural index → zigzag position. Inverse of [`ZIGZAG_TO_NATURAL`].
pub const NATURAL_TO_ZIGZAG: [usize; 64] = {
    let mut table = [0usize; 64];
    let mut zz = 0;
    while zz < 64 {
        table[ZIGZAG_TO_NATURAL[zz]] = zz;
        zz += 1;
    }
    table
};
