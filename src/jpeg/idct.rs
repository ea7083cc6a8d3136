// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Separable 8×8 inverse DCT as two matrix products, `Cᵀ · M · C`.
//!
//! `C[u][x] = c(u) * cos((2x + 1) * u * π / 16)` with `c(0) = √(1/8)` and
//! `c(u>0) = √(1/4)`. The basis and its transpose are computed once per process
//! and shared read-only; per-call intermediates live on the stack.

use std::f64::consts::PI;
use std::sync::OnceLock;

use super::dct::Block;

struct Basis {
    c: [[f64; 8]; 8],
    ct: [[f64; 8]; 8],
}

static BASIS: OnceLock<Basis> = OnceLock::new();

fn basis() -> &'static Basis {
    BASIS.get_or_init(|| {
        let mut c = [[0.0f64; 8]; 8];
        for (u, row) in c.iter_mut().enumerate() {
            let norm = (if u == 0 { 0.125f64 } else { 0.25 }).sqrt();
            for (x, v) in row.iter_mut().enumerate() {
                *v = norm * ((2 * x + 1) as f64 * u as f64 * PI / 16.0).cos();
            }
        }
        let mut ct = [[0.0f64; 8]; 8];
        for u in 0..8 {
            for x in 0..8 {
                ct[x][u] = c[u][x];
            }
        }
        Basis { c, ct }
    })
}

/// Transform a dequantized coefficient block into level-shifted spatial
/// samples (roughly −128..=127), in place. Results are rounded half away
/// from zero.
pub fn idct(block: &mut Block) {
    let Basis { c, ct } = basis();

    // tmp = Cᵀ · M
    let mut tmp = [[0.0f64; 8]; 8];
    for y in 0..8 {
        for x in 0..8 {
            let mut sum = 0.0;
            for k in 0..8 {
                sum += ct[y][k] * block[k * 8 + x] as f64;
            }
            tmp[y][x] = sum;
        }
    }

    // out = tmp · C
    for y in 0..8 {
        for x in 0..8 {
            let mut sum = 0.0;
            for k in 0..8 {
                sum += tmp[y][k] * c[k][x];
            }
            block[y * 8 + x] = sum.round() as i32;
        }
    }
}
