// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Minimal baseline 4:2:0 JPEG encoder used to build test fixtures.
//!
//! Produces SOI, APP0, one DQT with two tables, SOF0, one DHT with four tables,
//! SOS, the entropy-coded scan and EOI. Coefficients can be supplied directly
//! or computed from a sample function with a forward DCT.

#![allow(dead_code)]

use std::f64::consts::PI;

use jpeg420::jpeg::zigzag::ZIGZAG_TO_NATURAL;

pub const SOF0: u8 = 0xC0;
pub const DHT: u8 = 0xC4;
pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const DQT: u8 = 0xDB;
pub const DRI: u8 = 0xDD;
pub const APP0: u8 = 0xE0;
pub const COM: u8 = 0xFE;

/// Annex K.1 luminance quantization table, natural order.
pub const LUMA_QUANT: [u8; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, 12, 12, 14, 19, 26, 58, 60, 55, 14, 13, 16, 24, 40, 57, 69,
    56, 14, 17, 22, 29, 51, 87, 80, 62, 18, 22, 37, 56, 68, 109, 103, 77, 24, 35, 55, 64, 81,
    104, 113, 92, 49, 64, 78, 87, 103, 121, 120, 101, 72, 92, 95, 98, 112, 100, 103, 99,
];

/// Annex K.2 chrominance quantization table, natural order.
pub const CHROMA_QUANT: [u8; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99, 18, 21, 26, 66, 99, 99, 99, 99, 24, 26, 56, 99, 99, 99, 99,
    99, 47, 66, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99,
];

const DC_LUMA_COUNTS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
const DC_CHROMA_COUNTS: [u8; 16] = [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];
const DC_SYMBOLS: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

const AC_LUMA_COUNTS: [u8; 16] = [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7d];
const AC_LUMA_SYMBOLS: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
    0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xa1, 0x08, 0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0,
    0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0a, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
    0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
    0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7,
    0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5,
    0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2,
    0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

const AC_CHROMA_COUNTS: [u8; 16] = [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 0x77];
const AC_CHROMA_SYMBOLS: [u8; 162] = [
    0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21, 0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
    0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91, 0xa1, 0xb1, 0xc1, 0x09, 0x23, 0x33, 0x52, 0xf0,
    0x15, 0x62, 0x72, 0xd1, 0x0a, 0x16, 0x24, 0x34, 0xe1, 0x25, 0xf1, 0x17, 0x18, 0x19, 0x1a, 0x26,
    0x27, 0x28, 0x29, 0x2a, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
    0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
    0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5,
    0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3,
    0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda,
    0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

/// MSB-first bit writer with byte stuffing; pads the last byte with ones.
pub struct BitWriter {
    output: Vec<u8>,
    buf: u8,
    bits_used: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self { output: Vec::new(), buf: 0, bits_used: 0 }
    }

    /// Write the low `count` bits of `value`; `count` may be 0.
    pub fn write_bits(&mut self, value: u16, count: u8) {
        for i in (0..count).rev() {
            let bit = (value >> i) & 1;
            self.buf = (self.buf << 1) | bit as u8;
            self.bits_used += 1;
            if self.bits_used == 8 {
                self.emit_byte(self.buf);
                self.buf = 0;
                self.bits_used = 0;
            }
        }
    }

    pub fn flush(mut self) -> Vec<u8> {
        if self.bits_used > 0 {
            let remaining = 8 - self.bits_used;
            self.buf = (self.buf << remaining) | ((1u8 << remaining) - 1);
            self.emit_byte(self.buf);
        }
        self.output
    }

    fn emit_byte(&mut self, byte: u8) {
        self.output.push(byte);
        if byte == 0xFF {
            self.output.push(0x00);
        }
    }
}

/// Code counts per length and symbols, as carried in DHT.
#[derive(Debug, Clone)]
pub struct HuffmanSpec {
    pub counts: [u8; 16],
    pub symbols: Vec<u8>,
}

impl HuffmanSpec {
    pub fn new(counts: [u8; 16], symbols: &[u8]) -> Self {
        Self { counts, symbols: symbols.to_vec() }
    }

    /// `(code, length)` per symbol, assigned canonically.
    fn codes(&self) -> Vec<Option<(u16, u8)>> {
        let mut codes = vec![None; 256];
        let mut code = 0u32;
        let mut k = 0;
        for len in 1..=16u8 {
            for _ in 0..self.counts[len as usize - 1] {
                codes[self.symbols[k] as usize] = Some((code as u16, len));
                code += 1;
                k += 1;
            }
            code <<= 1;
        }
        codes
    }
}

/// DC and AC tables for luma (index 0) and chroma (index 1).
#[derive(Debug, Clone)]
pub struct TableSet {
    pub dc: [HuffmanSpec; 2],
    pub ac: [HuffmanSpec; 2],
}

impl TableSet {
    /// The typical tables from Annex K.3.
    pub fn standard() -> Self {
        Self {
            dc: [
                HuffmanSpec::new(DC_LUMA_COUNTS, &DC_SYMBOLS),
                HuffmanSpec::new(DC_CHROMA_COUNTS, &DC_SYMBOLS),
            ],
            ac: [
                HuffmanSpec::new(AC_LUMA_COUNTS, &AC_LUMA_SYMBOLS),
                HuffmanSpec::new(AC_CHROMA_COUNTS, &AC_CHROMA_SYMBOLS),
            ],
        }
    }
}

/// Quantized coefficients of one MCU, natural order: Y0 Y1 Y2 Y3 Cb Cr.
pub type Mcu = [[i32; 64]; 6];

/// Everything needed to write one baseline 4:2:0 JPEG.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub width: u16,
    pub height: u16,
    /// Luma and chroma quantization tables, natural order.
    pub quant: [[u8; 64]; 2],
    pub tables: TableSet,
    /// MCUs in raster order.
    pub mcus: Vec<Mcu>,
}

impl Fixture {
    /// Forward-transform `sample(x, y) -> [Y, Cb, Cr]` (0..=255 each) with
    /// standard Huffman tables. Chroma is the mean of each 2×2 group;
    /// coordinates past the image edge repeat the last column/row.
    pub fn from_samples(
        width: u16,
        height: u16,
        quant: [[u8; 64]; 2],
        sample: impl Fn(usize, usize) -> [f64; 3],
    ) -> Self {
        let (w, h) = (width as usize, height as usize);
        let at = |x: usize, y: usize| sample(x.min(w - 1), y.min(h - 1));
        let cols = w.div_ceil(16);
        let rows = h.div_ceil(16);

        let mut mcus = Vec::with_capacity(cols * rows);
        for my in 0..rows {
            for mx in 0..cols {
                let mut mcu = [[0i32; 64]; 6];
                for (b, block) in mcu[..4].iter_mut().enumerate() {
                    let bx = mx * 16 + (b % 2) * 8;
                    let by = my * 16 + (b / 2) * 8;
                    let mut s = [0.0f64; 64];
                    for y in 0..8 {
                        for x in 0..8 {
                            s[y * 8 + x] = at(bx + x, by + y)[0] - 128.0;
                        }
                    }
                    *block = quantize(&fdct(&s), &quant[0]);
                }
                for c in 0..2 {
                    let mut s = [0.0f64; 64];
                    for y in 0..8 {
                        for x in 0..8 {
                            let (px, py) = (mx * 16 + 2 * x, my * 16 + 2 * y);
                            let sum = at(px, py)[c + 1]
                                + at(px + 1, py)[c + 1]
                                + at(px, py + 1)[c + 1]
                                + at(px + 1, py + 1)[c + 1];
                            s[y * 8 + x] = sum / 4.0 - 128.0;
                        }
                    }
                    mcu[4 + c] = quantize(&fdct(&s), &quant[1]);
                }
                mcus.push(mcu);
            }
        }

        Self { width, height, quant, tables: TableSet::standard(), mcus }
    }

    /// A flat image of one YCbCr colour.
    pub fn solid(width: u16, height: u16, quant: [[u8; 64]; 2], ycbcr: [f64; 3]) -> Self {
        Self::from_samples(width, height, quant, |_, _| ycbcr)
    }

    /// The stuffed entropy-coded segment.
    pub fn scan(&self) -> Vec<u8> {
        let dc = [self.tables.dc[0].codes(), self.tables.dc[1].codes()];
        let ac = [self.tables.ac[0].codes(), self.tables.ac[1].codes()];
        let mut w = BitWriter::new();
        let mut pred = [0i32; 3];
        for mcu in &self.mcus {
            for (b, block) in mcu.iter().enumerate() {
                let (comp, class) = match b {
                    0..=3 => (0, 0),
                    4 => (1, 1),
                    _ => (2, 1),
                };
                encode_block(&mut w, block, &mut pred[comp], &dc[class], &ac[class]);
            }
        }
        w.flush()
    }

    /// The complete JPEG file.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0xFF, SOI];

        segment(&mut out, APP0, b"JFIF\0\x01\x01\x00\x00\x01\x00\x01\x00\x00");

        let mut dqt = Vec::with_capacity(130);
        for (id, table) in self.quant.iter().enumerate() {
            dqt.push(id as u8);
            dqt.extend(ZIGZAG_TO_NATURAL.iter().map(|&n| table[n]));
        }
        segment(&mut out, DQT, &dqt);

        segment(&mut out, SOF0, &sof0_body(self.width, self.height));

        let mut dht = Vec::new();
        for (id, (dc, ac)) in self.tables.dc.iter().zip(self.tables.ac.iter()).enumerate() {
            for (class, spec) in [(0u8, dc), (1u8, ac)] {
                dht.push(class << 4 | id as u8);
                dht.extend_from_slice(&spec.counts);
                dht.extend_from_slice(&spec.symbols);
            }
        }
        segment(&mut out, DHT, &dht);

        segment(&mut out, SOS, &SOS_BODY);
        out.extend(self.scan());
        out.extend([0xFF, EOI]);
        out
    }
}

/// SOS body for the three components, tables 0/1/1, full spectrum.
pub const SOS_BODY: [u8; 10] = [3, 1, 0x00, 2, 0x11, 3, 0x11, 0, 63, 0];

pub fn sof0_body(width: u16, height: u16) -> Vec<u8> {
    let mut body = vec![8];
    body.extend(height.to_be_bytes());
    body.extend(width.to_be_bytes());
    body.extend([3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]);
    body
}

/// Append a marker segment with its length field.
pub fn segment(out: &mut Vec<u8>, marker: u8, body: &[u8]) {
    out.extend([0xFF, marker]);
    out.extend(((body.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(body);
}

/// `(offset of 0xFF, marker)` of every header segment up to and including SOS.
pub fn header_segments(data: &[u8]) -> Vec<(usize, u8)> {
    let mut found = vec![(0, data[1])];
    let mut pos = 2;
    while pos + 3 < data.len() && data[pos] == 0xFF {
        let marker = data[pos + 1];
        found.push((pos, marker));
        if marker == SOS {
            break;
        }
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        pos += 2 + len;
    }
    found
}

/// Byte range `[start, end)` of the first segment with `marker`, including
/// its marker bytes.
pub fn segment_range(data: &[u8], marker: u8) -> Option<(usize, usize)> {
    let (start, _) = header_segments(data).into_iter().find(|&(_, m)| m == marker)?;
    let len = u16::from_be_bytes([data[start + 2], data[start + 3]]) as usize;
    Some((start, start + 2 + len))
}

pub fn remove_segment(data: &[u8], marker: u8) -> Vec<u8> {
    let (start, end) = segment_range(data, marker).expect("segment present");
    [&data[..start], &data[end..]].concat()
}

/// Insert `bytes` right before the first segment with `marker`.
pub fn insert_before(data: &[u8], marker: u8, bytes: &[u8]) -> Vec<u8> {
    let (start, _) = segment_range(data, marker).expect("segment present");
    [&data[..start], bytes, &data[start..]].concat()
}

/// Replace the body of the first segment with `marker`.
pub fn replace_body(data: &[u8], marker: u8, body: &[u8]) -> Vec<u8> {
    let (start, end) = segment_range(data, marker).expect("segment present");
    let mut seg = Vec::new();
    segment(&mut seg, marker, body);
    [&data[..start], &seg[..], &data[end..]].concat()
}

/// `(bits, size)` of a coefficient in JPEG's signed-magnitude form.
pub fn magnitude(v: i32) -> (u16, u8) {
    if v == 0 {
        return (0, 0);
    }
    let size = (32 - v.unsigned_abs().leading_zeros()) as u8;
    let bits = if v < 0 { v + (1 << size) - 1 } else { v };
    (bits as u16, size)
}

fn encode_block(
    w: &mut BitWriter,
    block: &[i32; 64],
    pred: &mut i32,
    dc: &[Option<(u16, u8)>],
    ac: &[Option<(u16, u8)>],
) {
    let put = |w: &mut BitWriter, codes: &[Option<(u16, u8)>], symbol: u8| {
        let (code, len) = codes[symbol as usize]
            .unwrap_or_else(|| panic!("symbol {symbol:#04x} missing from table"));
        w.write_bits(code, len);
    };

    let (bits, size) = magnitude(block[0] - *pred);
    *pred = block[0];
    put(w, dc, size);
    w.write_bits(bits, size);

    let mut run = 0u8;
    for &n in &ZIGZAG_TO_NATURAL[1..] {
        let v = block[n];
        if v == 0 {
            run += 1;
            continue;
        }
        while run > 15 {
            put(w, ac, 0xF0);
            run -= 16;
        }
        let (bits, size) = magnitude(v);
        put(w, ac, run << 4 | size);
        w.write_bits(bits, size);
        run = 0;
    }
    if run > 0 {
        put(w, ac, 0x00);
    }
}

/// Orthonormal 8×8 forward DCT of level-shifted samples.
pub fn fdct(samples: &[f64; 64]) -> [f64; 64] {
    let c = |u: usize| if u == 0 { (0.125f64).sqrt() } else { 0.5 };
    let mut out = [0.0; 64];
    for v in 0..8 {
        for u in 0..8 {
            let mut sum = 0.0;
            for y in 0..8 {
                for x in 0..8 {
                    sum += samples[y * 8 + x]
                        * ((2 * x + 1) as f64 * u as f64 * PI / 16.0).cos()
                        * ((2 * y + 1) as f64 * v as f64 * PI / 16.0).cos();
                }
            }
            out[v * 8 + u] = c(u) * c(v) * sum;
        }
    }
    out
}

fn quantize(coeffs: &[f64; 64], quant: &[u8; 64]) -> [i32; 64] {
    let mut out = [0i32; 64];
    for i in 0..64 {
        out[i] = (coeffs[i] / quant[i] as f64).round() as i32;
    }
    out
}

/// Convert RGB to full-range YCbCr (JFIF).
pub fn rgb_to_ycbcr([r, g, b]: [f64; 3]) -> [f64; 3] {
    [
        0.299 * r + 0.587 * g + 0.114 * b,
        128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b,
        128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b,
    ]
}
