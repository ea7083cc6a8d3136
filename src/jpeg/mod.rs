// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Baseline JPEG decoder for 8-bit YCbCr 4:2:0 images.
//!
//! Decodes one in-memory codestream into a packed RGB or BGR pixel buffer
//! whose rows cover whole MCUs and are padded to a multiple of 4 bytes.
//!
//! Supports:
//! - Baseline sequential DCT (SOF0), 8-bit precision, Huffman coding
//! - Three components with 2×2 / 1×1 / 1×1 sampling, one interleaved scan
//! - Several tables per DQT/DHT segment, fill bytes before markers
//!
//! Does NOT support:
//! - Progressive, lossless or hierarchical frames
//! - Arithmetic coding, restart intervals, 12-bit precision
//! - Grayscale or other sampling layouts
//!
//! All of the above are rejected with [`JpegError::UnsupportedFeature`].

pub mod bitio;
pub mod dct;
pub mod error;
pub mod frame;
pub mod huffman;
pub mod idct;
pub mod marker;
pub mod pixels;
pub mod scan;
pub mod tables;
pub mod zigzag;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use bitio::BitReader;
use dct::McuBlocks;
use error::{JpegError, Result};
use frame::MCU_SIZE;
use marker::Container;
use scan::{ClassTables, DcPredictors};

pub use frame::{FrameHeader, MAX_DIMENSION};
pub use marker::probe;
pub use pixels::ChannelOrder;

/// Per-decode settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Byte order of each output pixel.
    pub order: ChannelOrder,
    /// Reject images with more than this many pixels (`width * height`).
    pub max_pixels: Option<u64>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = Some(max_pixels);
        self
    }

    fn check_limit(&self, frame: &FrameHeader) -> Result<()> {
        match self.max_pixels {
            Some(limit) if frame.width as u64 * frame.height as u64 > limit => {
                Err(JpegError::LimitExceeded { width: frame.width, height: frame.height })
            }
            _ => Ok(()),
        }
    }
}

/// A decoded image.
///
/// `pixels` holds `stride * mcu_rows * 16` bytes. Rows and columns past
/// `width`/`height` belong to the padded MCU grid and carry whatever the
/// edge blocks decoded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u16,
    pub height: u16,
    /// Bytes per row, a multiple of 4.
    pub stride: usize,
    pub order: ChannelOrder,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// The three bytes of pixel (x, y) in [`order`](Self::order), or `None`
    /// outside the image.
    pub fn pixel(&self, x: u16, y: u16) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = y as usize * self.stride + x as usize * 3;
        Some([self.pixels[at], self.pixels[at + 1], self.pixels[at + 2]])
    }

    /// The `width * 3` meaningful bytes of row `y`, without padding.
    pub fn row(&self, y: u16) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        Some(&self.pixels[start..start + self.width as usize * 3])
    }
}

/// Reusable decoder.
///
/// Owns the six per-MCU block buffers so repeated decodes (e.g. a stream of
/// frames) do not reallocate them. One instance serves one decode at a time.
pub struct Decoder {
    options: DecodeOptions,
    blocks: McuBlocks,
}

impl Decoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options, blocks: [[0; 64]; 6] }
    }

    /// Decode into a freshly allocated image.
    pub fn decode(&mut self, data: &[u8]) -> Result<DecodedImage> {
        let mut pixels = Vec::new();
        let frame = self.decode_into(data, &mut pixels)?;
        Ok(self.image(&frame, pixels))
    }

    /// Decode into `out`, resizing it to exactly the output length. The
    /// allocation is kept across calls when it is already large enough.
    pub fn decode_into(&mut self, data: &[u8], out: &mut Vec<u8>) -> Result<FrameHeader> {
        let container = self.parse(data)?;
        out.clear();
        out.resize(container.frame.output_len(), 0);
        self.render(&container, out)?;
        Ok(container.frame)
    }

    /// Decode into a caller-owned slice of at least
    /// [`FrameHeader::output_len`] bytes. Bytes past that length are left
    /// untouched.
    pub fn decode_to_slice(&mut self, data: &[u8], out: &mut [u8]) -> Result<FrameHeader> {
        let container = self.parse(data)?;
        let needed = container.frame.output_len();
        if out.len() < needed {
            return Err(JpegError::BufferTooSmall { needed, got: out.len() });
        }
        self.render(&container, &mut out[..needed])?;
        Ok(container.frame)
    }

    /// Decode with the transform and colour stages spread across MCU rows.
    ///
    /// Entropy decoding stays sequential because of the DC prediction chain;
    /// every MCU's dequantized coefficients are buffered, then each MCU row is
    /// transformed and converted independently. The result is identical to
    /// [`decode`](Self::decode).
    pub fn decode_parallel(&self, data: &[u8]) -> Result<DecodedImage> {
        let container = self.parse(data)?;
        let frame = &container.frame;
        let cols = frame.mcu_cols();
        let stride = frame.stride();

        let mut mcus: Vec<McuBlocks> = vec![[[0; 64]; 6]; cols * frame.mcu_rows()];
        let mut reader = BitReader::new(&container.scan_data);
        let (luma, chroma) = class_tables(&container);
        let mut dc = DcPredictors::default();
        for mcu in mcus.iter_mut() {
            scan::decode_mcu(&mut reader, luma, chroma, &container.quant, &mut dc, mcu)?;
        }

        let mut out = vec![0u8; frame.output_len()];
        let order = self.options.order;
        let render_row = |(band, row): (&mut [u8], &mut [McuBlocks])| {
            for (mcu_x, mcu) in row.iter_mut().enumerate() {
                mcu.iter_mut().for_each(idct::idct);
                pixels::write_mcu(mcu, band, stride, mcu_x, order);
            }
        };

        #[cfg(feature = "parallel")]
        out.par_chunks_mut(stride * MCU_SIZE)
            .zip(mcus.par_chunks_mut(cols))
            .for_each(render_row);
        #[cfg(not(feature = "parallel"))]
        out.chunks_mut(stride * MCU_SIZE)
            .zip(mcus.chunks_mut(cols))
            .for_each(render_row);

        Ok(self.image(frame, out))
    }

    fn parse(&self, data: &[u8]) -> Result<Container> {
        // Check the limit from the header alone so an oversized image is
        // rejected before its scan is copied.
        if self.options.max_pixels.is_some() {
            self.options.check_limit(&marker::probe(data)?)?;
        }
        let container = marker::parse_container(data)?;
        log::debug!(
            "decode: {}x{}, {}x{} MCUs, {} scan bytes",
            container.frame.width,
            container.frame.height,
            container.frame.mcu_cols(),
            container.frame.mcu_rows(),
            container.scan_data.len() - 2
        );
        Ok(container)
    }

    /// Decode every MCU in raster order into `out`, which must be exactly
    /// `output_len` bytes.
    fn render(&mut self, container: &Container, out: &mut [u8]) -> Result<()> {
        let frame = &container.frame;
        let stride = frame.stride();
        let order = self.options.order;
        let mut reader = BitReader::new(&container.scan_data);
        let (luma, chroma) = class_tables(container);
        let mut dc = DcPredictors::default();

        for band in out.chunks_exact_mut(stride * MCU_SIZE) {
            for mcu_x in 0..frame.mcu_cols() {
                scan::decode_mcu(&mut reader, luma, chroma, &container.quant, &mut dc, &mut self.blocks)?;
                self.blocks.iter_mut().for_each(idct::idct);
                pixels::write_mcu(&self.blocks, band, stride, mcu_x, order);
            }
        }
        Ok(())
    }

    fn image(&self, frame: &FrameHeader, pixels: Vec<u8>) -> DecodedImage {
        DecodedImage {
            width: frame.width,
            height: frame.height,
            stride: frame.stride(),
            order: self.options.order,
            pixels,
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}

fn class_tables(container: &Container) -> (ClassTables<'_>, ClassTables<'_>) {
    (
        ClassTables { dc: &container.dc_tables[0], ac: &container.ac_tables[0] },
        ClassTables { dc: &container.dc_tables[1], ac: &container.ac_tables[1] },
    )
}

/// Decode a JPEG with the given options.
pub fn decode(data: &[u8], options: &DecodeOptions) -> Result<DecodedImage> {
    Decoder::new(options.clone()).decode(data)
}
