// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! # jpeg420
//!
//! Pure-Rust decoder for baseline JPEG photos with 4:2:0 chroma subsampling,
//! the layout produced by nearly every camera, webcam and MJPEG stream.
//!
//! The decoder takes one complete codestream from memory and returns packed
//! 24-bit pixels in RGB or BGR order. It performs no I/O and keeps no state
//! between calls beyond the scratch blocks a [`Decoder`] owns for reuse.
//!
//! With the `parallel` feature (on by default) [`Decoder::decode_parallel`]
//! spreads the inverse DCT and colour conversion across threads via rayon.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use jpeg420::{decode, DecodeOptions};
//!
//! let data = std::fs::read("frame.jpg").unwrap();
//! let image = decode(&data, &DecodeOptions::default()).unwrap();
//! let [r, g, b] = image.pixel(0, 0).unwrap();
//! ```

pub mod jpeg;

pub use jpeg::error::{BitstreamFault, JpegError, Result as JpegResult, Unsupported};
pub use jpeg::{decode, probe, ChannelOrder, DecodeOptions, DecodedImage, Decoder, FrameHeader, MAX_DIMENSION};
