// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for JPEG container parsing and entropy decoding.
//!
//! Every error aborts the whole decode. Variants carry enough context (byte
//! offset, marker code, table id) to diagnose the offending input.

use thiserror::Error;

use super::huffman::TableClass;

/// Errors that can occur while decoding a JPEG.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JpegError {
    /// A byte expected to be a marker lead (0xFF) is not, or a segment's
    /// declared length is inconsistent with the buffer.
    #[error("malformed JPEG container at byte {offset}: {reason}")]
    MalformedContainer { offset: usize, reason: &'static str },
    /// A valid JPEG construct that this decoder deliberately does not implement.
    #[error("unsupported JPEG feature at byte {offset}: {feature}")]
    UnsupportedFeature { offset: usize, feature: Unsupported },
    /// A marker code outside the recognized set.
    #[error("unknown marker 0xFF{marker:02X} at byte {offset}")]
    UnknownMarker { marker: u8, offset: usize },
    /// Bit-level desynchronization inside the entropy-coded segment.
    /// `offset` is the byte position in the de-stuffed scan data.
    #[error("corrupt entropy-coded data at scan byte {offset}: {fault}")]
    CorruptBitstream { fault: BitstreamFault, offset: usize },
    /// The frame is larger than the configured pixel limit.
    #[error("image {width}x{height} exceeds the configured pixel limit")]
    LimitExceeded { width: u16, height: u16 },
    /// A caller-supplied output slice cannot hold the decoded image.
    #[error("output buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
}

/// JPEG constructs that are recognized but rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    #[error("{0}-bit sample precision")]
    Precision(u8),
    #[error("{0} components (only 3-component YCbCr)")]
    ComponentCount(u8),
    #[error("sampling factors 0x{factors:02X} on component {component} (only 4:2:0)")]
    Sampling { component: usize, factors: u8 },
    #[error("16-bit quantization table values (precision nibble {0})")]
    QuantPrecision(u8),
    #[error("spectral selection {start}..={end} (progressive scan)")]
    SpectralSelection { start: u8, end: u8 },
    #[error("restart interval (DRI)")]
    RestartInterval,
    #[error("restart marker RST{0}")]
    RestartMarker(u8),
    #[error("arithmetic coding")]
    ArithmeticCoding,
    #[error("frame type SOF{0}")]
    FrameType(u8),
    #[error("Huffman selector 0x{selector:02X} on scan component {component}")]
    HuffmanSelector { component: usize, selector: u8 },
    #[error("Huffman table index {0}")]
    HuffmanTableIndex(u8),
    #[error("scan component order differs from frame")]
    ScanComponentOrder,
    #[error("multiple scans")]
    MultipleScans,
    #[error("image height defined by DNL marker")]
    DefinedByDnl,
}

/// The specific way an entropy-coded segment failed to decode.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitstreamFault {
    #[error("no code in {class} Huffman table {index}")]
    InvalidCode { class: TableClass, index: u8 },
    #[error("DC difference category {0} out of range")]
    DcCategory(u8),
    #[error("AC symbol 0x{0:02X} has zero size with non-ZRL run")]
    ZeroSizeRun(u8),
    #[error("AC run past the end of the block")]
    CoefficientOverrun,
    #[error("bit reader ran past the end of the scan data")]
    Exhausted,
}

impl JpegError {
    pub(crate) fn malformed(offset: usize, reason: &'static str) -> Self {
        Self::MalformedContainer { offset, reason }
    }

    pub(crate) fn unsupported(offset: usize, feature: Unsupported) -> Self {
        Self::UnsupportedFeature { offset, feature }
    }

    pub(crate) fn corrupt(offset: usize, fault: BitstreamFault) -> Self {
        Self::CorruptBitstream { fault, offset }
    }
}

pub type Result<T> = std::result::Result<T, JpegError>;
