// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Marker classification and the container parser.
//!
//! The parser walks the marker-delimited segments of one JPEG in a single
//! pass. Table and frame segments populate the decoder state; the first SOS
//! triggers entropy-segment extraction, after which the walk resumes at the
//! marker that ended the scan and continues until EOI or end of input.

use super::dct::QuantTable;
use super::error::{JpegError, Result, Unsupported};
use super::frame::{parse_sof0, FrameHeader};
use super::huffman::{HuffmanTable, TableClass};
use super::scan::extract_scan_data;
use super::tables::{huffman_slot, parse_dht, parse_dqt, HuffmanSlots, QuantSlots};

/// JPEG marker codes (the byte following 0xFF).
pub const SOF0: u8 = 0xC0;
pub const DHT: u8 = 0xC4;
pub const JPG: u8 = 0xC8;
pub const DAC: u8 = 0xCC;
pub const RST0: u8 = 0xD0;
pub const RST7: u8 = 0xD7;
pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const DQT: u8 = 0xDB;
pub const DRI: u8 = 0xDD;
pub const APP0: u8 = 0xE0;
pub const APP15: u8 = 0xEF;
pub const COM: u8 = 0xFE;

/// A marker code, classified by how the parser treats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Soi,
    Eoi,
    Sof0,
    Dht,
    Dqt,
    Sos,
    /// APP0–APP15, payload skipped.
    App(u8),
    Com,
    /// Other frame types: SOF1–SOF3, SOF5–SOF7, SOF9–SOF11, SOF13–SOF15.
    Sof(u8),
    Dac,
    Dri,
    /// RST0–RST7.
    Rst(u8),
    Unknown(u8),
}

impl Marker {
    pub fn from_code(code: u8) -> Self {
        match code {
            SOF0 => Self::Sof0,
            DHT => Self::Dht,
            DAC => Self::Dac,
            0xC1..=0xCF if code != JPG => Self::Sof(code - SOF0),
            RST0..=RST7 => Self::Rst(code - RST0),
            SOI => Self::Soi,
            EOI => Self::Eoi,
            SOS => Self::Sos,
            DQT => Self::Dqt,
            DRI => Self::Dri,
            APP0..=APP15 => Self::App(code - APP0),
            COM => Self::Com,
            _ => Self::Unknown(code),
        }
    }
}

/// Everything the top-level decode needs from one container.
pub struct Container {
    pub frame: FrameHeader,
    /// Quantization table per component: Y, Cb, Cr.
    pub quant: [QuantTable; 3],
    /// DC tables: luma (id 0), chroma (id 1).
    pub dc_tables: [HuffmanTable; 2],
    /// AC tables: luma (id 0), chroma (id 1).
    pub ac_tables: [HuffmanTable; 2],
    /// De-stuffed entropy-coded segment plus two zero padding bytes.
    pub scan_data: Vec<u8>,
}

/// Parse a complete JPEG held in memory.
pub fn parse_container(data: &[u8]) -> Result<Container> {
    let mut walker = Walker::new(data);
    walker.run(false)?;
    walker.finish()
}

/// Parse only up to and including SOF0 and return the frame header.
pub fn probe(data: &[u8]) -> Result<FrameHeader> {
    let mut walker = Walker::new(data);
    walker.run(true)?;
    walker
        .frame
        .ok_or(JpegError::malformed(walker.pos, "no SOF0 frame header"))
}

struct Walker<'a> {
    data: &'a [u8],
    pos: usize,
    seen_soi: bool,
    seen_eoi: bool,
    frame: Option<FrameHeader>,
    quant: QuantSlots,
    huffman: HuffmanSlots,
    scan: Option<ScanParts>,
}

struct ScanParts {
    quant: [QuantTable; 3],
    dc_tables: [HuffmanTable; 2],
    ac_tables: [HuffmanTable; 2],
    data: Vec<u8>,
}

impl<'a> Walker<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            seen_soi: false,
            seen_eoi: false,
            frame: None,
            quant: Default::default(),
            huffman: Default::default(),
            scan: None,
        }
    }

    fn run(&mut self, stop_at_frame: bool) -> Result<()> {
        while self.pos < self.data.len() {
            let at = self.pos;
            let marker = self.next_marker()?;
            if !self.seen_soi && marker != Marker::Soi {
                return Err(JpegError::malformed(at, "missing SOI marker (not a JPEG)"));
            }

            match marker {
                Marker::Soi => {
                    if self.seen_soi {
                        return Err(JpegError::malformed(at, "duplicate SOI marker"));
                    }
                    self.seen_soi = true;
                }
                Marker::Eoi => {
                    self.seen_eoi = true;
                    return Ok(());
                }
                Marker::App(_) | Marker::Com => {
                    self.segment()?;
                }
                // A header probe needs no tables.
                Marker::Dqt | Marker::Dht if stop_at_frame => {
                    self.segment()?;
                }
                Marker::Dqt => {
                    let (body, body_at) = self.segment()?;
                    parse_dqt(body, body_at, &mut self.quant)?;
                }
                Marker::Dht => {
                    let (body, body_at) = self.segment()?;
                    parse_dht(body, body_at, &mut self.huffman)?;
                }
                Marker::Sof0 => {
                    let (body, body_at) = self.segment()?;
                    if self.frame.is_some() {
                        return Err(JpegError::malformed(at, "duplicate SOF0 frame header"));
                    }
                    let frame = parse_sof0(body, body_at)?;
                    log::debug!(
                        "SOF0: {}x{}, {}x{} MCUs",
                        frame.width,
                        frame.height,
                        frame.mcu_cols(),
                        frame.mcu_rows()
                    );
                    self.frame = Some(frame);
                    if stop_at_frame {
                        return Ok(());
                    }
                }
                Marker::Sos => {
                    let (body, body_at) = self.segment()?;
                    if self.scan.is_some() {
                        return Err(JpegError::unsupported(at, Unsupported::MultipleScans));
                    }
                    let frame = self
                        .frame
                        .as_ref()
                        .ok_or(JpegError::malformed(at, "SOS before SOF0"))?;
                    parse_sos(body, body_at, frame)?;

                    let (quant, dc_tables, ac_tables) = self.resolve_tables(at)?;
                    let (scan_data, resume) = extract_scan_data(self.data, self.pos);
                    log::debug!(
                        "SOS: {} entropy-coded bytes ending at {resume}",
                        scan_data.len() - 2
                    );
                    self.pos = resume;
                    self.scan = Some(ScanParts { quant, dc_tables, ac_tables, data: scan_data });
                }
                Marker::Dri => {
                    return Err(JpegError::unsupported(at, Unsupported::RestartInterval));
                }
                Marker::Rst(n) => {
                    return Err(JpegError::unsupported(at, Unsupported::RestartMarker(n)));
                }
                Marker::Dac => {
                    return Err(JpegError::unsupported(at, Unsupported::ArithmeticCoding));
                }
                Marker::Sof(n) => {
                    let feature = if n >= 8 {
                        Unsupported::ArithmeticCoding
                    } else {
                        Unsupported::FrameType(n)
                    };
                    return Err(JpegError::unsupported(at, feature));
                }
                Marker::Unknown(code) => {
                    return Err(JpegError::UnknownMarker { marker: code, offset: at });
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Container> {
        if !self.seen_soi {
            return Err(JpegError::malformed(0, "missing SOI marker (not a JPEG)"));
        }
        let (Some(frame), Some(scan)) = (self.frame, self.scan) else {
            return Err(JpegError::malformed(self.pos, "no SOF0/SOS before end of data"));
        };
        if !self.seen_eoi {
            log::warn!("JPEG data ended at byte {} without EOI", self.pos);
        }
        Ok(Container {
            frame,
            quant: scan.quant,
            dc_tables: scan.dc_tables,
            ac_tables: scan.ac_tables,
            scan_data: scan.data,
        })
    }

    /// Read a marker at `pos`, skipping 0xFF fill bytes before the code.
    fn next_marker(&mut self) -> Result<Marker> {
        let at = self.pos;
        if self.data[at] != 0xFF {
            return Err(JpegError::malformed(at, "expected 0xFF marker lead byte"));
        }
        let mut p = at + 1;
        while self.data.get(p) == Some(&0xFF) {
            p += 1;
        }
        let Some(&code) = self.data.get(p) else {
            return Err(JpegError::malformed(at, "truncated marker"));
        };
        self.pos = p + 1;
        Ok(Marker::from_code(code))
    }

    /// Read a length-prefixed segment at `pos`; returns the body and its offset.
    fn segment(&mut self) -> Result<(&'a [u8], usize)> {
        let at = self.pos;
        let Some(len_bytes) = self.data.get(at..at + 2) else {
            return Err(JpegError::malformed(at, "truncated segment length"));
        };
        let length = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
        if length < 2 {
            return Err(JpegError::malformed(at, "segment length below 2"));
        }
        let Some(body) = self.data.get(at + 2..at + length) else {
            return Err(JpegError::malformed(at, "segment length exceeds data"));
        };
        self.pos = at + length;
        Ok((body, at + 2))
    }

    /// Take the tables the scan uses out of their slots.
    fn resolve_tables(&mut self, at: usize) -> Result<([QuantTable; 3], [HuffmanTable; 2], [HuffmanTable; 2])> {
        let frame = self
            .frame
            .as_ref()
            .ok_or(JpegError::malformed(at, "SOS before SOF0"))?;

        let quant_for = |i: usize| {
            self.quant[frame.components[i].quant_table_id as usize]
                .clone()
                .ok_or(JpegError::malformed(at, "scan uses an undefined quantization table"))
        };
        let quant = [quant_for(0)?, quant_for(1)?, quant_for(2)?];

        let mut take = |class: TableClass, index: u8| {
            self.huffman[huffman_slot(class, index)]
                .take()
                .ok_or(JpegError::malformed(at, "scan uses an undefined Huffman table"))
        };
        let dc_tables = [take(TableClass::Dc, 0)?, take(TableClass::Dc, 1)?];
        let ac_tables = [take(TableClass::Ac, 0)?, take(TableClass::Ac, 1)?];

        Ok((quant, dc_tables, ac_tables))
    }
}

/// Validate an SOS segment body against the frame.
///
/// The scan must interleave all three components in frame order, luma on
/// Huffman tables 0/0 and chroma on 1/1, covering spectral range 0..=63.
/// The successive-approximation byte is ignored.
pub fn parse_sos(data: &[u8], offset: usize, frame: &FrameHeader) -> Result<()> {
    let Some(&count) = data.first() else {
        return Err(JpegError::malformed(offset, "empty SOS segment"));
    };
    if count != 3 {
        return Err(JpegError::unsupported(offset, Unsupported::ComponentCount(count)));
    }
    if data.len() < 1 + 3 * 2 + 3 {
        return Err(JpegError::malformed(offset, "SOS segment too short"));
    }

    for (i, comp) in frame.components.iter().enumerate() {
        let at = 1 + i * 2;
        let (selector, tables) = (data[at], data[at + 1]);
        if selector != comp.id {
            if frame.components.iter().any(|c| c.id == selector) {
                return Err(JpegError::unsupported(offset + at, Unsupported::ScanComponentOrder));
            }
            return Err(JpegError::malformed(offset + at, "scan references a component not in the frame"));
        }
        let expected = if i == 0 { 0x00 } else { 0x11 };
        if tables != expected {
            return Err(JpegError::unsupported(
                offset + at + 1,
                Unsupported::HuffmanSelector { component: i, selector: tables },
            ));
        }
    }

    let (start, end) = (data[7], data[8]);
    if start != 0 || end != 63 {
        return Err(JpegError::unsupported(offset + 7, Unsupported::SpectralSelection { start, end }));
    }
    Ok(())
}
