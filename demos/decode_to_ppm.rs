// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Decode a baseline 4:2:0 JPEG and write it as a binary PPM.
//!
//! Usage: `cargo run --example decode_to_ppm -- <input.jpg> [output.ppm]`

use jpeg420::{probe, DecodeOptions, Decoder};
use std::io::Write;
use std::time::Instant;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let Some(input) = args.get(1) else {
        eprintln!("Usage: decode_to_ppm <input.jpg> [output.ppm]");
        std::process::exit(2);
    };
    let output = args.get(2).cloned().unwrap_or_else(|| format!("{input}.ppm"));

    let data = std::fs::read(input).unwrap_or_else(|e| {
        eprintln!("Error reading {input}: {e}");
        std::process::exit(1);
    });
    match probe(&data) {
        Ok(frame) => eprintln!("{input}: {} bytes, {}x{}", data.len(), frame.width, frame.height),
        Err(e) => {
            eprintln!("Not a supported JPEG: {e}");
            std::process::exit(1);
        }
    }

    let start = Instant::now();
    let decoder = Decoder::new(DecodeOptions::default());
    let image = match decoder.decode_parallel(&data) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Decode failed: {e}");
            std::process::exit(1);
        }
    };
    eprintln!("Decoded in {:.1} ms", start.elapsed().as_secs_f64() * 1000.0);

    let mut ppm = Vec::with_capacity(image.width as usize * image.height as usize * 3 + 20);
    write!(ppm, "P6\n{} {}\n255\n", image.width, image.height).unwrap_or_else(|e| {
        eprintln!("Error formatting header: {e}");
        std::process::exit(1);
    });
    for y in 0..image.height {
        if let Some(row) = image.row(y) {
            ppm.extend_from_slice(row);
        }
    }
    std::fs::write(&output, &ppm).unwrap_or_else(|e| {
        eprintln!("Error writing {output}: {e}");
        std::process::exit(1);
    });
    eprintln!("Wrote {output}");
}
