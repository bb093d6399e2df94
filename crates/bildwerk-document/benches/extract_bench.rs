// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the per-image hot path in bildwerk-document:
// fingerprinting and the colour gate, both of which run on every candidate
// that passes the size gate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use bildwerk_document::image::{color_verdict, fingerprint};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A 1200x900 photo-like RGB image: a smooth gradient with a white margin,
/// so the colour gate sees a mix of extreme and coloured samples.
fn synthetic_photo() -> DynamicImage {
    let (width, height) = (1200u32, 900u32);
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for y in 60..height - 60 {
        for x in 60..width - 60 {
            img.put_pixel(x, y, Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        }
    }
    DynamicImage::ImageRgb8(img)
}

fn bench_fingerprint(c: &mut Criterion) {
    let photo = synthetic_photo();
    c.bench_function("fingerprint (1200x900)", |b| {
        b.iter(|| black_box(fingerprint(black_box(&photo))));
    });
}

fn bench_color_gate(c: &mut Criterion) {
    let photo = synthetic_photo();
    c.bench_function("color_verdict (1200x900)", |b| {
        b.iter(|| black_box(color_verdict(black_box(&photo))));
    });
}

criterion_group!(benches, bench_fingerprint, bench_color_gate);
criterion_main!(benches);
