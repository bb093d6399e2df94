// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content fingerprint — a sparse-sampled polynomial hash over the same grid
// the colour gate uses, folded with the image dimensions.

use bildwerk_core::types::FingerprintKey;
use image::{DynamicImage, GenericImageView, Rgba};

use crate::image::filter::SampleGrid;

const MULTIPLIER: i64 = 31;

/// Fingerprint a decoded image.
///
/// `hash = hash * 31 + argb` for every sampled pixel (row-major), then the
/// width and height are folded in the same way. Arithmetic wraps at 64 bits;
/// `argb` is the pixel packed as a signed 32-bit word with alpha on top.
pub fn fingerprint(image: &DynamicImage) -> FingerprintKey {
    let grid = SampleGrid::for_image(image);
    let samples = grid.points().map(|(x, y)| packed_argb(image.get_pixel(x, y)));
    fingerprint_samples(samples, grid.width, grid.height)
}

/// Fold already-packed samples with the dimensions.
pub fn fingerprint_samples(samples: impl IntoIterator<Item = i32>, width: u32, height: u32) -> FingerprintKey {
    let mut hash: i64 = 0;
    for sample in samples {
        hash = fold(hash, i64::from(sample));
    }
    hash = fold(hash, i64::from(width));
    hash = fold(hash, i64::from(height));
    FingerprintKey { width, height, hash }
}

fn fold(hash: i64, value: i64) -> i64 {
    hash.wrapping_mul(MULTIPLIER).wrapping_add(value)
}

/// `0xAARRGGBB` reinterpreted as `i32`.
pub fn packed_argb(Rgba([r, g, b, a]): Rgba<u8>) -> i32 {
    let word = (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
    word as i32
}
