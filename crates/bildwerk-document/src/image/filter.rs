// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction gates — minimum size and colour content.

use image::{DynamicImage, GenericImageView, Rgba};

/// Channel value above which a pixel counts as near-white (all channels).
const NEAR_WHITE: u8 = 240;
/// Channel value below which a pixel counts as near-black (all channels).
const NEAR_BLACK: u8 = 15;
/// A pixel is coloured when two of its channels differ by more than this.
const CHANNEL_SPREAD: u8 = 10;
/// Grid divisions per axis; the step is `max(1, dimension / GRID_DIVISIONS)`.
const GRID_DIVISIONS: u32 = 20;

/// Sparse sampling grid shared by the colour gate and the fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleGrid {
    pub width: u32,
    pub height: u32,
    pub step_x: u32,
    pub step_y: u32,
}

impl SampleGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            step_x: (width / GRID_DIVISIONS).max(1),
            step_y: (height / GRID_DIVISIONS).max(1),
        }
    }

    pub fn for_image(image: &DynamicImage) -> Self {
        Self::new(image.width(), image.height())
    }

    /// Sampled coordinates, row-major: outer loop over y, inner over x.
    pub fn points(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.height)
            .step_by(self.step_y as usize)
            .flat_map(move |y| (0..self.width).step_by(self.step_x as usize).map(move |x| (x, y)))
    }
}

/// Both dimensions reach `min_dimension`.
pub fn passes_size_gate(width: u32, height: u32, min_dimension: u32) -> bool {
    width >= min_dimension && height >= min_dimension
}

/// Outcome of the colour gate, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorVerdict {
    /// Single-channel pixel layout; accepted without sampling.
    Grayscale,
    /// Sampled; `colored` of `samples` grid points carried colour.
    Sampled { colored: u32, samples: u32 },
}

impl ColorVerdict {
    pub fn accepted(&self) -> bool {
        match *self {
            ColorVerdict::Grayscale => true,
            ColorVerdict::Sampled { colored, samples } => exceeds_color_ratio(colored, samples),
        }
    }

    /// Coloured share of the samples in percent, for logs.
    pub fn percent(&self) -> f64 {
        match *self {
            ColorVerdict::Grayscale => 100.0,
            ColorVerdict::Sampled { samples: 0, .. } => 0.0,
            ColorVerdict::Sampled { colored, samples } => colored as f64 * 100.0 / samples as f64,
        }
    }
}

/// Run the colour gate over a decoded image.
///
/// Near-white and near-black samples are not scored but still count toward
/// the sample total.
pub fn color_verdict(image: &DynamicImage) -> ColorVerdict {
    if !image.color().has_color() {
        return ColorVerdict::Grayscale;
    }

    let grid = SampleGrid::for_image(image);
    let mut colored = 0;
    let mut samples = 0;
    for (x, y) in grid.points() {
        samples += 1;
        if is_colored(image.get_pixel(x, y)) {
            colored += 1;
        }
    }
    ColorVerdict::Sampled { colored, samples }
}

/// `colored / total > 1%`, exactly, without floating point.
pub fn exceeds_color_ratio(colored: u32, total: u32) -> bool {
    total > 0 && u64::from(colored) * 100 > u64::from(total)
}

fn is_colored(Rgba([r, g, b, _]): Rgba<u8>) -> bool {
    let near_white = r > NEAR_WHITE && g > NEAR_WHITE && b > NEAR_WHITE;
    let near_black = r < NEAR_BLACK && g < NEAR_BLACK && b < NEAR_BLACK;
    if near_white || near_black {
        return false;
    }
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    max - min > CHANNEL_SPREAD
}
