// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image decoder — turn an image XObject's stream into a `DynamicImage`.
//
// FlateDecode, LZWDecode and ASCII85Decode (with the PNG predictors) run
// through lopdf's `Stream::decompressed_content`, one filter stage at a time.
// ASCIIHexDecode, RunLengthDecode, the TIFF predictor and DCTDecode (via the
// `image` crate's JPEG decoder) are handled here. The raw samples are then
// unpacked according to /BitsPerComponent and mapped from the declared
// colour space to 8-bit Gray or RGB.

use bildwerk_core::error::{BildwerkError, Result};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Object, Stream, dictionary};
use tracing::debug;

use crate::pdf::reader::{PdfReader, stream_bytes};
use crate::pdf::xobject::ImageXObject;

/// Decode an image XObject into pixels.
pub fn decode_image(reader: &PdfReader, image: &ImageXObject<'_>) -> Result<DynamicImage> {
    let width = image
        .width()
        .filter(|w| *w > 0)
        .ok_or_else(|| decode_error("missing or invalid /Width"))?;
    let height = image
        .height()
        .filter(|h| *h > 0)
        .ok_or_else(|| decode_error("missing or invalid /Height"))?;

    let filters = image.filters(reader);
    let params = decode_parms(reader, &image.stream.dict, filters.len());
    let mut data = image.stream.content.clone();

    for (index, filter) in filters.iter().enumerate() {
        let parms = params.get(index).copied().flatten();
        match filter.as_str() {
            "FlateDecode" | "Fl" => data = lopdf_stage("FlateDecode", data, parms)?,
            "LZWDecode" | "LZW" => data = lopdf_stage("LZWDecode", data, parms)?,
            "ASCII85Decode" | "A85" => data = lopdf_stage("ASCII85Decode", data, None)?,
            "ASCIIHexDecode" | "AHx" => data = ascii_hex(&data)?,
            "RunLengthDecode" | "RL" => data = run_length(&data),
            "DCTDecode" | "DCT" => {
                if index + 1 != filters.len() {
                    return Err(decode_error("DCTDecode must be the last filter"));
                }
                return image::load_from_memory_with_format(&data, ImageFormat::Jpeg)
                    .map_err(|err| decode_error(format!("JPEG decode failed: {err}")));
            }
            other => return Err(decode_error(format!("unsupported filter {other}"))),
        }
    }

    if image.is_stencil_mask() {
        return stencil_mask(&data, width, height, decode_inverted(&image.stream.dict));
    }

    let bpc = image
        .bits_per_component()
        .ok_or_else(|| decode_error("missing /BitsPerComponent"))?;
    if !matches!(bpc, 1 | 2 | 4 | 8 | 16) {
        return Err(decode_error(format!("unsupported BitsPerComponent {bpc}")));
    }

    let color_space = image
        .stream
        .dict
        .get(b"ColorSpace")
        .map_err(|_| decode_error("missing /ColorSpace"))
        .and_then(|entry| ColorSpace::parse(reader, entry))?;

    debug!(width, height, bpc, ?color_space, "Unpacking image samples");

    let components = color_space.components();
    // Indexed samples are palette indices and must keep their raw value.
    let scale = !matches!(color_space, ColorSpace::Indexed { .. });
    let samples = unpack_samples(&data, width, height, components, bpc, scale)?;

    to_dynamic(
        &color_space,
        samples,
        width,
        height,
        decode_inverted(&image.stream.dict),
    )
}

// -- Colour spaces ------------------------------------------------------------

/// Colour spaces the decoder can map to Gray or RGB.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    Indexed {
        base: Box<ColorSpace>,
        hival: u8,
        lookup: Vec<u8>,
    },
}

impl ColorSpace {
    fn parse(reader: &PdfReader, entry: &Object) -> Result<Self> {
        match reader.resolve(entry) {
            Some(Object::Name(name)) => Self::from_family(name),
            Some(Object::Array(items)) => {
                let family = items
                    .first()
                    .and_then(|first| reader.resolve(first))
                    .and_then(|first| first.as_name().ok())
                    .ok_or_else(|| decode_error("colour space array without a family name"))?;
                match family {
                    b"ICCBased" => Self::icc_based(reader, items.get(1)),
                    b"Indexed" | b"I" => Self::indexed(reader, items),
                    b"CalGray" => Ok(ColorSpace::Gray),
                    b"CalRGB" => Ok(ColorSpace::Rgb),
                    other => Self::from_family(other),
                }
            }
            _ => Err(decode_error("unresolvable /ColorSpace")),
        }
    }

    fn from_family(name: &[u8]) -> Result<Self> {
        match name {
            b"DeviceGray" | b"G" | b"CalGray" => Ok(ColorSpace::Gray),
            b"DeviceRGB" | b"RGB" | b"CalRGB" => Ok(ColorSpace::Rgb),
            b"DeviceCMYK" | b"CMYK" => Ok(ColorSpace::Cmyk),
            other => Err(decode_error(format!(
                "unsupported colour space {}",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    /// `[/ICCBased stream]`: pick the device space from `/N`, or `/Alternate`.
    fn icc_based(reader: &PdfReader, profile: Option<&Object>) -> Result<Self> {
        let Some(Object::Stream(profile)) = profile.and_then(|p| reader.resolve(p)) else {
            return Err(decode_error("ICCBased without a profile stream"));
        };
        match profile.dict.get(b"N").and_then(Object::as_i64) {
            Ok(1) => Ok(ColorSpace::Gray),
            Ok(3) => Ok(ColorSpace::Rgb),
            Ok(4) => Ok(ColorSpace::Cmyk),
            _ => match profile.dict.get(b"Alternate") {
                Ok(alternate) => Self::parse(reader, alternate),
                Err(_) => Err(decode_error("ICCBased profile without /N or /Alternate")),
            },
        }
    }

    /// `[/Indexed base hival lookup]`.
    fn indexed(reader: &PdfReader, items: &[Object]) -> Result<Self> {
        if items.len() < 4 {
            return Err(decode_error("Indexed colour space needs four entries"));
        }
        let base = Self::parse(reader, &items[1])?;
        if matches!(base, ColorSpace::Indexed { .. }) {
            return Err(decode_error("Indexed base cannot itself be Indexed"));
        }
        let hival = reader
            .resolve(&items[2])
            .and_then(|v| v.as_i64().ok())
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| decode_error("Indexed hival out of range"))?;
        let lookup = match reader.resolve(&items[3]) {
            Some(Object::String(bytes, _)) => bytes.clone(),
            Some(Object::Stream(stream)) => stream_bytes(stream),
            _ => return Err(decode_error("Indexed lookup is neither string nor stream")),
        };

        let needed = (usize::from(hival) + 1) * base.components();
        if lookup.len() < needed {
            return Err(decode_error(format!(
                "Indexed lookup has {} bytes, expected {needed}",
                lookup.len()
            )));
        }
        Ok(ColorSpace::Indexed {
            base: Box::new(base),
            hival,
            lookup,
        })
    }

    /// Colour components per sample.
    pub fn components(&self) -> usize {
        match self {
            ColorSpace::Gray | ColorSpace::Indexed { .. } => 1,
            ColorSpace::Rgb => 3,
            ColorSpace::Cmyk => 4,
        }
    }
}

fn to_dynamic(
    space: &ColorSpace,
    samples: Vec<u8>,
    width: u32,
    height: u32,
    inverted: bool,
) -> Result<DynamicImage> {
    match space {
        ColorSpace::Gray => {
            let samples = if inverted {
                samples.into_iter().map(|v| 255 - v).collect()
            } else {
                samples
            };
            gray(width, height, samples)
        }
        ColorSpace::Rgb => rgb(width, height, samples),
        ColorSpace::Cmyk => rgb(width, height, cmyk_to_rgb(&samples)),
        ColorSpace::Indexed {
            base,
            hival,
            lookup,
        } => {
            let stride = base.components();
            let mut expanded = Vec::with_capacity(samples.len() * stride);
            for index in samples {
                let index = usize::from(index.min(*hival));
                expanded.extend_from_slice(&lookup[index * stride..(index + 1) * stride]);
            }
            match base.as_ref() {
                ColorSpace::Gray => gray(width, height, expanded),
                ColorSpace::Rgb => rgb(width, height, expanded),
                ColorSpace::Cmyk => rgb(width, height, cmyk_to_rgb(&expanded)),
                ColorSpace::Indexed { .. } => {
                    Err(decode_error("Indexed base cannot itself be Indexed"))
                }
            }
        }
    }
}

fn gray(width: u32, height: u32, data: Vec<u8>) -> Result<DynamicImage> {
    GrayImage::from_raw(width, height, data)
        .map(DynamicImage::ImageLuma8)
        .ok_or_else(|| decode_error("sample count does not match dimensions"))
}

fn rgb(width: u32, height: u32, data: Vec<u8>) -> Result<DynamicImage> {
    RgbImage::from_raw(width, height, data)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| decode_error("sample count does not match dimensions"))
}

fn cmyk_to_rgb(samples: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() / 4 * 3);
    for px in samples.chunks_exact(4) {
        let k = 255 - u16::from(px[3]);
        for channel in &px[..3] {
            let value = (255 - u16::from(*channel)) * k / 255;
            out.push(value as u8);
        }
    }
    out
}

/// Stencil mask: sample 0 paints, unless `/Decode [1 0]` flips it.
/// Painted pixels become black on white.
fn stencil_mask(data: &[u8], width: u32, height: u32, inverted: bool) -> Result<DynamicImage> {
    let bits = unpack_samples(data, width, height, 1, 1, false)?;
    let pixels = bits
        .into_iter()
        .map(|bit| {
            let paints = (bit == 0) != inverted;
            if paints { 0 } else { 255 }
        })
        .collect();
    gray(width, height, pixels)
}

/// `/Decode [1 0]` on a single-component image.
fn decode_inverted(dict: &Dictionary) -> bool {
    let Ok(Object::Array(range)) = dict.get(b"Decode") else {
        return false;
    };
    let value = |obj: Option<&Object>| match obj {
        Some(Object::Integer(v)) => Some(*v as f32),
        Some(Object::Real(v)) => Some(*v),
        _ => None,
    };
    matches!(
        (value(range.first()), value(range.get(1))),
        (Some(lo), Some(hi)) if lo > hi
    )
}

// -- Sample unpacking ---------------------------------------------------------

/// Unpack packed samples into one byte per component.
///
/// Rows start on byte boundaries. With `scale`, sub-byte values are stretched
/// to 0..=255 and 16-bit values keep their high byte; without it, values are
/// returned as stored (palette indices).
fn unpack_samples(
    data: &[u8],
    width: u32,
    height: u32,
    components: usize,
    bpc: u32,
    scale: bool,
) -> Result<Vec<u8>> {
    let overflow = || decode_error(format!("image size {width}x{height} is too large"));
    let height = height as usize;
    let per_row = (width as usize).checked_mul(components).ok_or_else(overflow)?;
    let row_bytes = per_row
        .checked_mul(bpc as usize)
        .ok_or_else(overflow)?
        .div_ceil(8);
    let needed = row_bytes.checked_mul(height).ok_or_else(overflow)?;
    let samples = per_row.checked_mul(height).ok_or_else(overflow)?;
    if data.len() < needed {
        return Err(decode_error(format!(
            "image data truncated: {} bytes, expected {needed}",
            data.len()
        )));
    }

    let mut out = Vec::with_capacity(samples);
    for row in data[..needed].chunks_exact(row_bytes) {
        match bpc {
            8 => out.extend_from_slice(&row[..per_row]),
            16 => out.extend(row.chunks_exact(2).take(per_row).map(|pair| pair[0])),
            _ => {
                let max = (1u16 << bpc) - 1;
                for i in 0..per_row {
                    let bit = i * bpc as usize;
                    let shift = 8 - bpc as usize - (bit % 8);
                    let value = u16::from(row[bit / 8] >> shift) & max;
                    out.push(if scale { (value * 255 / max) as u8 } else { value as u8 });
                }
            }
        }
    }
    Ok(out)
}

// -- Filters ------------------------------------------------------------------

/// Per-filter `/DecodeParms`, aligned with the filter list.
fn decode_parms<'a>(reader: &'a PdfReader, dict: &'a Dictionary, filters: usize) -> Vec<Option<&'a Dictionary>> {
    let as_dict = |obj: &'a Object| match reader.resolve(obj) {
        Some(Object::Dictionary(d)) => Some(d),
        _ => None,
    };
    let entry = dict.get(b"DecodeParms").or_else(|_| dict.get(b"DP"));
    match entry.ok().and_then(|e| reader.resolve(e)) {
        Some(Object::Array(items)) => items.iter().map(as_dict).collect(),
        Some(Object::Dictionary(d)) => {
            let mut parms = vec![None; filters];
            if let Some(first) = parms.first_mut() {
                *first = Some(d);
            }
            parms
        }
        _ => Vec::new(),
    }
}

/// Run one filter lopdf implements over `data`.
///
/// lopdf only reads a single `/DecodeParms` dictionary and sizes PNG rows
/// as if every component were at least a byte wide, so each stage gets its
/// own stream carrying byte-level parameters. TIFF rows are undone here.
fn lopdf_stage(filter: &str, data: Vec<u8>, parms: Option<&Dictionary>) -> Result<Vec<u8>> {
    let predictor = parms.map(Predictor::from_parms).transpose()?.flatten();

    let mut dict = dictionary! { "Filter" => filter };
    let mut stage_parms = match predictor {
        Some(predictor) if predictor.is_png() => predictor.png_parms()?,
        _ => Dictionary::new(),
    };
    if let Some(early_change) = parms.and_then(|p| p.get(b"EarlyChange").ok()) {
        stage_parms.set("EarlyChange", early_change.clone());
    }
    if !stage_parms.is_empty() {
        dict.set("DecodeParms", stage_parms);
    }

    let out = Stream::new(dict, data)
        .decompressed_content()
        .map_err(|err| decode_error(format!("{filter} failed: {err}")))?;

    match predictor {
        Some(predictor) if !predictor.is_png() => Ok(predictor.undo_tiff(out)),
        _ => Ok(out),
    }
}

/// Row layout described by a filter's `/Predictor` parameters.
#[derive(Debug, Clone, Copy)]
struct Predictor {
    kind: i64,
    /// Bytes per complete pixel, at least one.
    bpp: usize,
    row_bytes: usize,
}

impl Predictor {
    /// `None` for predictor 1 (no prediction).
    fn from_parms(parms: &Dictionary) -> Result<Option<Self>> {
        let int = |key: &[u8], default: i64| parms.get(key).and_then(Object::as_i64).unwrap_or(default);
        let kind = int(b"Predictor", 1);
        let colors = usize::try_from(int(b"Colors", 1).max(1)).map_err(|_| predictor_overflow())?;
        let bpc = int(b"BitsPerComponent", 8);
        let columns = usize::try_from(int(b"Columns", 1).max(1)).map_err(|_| predictor_overflow())?;

        match kind {
            1 => return Ok(None),
            2 if bpc != 8 => return Err(decode_error("TIFF predictor only supported at 8 bits")),
            2 | 10..=15 => {}
            other => return Err(decode_error(format!("unsupported predictor {other}"))),
        }
        if !matches!(bpc, 1 | 2 | 4 | 8 | 16) {
            return Err(decode_error(format!("unsupported predictor BitsPerComponent {bpc}")));
        }

        let pixel_bits = colors.checked_mul(bpc as usize).ok_or_else(predictor_overflow)?;
        let row_bits = pixel_bits.checked_mul(columns).ok_or_else(predictor_overflow)?;
        Ok(Some(Self {
            kind,
            bpp: pixel_bits.div_ceil(8).max(1),
            row_bytes: row_bits.div_ceil(8),
        }))
    }

    fn is_png(&self) -> bool {
        self.kind >= 10
    }

    /// Parameters giving lopdf exactly `bpp` bytes per pixel and
    /// `row_bytes` bytes per row.
    fn png_parms(&self) -> Result<Dictionary> {
        let as_int = |value: usize| i64::try_from(value).map_err(|_| predictor_overflow());
        Ok(dictionary! {
            "Predictor" => self.kind,
            "Colors" => as_int(self.bpp)?,
            "BitsPerComponent" => Object::Integer(8),
            "Columns" => as_int(self.row_bytes / self.bpp)?,
        })
    }

    /// Horizontal differencing, 8 bits per component.
    fn undo_tiff(&self, mut data: Vec<u8>) -> Vec<u8> {
        for row in data.chunks_mut(self.row_bytes) {
            for i in self.bpp..row.len() {
                row[i] = row[i].wrapping_add(row[i - self.bpp]);
            }
        }
        data
    }
}

fn predictor_overflow() -> BildwerkError {
    decode_error("predictor row size is too large")
}

fn ascii_hex(data: &[u8]) -> Result<Vec<u8>> {
    let mut digits = Vec::with_capacity(data.len());
    for &byte in data {
        match byte {
            b'>' => break,
            b if b.is_ascii_whitespace() => {}
            b if b.is_ascii_hexdigit() => digits.push(b),
            other => {
                return Err(decode_error(format!(
                    "invalid ASCIIHex character {:?}",
                    other as char
                )));
            }
        }
    }
    if digits.len() % 2 == 1 {
        digits.push(b'0');
    }
    Ok(digits
        .chunks_exact(2)
        .map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1]))
        .collect())
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

fn run_length(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let length = data[i];
        i += 1;
        match length {
            128 => break,
            0..=127 => {
                let end = (i + usize::from(length) + 1).min(data.len());
                out.extend_from_slice(&data[i..end]);
                i = end;
            }
            _ => {
                if let Some(&byte) = data.get(i) {
                    out.extend(std::iter::repeat_n(byte, 257 - usize::from(length)));
                }
                i += 1;
            }
        }
    }
    out
}

fn decode_error(reason: impl Into<String>) -> BildwerkError {
    BildwerkError::ImageDecode(reason.into())
}
