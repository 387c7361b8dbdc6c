// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
//! Pixel routines this crate performs itself.
//!
//! `B4G4R4A4_UNorm` packs blue into the lowest nibble of a little endian `u16`, followed by green,
//! red and alpha. It is converted to and from the two 8-bit four channel formats here since image
//! processors commonly lack support for it.
use image_format::PixelFormat;

use crate::buffer::{BufferMut, BufferRef};
use crate::error::ImageError;

/// Byte positions of red, green, blue and alpha in a four byte texel.
fn channel_order(format: PixelFormat) -> Option<[usize; 4]> {
    match format {
        PixelFormat::R8G8B8A8_UNorm => Some([0, 1, 2, 3]),
        PixelFormat::B8G8R8A8_UNorm => Some([2, 1, 0, 3]),
        _ => None,
    }
}

/// The 8-bit format a `B4G4R4A4_UNorm` image converts through on its way to `target`.
pub(crate) fn wide_intermediate(target: PixelFormat) -> PixelFormat {
    match target {
        PixelFormat::R8G8B8A8_UNorm => PixelFormat::R8G8B8A8_UNorm,
        _ => PixelFormat::B8G8R8A8_UNorm,
    }
}

/// Whether a format can be converted to and from `B4G4R4A4_UNorm` directly.
pub(crate) fn is_wide_format(format: PixelFormat) -> bool {
    channel_order(format).is_some()
}

/// Expand 4-bit channels to 8 bits by repeating the nibble.
pub(crate) fn widen_b4g4r4a4(src: &BufferRef<'_>, dst: &mut BufferMut<'_>) -> Result<(), ImageError> {
    let order = wide_order(src.buffer().format(), dst.buffer().format())?;

    for y in 0..src.buffer().height() {
        let (Some(from), Some(to)) = (src.row(y), dst.row_mut(y)) else {
            break;
        };

        for (pixel, out) in from.chunks_exact(2).zip(to.chunks_exact_mut(4)) {
            let packed = u16::from_le_bytes([pixel[0], pixel[1]]);
            let nibble = |shift: u16| {
                let v = ((packed >> shift) & 0xf) as u8;
                (v << 4) | v
            };

            let [r, g, b, a] = order;
            out[b] = nibble(0);
            out[g] = nibble(4);
            out[r] = nibble(8);
            out[a] = nibble(12);
        }
    }

    Ok(())
}

/// Truncate 8-bit channels to their upper 4 bits.
pub(crate) fn narrow_to_b4g4r4a4(
    src: &BufferRef<'_>,
    dst: &mut BufferMut<'_>,
) -> Result<(), ImageError> {
    let order = wide_order(dst.buffer().format(), src.buffer().format())?;

    for y in 0..src.buffer().height() {
        let (Some(from), Some(to)) = (src.row(y), dst.row_mut(y)) else {
            break;
        };

        for (pixel, out) in from.chunks_exact(4).zip(to.chunks_exact_mut(2)) {
            let [r, g, b, a] = order.map(|idx| u16::from(pixel[idx] >> 4));
            let packed = (a << 12) | (r << 8) | (g << 4) | b;
            out.copy_from_slice(&packed.to_le_bytes());
        }
    }

    Ok(())
}

fn wide_order(narrow: PixelFormat, wide: PixelFormat) -> Result<[usize; 4], ImageError> {
    if narrow != PixelFormat::B4G4R4A4_UNorm {
        return Err(ImageError::FormatMismatch {
            expected: PixelFormat::B4G4R4A4_UNorm,
            found: narrow,
        });
    }

    channel_order(wide).ok_or(ImageError::FormatNotSupported(wide))
}

/// Sample layouts with an alpha channel that can be (un)premultiplied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AlphaLayout {
    /// Four `u8` channels, alpha last.
    U8,
    /// Four little endian `u16` channels, alpha last.
    U16,
    /// Four little endian `f32` channels, alpha last.
    F32,
}

impl AlphaLayout {
    fn of(format: PixelFormat) -> Option<Self> {
        use PixelFormat::*;
        match format {
            R8G8B8A8_UNorm | R8G8B8A8_UNorm_SRgb | B8G8R8A8_UNorm | B8G8R8A8_UNorm_SRgb => {
                Some(AlphaLayout::U8)
            }
            R16G16B16A16_UNorm => Some(AlphaLayout::U16),
            R32G32B32A32_Float => Some(AlphaLayout::F32),
            _ => None,
        }
    }
}

/// Whether the premultiplication routines handle the format.
///
/// Formats without alpha are trivially supported, they are left unchanged.
pub(crate) fn supports_premultiply(format: PixelFormat) -> bool {
    !format.info().has_alpha() || AlphaLayout::of(format).is_some()
}

/// Multiply the color channels of every pixel with its alpha.
pub(crate) fn premultiply(buffer: &mut BufferMut<'_>) -> Result<(), ImageError> {
    map_alpha_rows(buffer, true)
}

/// Divide the color channels of every pixel by its alpha.
///
/// Fully transparent pixels become transparent black.
pub(crate) fn unpremultiply(buffer: &mut BufferMut<'_>) -> Result<(), ImageError> {
    map_alpha_rows(buffer, false)
}

fn map_alpha_rows(buffer: &mut BufferMut<'_>, multiply: bool) -> Result<(), ImageError> {
    let format = buffer.buffer().format();
    if !format.info().has_alpha() {
        return Ok(());
    }

    let layout = AlphaLayout::of(format).ok_or(ImageError::FormatNotSupported(format))?;

    for y in 0..buffer.buffer().height() {
        let Some(row) = buffer.row_mut(y) else {
            break;
        };

        match layout {
            AlphaLayout::U8 => row.chunks_exact_mut(4).for_each(|px| {
                let a = u32::from(px[3]);
                for c in &mut px[..3] {
                    *c = scale(u32::from(*c), a, 0xff, multiply) as u8;
                }
            }),
            AlphaLayout::U16 => row.chunks_exact_mut(8).for_each(|px| {
                let a = u32::from(u16::from_le_bytes([px[6], px[7]]));
                for c in px[..6].chunks_exact_mut(2) {
                    let v = u32::from(u16::from_le_bytes([c[0], c[1]]));
                    let v = scale(v, a, 0xffff, multiply) as u16;
                    c.copy_from_slice(&v.to_le_bytes());
                }
            }),
            AlphaLayout::F32 => row.chunks_exact_mut(16).for_each(|px| {
                let a = f32::from_le_bytes([px[12], px[13], px[14], px[15]]);
                for c in px[..12].chunks_exact_mut(4) {
                    let v = f32::from_le_bytes([c[0], c[1], c[2], c[3]]);
                    let v = match (multiply, a) {
                        (true, _) => v * a,
                        (false, a) if a == 0.0 => 0.0,
                        (false, a) => v / a,
                    };
                    c.copy_from_slice(&v.to_le_bytes());
                }
            }),
        }
    }

    Ok(())
}

/// Rounding integer (un)premultiplication of one normalized channel.
fn scale(value: u32, alpha: u32, max: u32, multiply: bool) -> u32 {
    if multiply {
        (value * alpha + max / 2) / max
    } else if alpha == 0 {
        0
    } else {
        ((value * max + alpha / 2) / alpha).min(max)
    }
}
