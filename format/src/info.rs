// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
use crate::format::PixelFormat;
use crate::pitch::{PitchFlags, PitchLayout};
use crate::table::{self, FormatRow};

/// Static attributes of a pixel format, and the layout queries derived from them.
///
/// This is a cheap value: constructing it is a table lookup. All attributes are pure functions of
/// the format it was created from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FormatInfo {
    format: PixelFormat,
    group: PixelFormat,
    bit_depth: u8,
    component_count: u8,
    flags: u8,
    size_in_bytes: u8,
}

impl FormatInfo {
    /// The description of [`PixelFormat::Unknown`].
    pub const UNKNOWN: Self = FormatInfo::new(PixelFormat::Unknown);

    /// Look up the attributes of a format.
    pub const fn new(format: PixelFormat) -> Self {
        let FormatRow {
            bits,
            components,
            group,
            mut flags,
        } = FormatRow::get(format);

        // The absence of a format is treated as the loosest possible byte layout.
        if let PixelFormat::Unknown = format {
            flags |= table::TYPELESS;
        }

        let size_in_bytes = if bits == 0 {
            0
        } else if bits < 8 {
            1
        } else {
            bits / 8
        };

        FormatInfo {
            format,
            group,
            bit_depth: bits,
            component_count: components,
            flags,
            size_in_bytes,
        }
    }

    /// The format being described.
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// The typeless format of the family, or `Unknown` when the format belongs to none.
    pub const fn group(&self) -> PixelFormat {
        self.group
    }

    /// Total bits per pixel (not per channel).
    ///
    /// For block compressed formats this is the average over a block.
    pub const fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    pub const fn component_count(&self) -> u8 {
        self.component_count
    }

    /// Bytes per pixel, at least one whenever the format has a known bit depth.
    ///
    /// Zero for formats without a described bit layout, such formats can not be allocated.
    pub const fn size_in_bytes(&self) -> usize {
        self.size_in_bytes as usize
    }

    pub const fn is_typeless(&self) -> bool {
        self.flags & table::TYPELESS != 0
    }

    pub const fn is_compressed(&self) -> bool {
        self.flags & table::COMPRESSED != 0
    }

    pub const fn is_srgb(&self) -> bool {
        self.flags & table::SRGB != 0
    }

    pub const fn has_alpha(&self) -> bool {
        self.flags & table::ALPHA != 0
    }

    pub const fn has_depth(&self) -> bool {
        self.flags & table::DEPTH != 0
    }

    pub const fn has_stencil(&self) -> bool {
        self.flags & table::STENCIL != 0
    }

    /// Formats where a single texel holds the data of a pair of pixels, or a packed YUV sample.
    pub const fn is_packed(&self) -> bool {
        use PixelFormat::*;
        matches!(
            self.format,
            R8G8_B8G8_UNorm | G8R8_G8B8_UNorm | Y410 | Y416 | Y210 | Y216
        )
    }

    /// Formats storing indices into a palette instead of colors.
    pub const fn is_palettized(&self) -> bool {
        matches!(self.format, PixelFormat::P8 | PixelFormat::A8P8)
    }

    /// Formats with a luma plane followed by subsampled chroma rows.
    pub const fn is_planar(&self) -> bool {
        use PixelFormat::*;
        matches!(self.format, NV12 | P010 | P016 | Opaque420 | NV11)
    }

    /// The size of one 4x4 block, for block compressed formats.
    pub const fn bytes_per_block(&self) -> Option<usize> {
        if !self.is_compressed() {
            return None;
        }

        Some(match self.bit_depth {
            4 => 8,
            _ => 16,
        })
    }

    /// Compute the row and slice pitch of an image of the given size in this format.
    ///
    /// The flags only affect uncompressed, non-packed formats where they reproduce legacy row
    /// alignments. Block compressed formats treat zero sizes as a single block.
    ///
    /// # Panics
    ///
    /// When called with a packed format that has no known layout. This is a defect of this
    /// library, all currently known packed formats are covered.
    pub fn pitch(&self, width: u32, height: u32, flags: PitchFlags) -> PitchLayout {
        let (width, height) = (width as usize, height as usize);

        if let Some(block_bytes) = self.bytes_per_block() {
            let blocks_wide = (width.max(1) + 3) / 4;
            let blocks_high = (height.max(1) + 3) / 4;
            let row = blocks_wide * block_bytes;

            return PitchLayout::from_blocks(
                row,
                row * blocks_high,
                blocks_wide as u32,
                blocks_high as u32,
            );
        }

        if self.is_packed() || self.is_planar() || self.format == PixelFormat::YUY2 {
            return self.packed_pitch(width, height);
        }

        let bpp = if flags.contains(PitchFlags::BPP24) {
            24
        } else if flags.contains(PitchFlags::BPP16) {
            16
        } else if flags.contains(PitchFlags::BPP8) {
            8
        } else {
            self.bit_depth as usize
        };

        let bits = width * bpp;
        let row = if flags.contains(PitchFlags::LEGACY_DWORD) {
            (bits + 31) / 32 * 4
        } else if flags.contains(PitchFlags::ALIGN_4K) {
            (bits + 32767) / 32768 * 4096
        } else if flags.contains(PitchFlags::ALIGN_64) {
            (bits + 511) / 512 * 64
        } else if flags.contains(PitchFlags::ALIGN_32) {
            (bits + 255) / 256 * 32
        } else if flags.contains(PitchFlags::ALIGN_16) {
            (bits + 127) / 128 * 16
        } else {
            (bits + 7) / 8
        };

        PitchLayout::new(row, row * height)
    }

    fn packed_pitch(&self, width: usize, height: usize) -> PitchLayout {
        use PixelFormat::*;

        // Rows of a plane and the number of rows stored for the whole slice.
        let (row, lines) = match self.format {
            R8G8_B8G8_UNorm | G8R8_G8B8_UNorm | YUY2 => (((width + 1) >> 1) << 2, height),
            Y210 | Y216 => (((width + 1) >> 1) << 4, height),
            NV12 | Opaque420 => (((width + 1) >> 1) << 1, height + ((height + 1) >> 1)),
            P010 | P016 => (((width + 1) >> 1) << 2, height + ((height + 1) >> 1)),
            NV11 => (((width + 3) >> 2) << 2, height << 1),
            Y410 => (width * 4, height),
            Y416 => (width * 8, height),
            other => panic!("no pitch layout for packed format {other}"),
        };

        PitchLayout::new(row, row * lines)
    }

    /// The number of byte rows an image of the given height occupies.
    ///
    /// This is the number of block rows for compressed formats, and accounts for the chroma rows
    /// of planar formats.
    pub const fn scanlines(&self, height: u32) -> u32 {
        if self.is_compressed() {
            let rows = height.saturating_add(3) >> 2;
            return if rows == 0 { 1 } else { rows };
        }

        use PixelFormat::*;
        match self.format {
            NV11 => height << 1,
            NV12 | P010 | P016 | Opaque420 => height + ((height + 1) >> 1),
            _ => height,
        }
    }
}

impl From<PixelFormat> for FormatInfo {
    fn from(format: PixelFormat) -> Self {
        FormatInfo::new(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_is_typeless_and_empty() {
        let info = FormatInfo::UNKNOWN;
        assert!(info.is_typeless());
        assert_eq!(info.bit_depth(), 0);
        assert_eq!(info.component_count(), 0);
        assert_eq!(info.size_in_bytes(), 0);
        assert_eq!(info.group(), PixelFormat::Unknown);
        assert!(!info.has_alpha());
    }

    #[test]
    fn attributes() {
        let info = PixelFormat::R8G8B8A8_UNorm_SRgb.info();
        assert_eq!(info.bit_depth(), 32);
        assert_eq!(info.size_in_bytes(), 4);
        assert_eq!(info.group(), PixelFormat::R8G8B8A8_Typeless);
        assert!(info.is_srgb() && info.has_alpha());
        assert!(!info.is_typeless() && !info.is_compressed());

        let depth = PixelFormat::D24_UNorm_S8_UInt.info();
        assert!(depth.has_depth() && depth.has_stencil());
        assert_eq!(depth.component_count(), 1);

        assert_eq!(PixelFormat::R1_UNorm.info().size_in_bytes(), 1);
        assert_eq!(PixelFormat::NV12.info().size_in_bytes(), 1);
        assert_eq!(PixelFormat::P208.info().size_in_bytes(), 0);
        assert!(PixelFormat::A8P8.info().is_palettized());
        assert!(PixelFormat::Y216.info().is_packed());
        assert!(!PixelFormat::YUY2.info().is_packed());
    }

    #[test]
    fn block_sizes() {
        assert_eq!(PixelFormat::BC1_UNorm.info().bytes_per_block(), Some(8));
        assert_eq!(PixelFormat::BC4_SNorm.info().bytes_per_block(), Some(8));
        assert_eq!(PixelFormat::BC2_UNorm.info().bytes_per_block(), Some(16));
        assert_eq!(PixelFormat::BC6H_Uf16.info().bytes_per_block(), Some(16));
        assert_eq!(PixelFormat::R8_UNorm.info().bytes_per_block(), None);
    }

    #[test]
    fn compressed_pitch() {
        let pitch = PixelFormat::BC1_UNorm.info().pitch(0, 0, PitchFlags::empty());
        assert_eq!(pitch.row_pitch(), 8);
        assert_eq!(pitch.slice_pitch(), 8);
        assert_eq!(pitch.blocks(), Some((1, 1)));

        let pitch = PixelFormat::BC7_UNorm.info().pitch(17, 5, PitchFlags::ALIGN_4K);
        assert_eq!(pitch.row_pitch(), 5 * 16);
        assert_eq!(pitch.slice_pitch(), 5 * 16 * 2);
    }

    #[test]
    fn packed_pitch() {
        let yuy2 = PixelFormat::YUY2.info().pitch(5, 3, PitchFlags::empty());
        assert_eq!((yuy2.row_pitch(), yuy2.slice_pitch()), (12, 36));

        let nv12 = PixelFormat::NV12.info().pitch(5, 3, PitchFlags::empty());
        assert_eq!((nv12.row_pitch(), nv12.slice_pitch()), (6, 6 * 5));

        let p010 = PixelFormat::P010.info().pitch(4, 4, PitchFlags::empty());
        assert_eq!((p010.row_pitch(), p010.slice_pitch()), (8, 8 * 6));

        let nv11 = PixelFormat::NV11.info().pitch(5, 3, PitchFlags::empty());
        assert_eq!((nv11.row_pitch(), nv11.slice_pitch()), (8, 48));

        let y216 = PixelFormat::Y216.info().pitch(3, 2, PitchFlags::empty());
        assert_eq!((y216.row_pitch(), y216.slice_pitch()), (32, 64));
        assert_eq!(y216.blocks(), None);
    }

    #[test]
    fn every_format_has_a_pitch() {
        for format in PixelFormat::ALL {
            let _ = format.info().pitch(7, 7, PitchFlags::empty());
        }
    }

    #[test]
    fn legacy_alignment() {
        let info = PixelFormat::R8G8B8A8_UNorm.info();
        let row = |w, flags| info.pitch(w, 1, flags).row_pitch();

        assert_eq!(row(3, PitchFlags::empty()), 12);
        assert_eq!(row(3, PitchFlags::BPP24), 9);
        assert_eq!(row(3, PitchFlags::BPP24 | PitchFlags::LEGACY_DWORD), 12);
        assert_eq!(row(3, PitchFlags::BPP24 | PitchFlags::BPP8), 9);
        assert_eq!(row(3, PitchFlags::BPP16 | PitchFlags::BPP8), 6);
        assert_eq!(row(3, PitchFlags::ALIGN_16), 16);
        assert_eq!(row(5, PitchFlags::ALIGN_32), 32);
        assert_eq!(row(17, PitchFlags::ALIGN_64), 128);
        assert_eq!(row(17, PitchFlags::ALIGN_4K), 4096);
        assert_eq!(row(17, PitchFlags::ALIGN_4K | PitchFlags::LEGACY_DWORD), 68);
        assert_eq!(row(17, PitchFlags::ALIGN_16 | PitchFlags::ALIGN_64), 128);

        let mono = PixelFormat::R1_UNorm.info();
        assert_eq!(mono.pitch(9, 2, PitchFlags::empty()).row_pitch(), 2);
        assert_eq!(mono.pitch(9, 2, PitchFlags::LEGACY_DWORD).slice_pitch(), 8);
    }

    #[test]
    fn scanlines() {
        assert_eq!(PixelFormat::BC3_UNorm.info().scanlines(10), 3);
        assert_eq!(PixelFormat::BC3_UNorm.info().scanlines(0), 1);
        assert_eq!(PixelFormat::NV12.info().scanlines(5), 8);
        assert_eq!(PixelFormat::NV11.info().scanlines(5), 10);
        assert_eq!(PixelFormat::R8_UNorm.info().scanlines(5), 5);
    }
}
