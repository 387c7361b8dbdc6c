// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
//! The static attribute table, one row per format identifier.
use crate::format::PixelFormat;

/// The stored attributes of one format.
///
/// Everything else about a format is derived from these, or from its identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FormatRow {
    /// Bits per pixel, not per channel.
    pub(crate) bits: u8,
    pub(crate) components: u8,
    /// The typeless representative of the format's family.
    pub(crate) group: PixelFormat,
    pub(crate) flags: u8,
}

pub(crate) const COMPRESSED: u8 = 1 << 0;
pub(crate) const TYPELESS: u8 = 1 << 1;
pub(crate) const SRGB: u8 = 1 << 2;
pub(crate) const ALPHA: u8 = 1 << 3;
pub(crate) const DEPTH: u8 = 1 << 4;
pub(crate) const STENCIL: u8 = 1 << 5;

/// One past the largest identifier.
const TABLE_LEN: usize = PixelFormat::V408 as usize + 1;

impl FormatRow {
    pub(crate) const EMPTY: Self = FormatRow {
        bits: 0,
        components: 0,
        group: PixelFormat::Unknown,
        flags: 0,
    };

    pub(crate) const fn get(format: PixelFormat) -> Self {
        TABLE[format as usize]
    }
}

macro_rules! format_table {
    ( $($name:ident = $bits:literal, $parts:literal, $group:ident $(, $flag:ident)*;)* ) => {
        const TABLE: [FormatRow; TABLE_LEN] = {
            let mut table = [FormatRow::EMPTY; TABLE_LEN];
            $(
                table[PixelFormat::$name as usize] = FormatRow {
                    bits: $bits,
                    components: $parts,
                    group: PixelFormat::$group,
                    flags: 0 $(| $flag)*,
                };
            )*
            table
        };
    };
}

// Rows not listed (including `Unknown` and the identifier holes) stay empty.
format_table! {
    R32G32B32A32_Typeless = 128, 4, R32G32B32A32_Typeless, TYPELESS, ALPHA;
    R32G32B32A32_Float = 128, 4, R32G32B32A32_Typeless, ALPHA;
    R32G32B32A32_UInt = 128, 4, R32G32B32A32_Typeless, ALPHA;
    R32G32B32A32_SInt = 128, 4, R32G32B32A32_Typeless, ALPHA;
    R32G32B32_Typeless = 96, 3, R32G32B32_Typeless, TYPELESS;
    R32G32B32_Float = 96, 3, R32G32B32_Typeless;
    R32G32B32_UInt = 96, 3, R32G32B32_Typeless;
    R32G32B32_SInt = 96, 3, R32G32B32_Typeless;
    R16G16B16A16_Typeless = 64, 4, R16G16B16A16_Typeless, TYPELESS, ALPHA;
    R16G16B16A16_Float = 64, 4, R16G16B16A16_Typeless, ALPHA;
    R16G16B16A16_UNorm = 64, 4, R16G16B16A16_Typeless, ALPHA;
    R16G16B16A16_UInt = 64, 4, R16G16B16A16_Typeless, ALPHA;
    R16G16B16A16_SNorm = 64, 4, R16G16B16A16_Typeless, ALPHA;
    R16G16B16A16_SInt = 64, 4, R16G16B16A16_Typeless, ALPHA;
    R32G32_Typeless = 64, 2, R32G32_Typeless, TYPELESS;
    R32G32_Float = 64, 2, R32G32_Typeless;
    R32G32_UInt = 64, 2, R32G32_Typeless;
    R32G32_SInt = 64, 2, R32G32_Typeless;
    R32G8X24_Typeless = 64, 2, Unknown, TYPELESS;
    D32_Float_S8X24_UInt = 64, 1, Unknown, DEPTH, STENCIL;
    R32_Float_X8X24_Typeless = 64, 1, Unknown;
    X32_Typeless_G8X24_UInt = 64, 1, Unknown;
    R10G10B10A2_Typeless = 32, 4, R10G10B10A2_Typeless, TYPELESS, ALPHA;
    R10G10B10A2_UNorm = 32, 4, R10G10B10A2_Typeless, ALPHA;
    R10G10B10A2_UInt = 32, 4, R10G10B10A2_Typeless, ALPHA;
    R11G11B10_Float = 32, 3, Unknown;
    R8G8B8A8_Typeless = 32, 4, R8G8B8A8_Typeless, TYPELESS, ALPHA;
    R8G8B8A8_UNorm = 32, 4, R8G8B8A8_Typeless, ALPHA;
    R8G8B8A8_UNorm_SRgb = 32, 4, R8G8B8A8_Typeless, SRGB, ALPHA;
    R8G8B8A8_UInt = 32, 4, R8G8B8A8_Typeless, ALPHA;
    R8G8B8A8_SNorm = 32, 4, R8G8B8A8_Typeless, ALPHA;
    R8G8B8A8_SInt = 32, 4, R8G8B8A8_Typeless, ALPHA;
    R16G16_Typeless = 32, 2, R16G16_Typeless, TYPELESS;
    R16G16_Float = 32, 2, R16G16_Typeless;
    R16G16_UNorm = 32, 2, R16G16_Typeless;
    R16G16_UInt = 32, 2, R16G16_Typeless;
    R16G16_SNorm = 32, 2, R16G16_Typeless;
    R16G16_SInt = 32, 2, R16G16_Typeless;
    R32_Typeless = 32, 1, R32_Typeless, TYPELESS;
    D32_Float = 32, 1, Unknown, DEPTH;
    R32_Float = 32, 1, R32_Typeless;
    R32_UInt = 32, 1, R32_Typeless;
    R32_SInt = 32, 1, R32_Typeless;
    R24G8_Typeless = 32, 2, Unknown, TYPELESS;
    D24_UNorm_S8_UInt = 32, 1, Unknown, DEPTH, STENCIL;
    R24_UNorm_X8_Typeless = 32, 1, Unknown;
    X24_Typeless_G8_UInt = 32, 1, Unknown;
    R8G8_Typeless = 16, 2, R8G8_Typeless, TYPELESS;
    R8G8_UNorm = 16, 2, R8G8_Typeless;
    R8G8_UInt = 16, 2, R8G8_Typeless;
    R8G8_SNorm = 16, 2, R8G8_Typeless;
    R8G8_SInt = 16, 2, R8G8_Typeless;
    R16_Typeless = 16, 1, R16_Typeless, TYPELESS;
    R16_Float = 16, 1, R16_Typeless;
    D16_UNorm = 16, 1, Unknown, DEPTH;
    R16_UNorm = 16, 1, R16_Typeless;
    R16_UInt = 16, 1, R16_Typeless;
    R16_SNorm = 16, 1, R16_Typeless;
    R16_SInt = 16, 1, R16_Typeless;
    R8_Typeless = 8, 1, R8_Typeless, TYPELESS;
    R8_UNorm = 8, 1, R8_Typeless;
    R8_UInt = 8, 1, R8_Typeless;
    R8_SNorm = 8, 1, R8_Typeless;
    R8_SInt = 8, 1, R8_Typeless;
    A8_UNorm = 8, 1, Unknown, ALPHA;
    R1_UNorm = 1, 1, Unknown;
    R9G9B9E5_Sharedexp = 32, 3, Unknown;
    R8G8_B8G8_UNorm = 32, 4, Unknown;
    G8R8_G8B8_UNorm = 32, 4, Unknown;
    BC1_Typeless = 4, 4, BC1_Typeless, COMPRESSED, TYPELESS, ALPHA;
    BC1_UNorm = 4, 4, BC1_Typeless, COMPRESSED, ALPHA;
    BC1_UNorm_SRgb = 4, 4, BC1_Typeless, COMPRESSED, SRGB, ALPHA;
    BC2_Typeless = 8, 4, BC2_Typeless, COMPRESSED, TYPELESS, ALPHA;
    BC2_UNorm = 8, 4, BC2_Typeless, COMPRESSED, ALPHA;
    BC2_UNorm_SRgb = 8, 4, BC2_Typeless, COMPRESSED, SRGB, ALPHA;
    BC3_Typeless = 8, 4, BC3_Typeless, COMPRESSED, TYPELESS, ALPHA;
    BC3_UNorm = 8, 4, BC3_Typeless, COMPRESSED, ALPHA;
    BC3_UNorm_SRgb = 8, 4, BC3_Typeless, COMPRESSED, SRGB, ALPHA;
    BC4_Typeless = 4, 4, BC4_Typeless, COMPRESSED, TYPELESS;
    BC4_UNorm = 4, 4, BC4_Typeless, COMPRESSED;
    BC4_SNorm = 4, 4, BC4_Typeless, COMPRESSED;
    BC5_Typeless = 8, 4, BC5_Typeless, COMPRESSED, TYPELESS;
    BC5_UNorm = 8, 4, BC5_Typeless, COMPRESSED;
    BC5_SNorm = 8, 4, BC5_Typeless, COMPRESSED;
    B5G6R5_UNorm = 16, 3, Unknown;
    B5G5R5A1_UNorm = 16, 4, Unknown, ALPHA;
    B8G8R8A8_UNorm = 32, 4, B8G8R8A8_Typeless, ALPHA;
    B8G8R8X8_UNorm = 32, 4, B8G8R8X8_Typeless;
    R10G10B10_Xr_Bias_A2_UNorm = 32, 4, Unknown, ALPHA;
    B8G8R8A8_Typeless = 32, 4, B8G8R8A8_Typeless, TYPELESS, ALPHA;
    B8G8R8A8_UNorm_SRgb = 32, 4, B8G8R8A8_Typeless, SRGB, ALPHA;
    B8G8R8X8_Typeless = 32, 4, B8G8R8X8_Typeless, TYPELESS;
    B8G8R8X8_UNorm_SRgb = 32, 4, B8G8R8X8_Typeless, SRGB;
    BC6H_Typeless = 8, 4, BC6H_Typeless, COMPRESSED, TYPELESS;
    BC6H_Uf16 = 8, 4, BC6H_Typeless, COMPRESSED;
    BC6H_Sf16 = 8, 4, BC6H_Typeless, COMPRESSED;
    BC7_Typeless = 8, 4, BC7_Typeless, COMPRESSED, TYPELESS, ALPHA;
    BC7_UNorm = 8, 4, BC7_Typeless, COMPRESSED, ALPHA;
    BC7_UNorm_SRgb = 8, 4, BC7_Typeless, COMPRESSED, SRGB, ALPHA;
    AYUV = 32, 2, Unknown;
    Y410 = 32, 1, Unknown;
    Y416 = 64, 1, Unknown;
    NV12 = 12, 1, Unknown;
    P010 = 24, 1, Unknown;
    P016 = 24, 1, Unknown;
    Opaque420 = 12, 1, Unknown;
    YUY2 = 32, 2, Unknown;
    Y210 = 64, 1, Unknown;
    Y216 = 64, 1, Unknown;
    NV11 = 12, 2, Unknown;
    AI44 = 8, 2, Unknown;
    IA44 = 8, 2, Unknown;
    P8 = 8, 1, Unknown;
    A8P8 = 16, 2, Unknown, ALPHA;
    B4G4R4A4_UNorm = 16, 4, B4G4R4A4_UNorm, ALPHA;
    // Known identifiers without a described bit layout.
    P208 = 0, 1, Unknown;
    V208 = 0, 1, Unknown;
    V408 = 0, 1, Unknown;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_are_typeless_or_self() {
        for format in PixelFormat::ALL {
            let group = FormatRow::get(format).group;
            if group == PixelFormat::Unknown || group == PixelFormat::B4G4R4A4_UNorm {
                continue;
            }

            let row = FormatRow::get(group);
            assert!(row.flags & TYPELESS != 0, "{format:?} grouped under {group:?}");
            assert_eq!(row.bits, FormatRow::get(format).bits, "{format:?}");
        }
    }

    #[test]
    fn holes_are_empty() {
        for raw in 116..130 {
            assert_eq!(TABLE[raw], FormatRow::EMPTY);
        }
        assert_eq!(FormatRow::get(PixelFormat::Unknown), FormatRow::EMPTY);
    }
}
