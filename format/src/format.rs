// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
use core::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::info::FormatInfo;

/// Identifies the encoding of a texel buffer.
///
/// The discriminants are the identifiers used by DXGI and therefore by most texture container
/// files (e.g. the DX10 header of a DDS file). Converting from a raw `u32` is fallible since the
/// numbering has holes.
///
/// The names keep the channel ordering of the identifier: `R8G8B8A8_UNorm` stores red in the
/// first byte. Suffixes describe how the bits are interpreted, `_Typeless` formats describe only a
/// byte layout that several concrete formats share.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum PixelFormat {
    /// No format. Never has layout information.
    #[default]
    Unknown = 0,
    R32G32B32A32_Typeless = 1,
    R32G32B32A32_Float = 2,
    R32G32B32A32_UInt = 3,
    R32G32B32A32_SInt = 4,
    R32G32B32_Typeless = 5,
    R32G32B32_Float = 6,
    R32G32B32_UInt = 7,
    R32G32B32_SInt = 8,
    R16G16B16A16_Typeless = 9,
    R16G16B16A16_Float = 10,
    R16G16B16A16_UNorm = 11,
    R16G16B16A16_UInt = 12,
    R16G16B16A16_SNorm = 13,
    R16G16B16A16_SInt = 14,
    R32G32_Typeless = 15,
    R32G32_Float = 16,
    R32G32_UInt = 17,
    R32G32_SInt = 18,
    R32G8X24_Typeless = 19,
    /// 32-bit float depth, 8-bit stencil and 24 unused bits.
    D32_Float_S8X24_UInt = 20,
    R32_Float_X8X24_Typeless = 21,
    X32_Typeless_G8X24_UInt = 22,
    R10G10B10A2_Typeless = 23,
    R10G10B10A2_UNorm = 24,
    R10G10B10A2_UInt = 25,
    R11G11B10_Float = 26,
    R8G8B8A8_Typeless = 27,
    R8G8B8A8_UNorm = 28,
    R8G8B8A8_UNorm_SRgb = 29,
    R8G8B8A8_UInt = 30,
    R8G8B8A8_SNorm = 31,
    R8G8B8A8_SInt = 32,
    R16G16_Typeless = 33,
    R16G16_Float = 34,
    R16G16_UNorm = 35,
    R16G16_UInt = 36,
    R16G16_SNorm = 37,
    R16G16_SInt = 38,
    R32_Typeless = 39,
    D32_Float = 40,
    R32_Float = 41,
    R32_UInt = 42,
    R32_SInt = 43,
    R24G8_Typeless = 44,
    /// 24-bit normalized depth with an 8-bit stencil.
    D24_UNorm_S8_UInt = 45,
    R24_UNorm_X8_Typeless = 46,
    X24_Typeless_G8_UInt = 47,
    R8G8_Typeless = 48,
    R8G8_UNorm = 49,
    R8G8_UInt = 50,
    R8G8_SNorm = 51,
    R8G8_SInt = 52,
    R16_Typeless = 53,
    R16_Float = 54,
    D16_UNorm = 55,
    R16_UNorm = 56,
    R16_UInt = 57,
    R16_SNorm = 58,
    R16_SInt = 59,
    R8_Typeless = 60,
    R8_UNorm = 61,
    R8_UInt = 62,
    R8_SNorm = 63,
    R8_SInt = 64,
    A8_UNorm = 65,
    /// One bit per pixel.
    R1_UNorm = 66,
    /// Three 9-bit mantissas sharing a 5-bit exponent.
    R9G9B9E5_Sharedexp = 67,
    /// Two pixels share one 32-bit texel, analogous to UYVY.
    R8G8_B8G8_UNorm = 68,
    /// Two pixels share one 32-bit texel, analogous to YUY2.
    G8R8_G8B8_UNorm = 69,
    BC1_Typeless = 70,
    BC1_UNorm = 71,
    BC1_UNorm_SRgb = 72,
    BC2_Typeless = 73,
    BC2_UNorm = 74,
    BC2_UNorm_SRgb = 75,
    BC3_Typeless = 76,
    BC3_UNorm = 77,
    BC3_UNorm_SRgb = 78,
    BC4_Typeless = 79,
    BC4_UNorm = 80,
    BC4_SNorm = 81,
    BC5_Typeless = 82,
    BC5_UNorm = 83,
    BC5_SNorm = 84,
    B5G6R5_UNorm = 85,
    B5G5R5A1_UNorm = 86,
    B8G8R8A8_UNorm = 87,
    B8G8R8X8_UNorm = 88,
    R10G10B10_Xr_Bias_A2_UNorm = 89,
    B8G8R8A8_Typeless = 90,
    B8G8R8A8_UNorm_SRgb = 91,
    B8G8R8X8_Typeless = 92,
    B8G8R8X8_UNorm_SRgb = 93,
    BC6H_Typeless = 94,
    BC6H_Uf16 = 95,
    BC6H_Sf16 = 96,
    BC7_Typeless = 97,
    BC7_UNorm = 98,
    BC7_UNorm_SRgb = 99,
    /// Packed 4:4:4 YUV with alpha, 8 bits per channel.
    AYUV = 100,
    /// Packed 4:4:4 YUV, 10 bits per channel and 2 bits alpha.
    Y410 = 101,
    /// Packed 4:4:4 YUV, 16 bits per channel.
    Y416 = 102,
    /// Planar 4:2:0 YUV, a luma plane followed by interleaved chroma at half height.
    NV12 = 103,
    /// Like `NV12` with 10 significant bits in each 16-bit sample.
    P010 = 104,
    /// Like `NV12` with 16-bit samples.
    P016 = 105,
    /// Opaque 4:2:0 YUV, laid out like `NV12`.
    Opaque420 = 106,
    /// Packed 4:2:2 YUV, two pixels in 32 bits.
    YUY2 = 107,
    /// Packed 4:2:2 YUV, 10 bits per sample.
    Y210 = 108,
    /// Packed 4:2:2 YUV, 16 bits per sample.
    Y216 = 109,
    /// Planar 4:1:1 YUV.
    NV11 = 110,
    AI44 = 111,
    IA44 = 112,
    /// An 8-bit palette index.
    P8 = 113,
    /// An 8-bit palette index with 8 bits of alpha.
    A8P8 = 114,
    /// Four channels of 4 bits each, blue in the low-order bits.
    B4G4R4A4_UNorm = 115,
    P208 = 130,
    V208 = 131,
    V408 = 132,
}

impl PixelFormat {
    /// Every format, in order of their identifiers.
    pub const ALL: [PixelFormat; 119] = {
        use PixelFormat::*;
        [
            Unknown,
            R32G32B32A32_Typeless,
            R32G32B32A32_Float,
            R32G32B32A32_UInt,
            R32G32B32A32_SInt,
            R32G32B32_Typeless,
            R32G32B32_Float,
            R32G32B32_UInt,
            R32G32B32_SInt,
            R16G16B16A16_Typeless,
            R16G16B16A16_Float,
            R16G16B16A16_UNorm,
            R16G16B16A16_UInt,
            R16G16B16A16_SNorm,
            R16G16B16A16_SInt,
            R32G32_Typeless,
            R32G32_Float,
            R32G32_UInt,
            R32G32_SInt,
            R32G8X24_Typeless,
            D32_Float_S8X24_UInt,
            R32_Float_X8X24_Typeless,
            X32_Typeless_G8X24_UInt,
            R10G10B10A2_Typeless,
            R10G10B10A2_UNorm,
            R10G10B10A2_UInt,
            R11G11B10_Float,
            R8G8B8A8_Typeless,
            R8G8B8A8_UNorm,
            R8G8B8A8_UNorm_SRgb,
            R8G8B8A8_UInt,
            R8G8B8A8_SNorm,
            R8G8B8A8_SInt,
            R16G16_Typeless,
            R16G16_Float,
            R16G16_UNorm,
            R16G16_UInt,
            R16G16_SNorm,
            R16G16_SInt,
            R32_Typeless,
            D32_Float,
            R32_Float,
            R32_UInt,
            R32_SInt,
            R24G8_Typeless,
            D24_UNorm_S8_UInt,
            R24_UNorm_X8_Typeless,
            X24_Typeless_G8_UInt,
            R8G8_Typeless,
            R8G8_UNorm,
            R8G8_UInt,
            R8G8_SNorm,
            R8G8_SInt,
            R16_Typeless,
            R16_Float,
            D16_UNorm,
            R16_UNorm,
            R16_UInt,
            R16_SNorm,
            R16_SInt,
            R8_Typeless,
            R8_UNorm,
            R8_UInt,
            R8_SNorm,
            R8_SInt,
            A8_UNorm,
            R1_UNorm,
            R9G9B9E5_Sharedexp,
            R8G8_B8G8_UNorm,
            G8R8_G8B8_UNorm,
            BC1_Typeless,
            BC1_UNorm,
            BC1_UNorm_SRgb,
            BC2_Typeless,
            BC2_UNorm,
            BC2_UNorm_SRgb,
            BC3_Typeless,
            BC3_UNorm,
            BC3_UNorm_SRgb,
            BC4_Typeless,
            BC4_UNorm,
            BC4_SNorm,
            BC5_Typeless,
            BC5_UNorm,
            BC5_SNorm,
            B5G6R5_UNorm,
            B5G5R5A1_UNorm,
            B8G8R8A8_UNorm,
            B8G8R8X8_UNorm,
            R10G10B10_Xr_Bias_A2_UNorm,
            B8G8R8A8_Typeless,
            B8G8R8A8_UNorm_SRgb,
            B8G8R8X8_Typeless,
            B8G8R8X8_UNorm_SRgb,
            BC6H_Typeless,
            BC6H_Uf16,
            BC6H_Sf16,
            BC7_Typeless,
            BC7_UNorm,
            BC7_UNorm_SRgb,
            AYUV,
            Y410,
            Y416,
            NV12,
            P010,
            P016,
            Opaque420,
            YUY2,
            Y210,
            Y216,
            NV11,
            AI44,
            IA44,
            P8,
            A8P8,
            B4G4R4A4_UNorm,
            P208,
            V208,
            V408,
        ]
    };

    /// Look up the static attributes of this format.
    pub const fn info(self) -> FormatInfo {
        FormatInfo::new(self)
    }

    /// The identifier as used by graphics APIs.
    pub const fn to_raw(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
