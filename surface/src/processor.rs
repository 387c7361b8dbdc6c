// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
//! Services an image delegates pixel processing to.
//!
//! This crate addresses bytes, it does not resample or encode them. Resizing, format conversion
//! and mip generation are provided by an [`ImageProcessor`], block compression by a
//! [`BlockCodec`]. Both are attached to an [`Image`] and only used while it applies edits.
use image_format::PixelFormat;

use crate::error::ImageError;
use crate::image::Image;

/// The sampling filter of a resize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageFilter {
    /// Nearest neighbour.
    #[default]
    Point,
    Linear,
    Cubic,
    /// Box filtering for downsampling.
    Fant,
}

/// How a resize maps the source onto the new size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResizeMode {
    /// Resample the whole image to the new size.
    Scale,
    /// Take the pixels of a rectangle of the source.
    Crop,
    /// Place the source unscaled at an offset within a larger, cleared image.
    Expand,
}

/// Dithering applied when a conversion loses precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageDithering {
    #[default]
    None,
    Ordered4x4,
    Ordered8x8,
    Ordered16x16,
    Spiral4x4,
    Spiral8x8,
    DualSpiral4x4,
    DualSpiral8x8,
    ErrorDiffusion,
}

/// Where the original pixels end up when an image is expanded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExpandAnchor {
    #[default]
    UpperLeft,
    UpperMiddle,
    UpperRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomMiddle,
    BottomRight,
}

/// The effort spent on block compression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompressionQuality {
    Fast,
    #[default]
    Balanced,
    BestQuality,
}

/// The arguments of [`ImageProcessor::resize`].
///
/// The new image has `width`, `height` and `depth` and `mip_count` levels. For
/// [`ResizeMode::Crop`] the origin is the top-left corner of the kept pixels in the source, for
/// [`ResizeMode::Expand`] it is the position of the source within the new image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResizeRequest {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_count: u32,
    pub filter: ImageFilter,
    pub mode: ResizeMode,
}

/// Options passed through to [`BlockCodec::encode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
    /// Store one bit of alpha in BC1 blocks.
    pub use_bc1_alpha: bool,
    pub quality: CompressionQuality,
    pub multithreaded: bool,
}

/// Conversion, resampling and mip generation of whole images.
///
/// Implementations produce new images, the caller adopts their data. They are never asked to
/// process block compressed data.
pub trait ImageProcessor: Send + Sync {
    /// Convert every buffer of an image to another format.
    fn convert_format(
        &self,
        image: &Image,
        format: PixelFormat,
        dithering: ImageDithering,
        source_srgb: bool,
        target_srgb: bool,
    ) -> Result<Image, ImageError>;

    /// Create a resized copy of an image, see [`ResizeRequest`].
    fn resize(&self, image: &Image, request: &ResizeRequest) -> Result<Image, ImageError>;

    /// Fill every mip level below the first from the level above it.
    fn generate_mip_images(&self, image: &mut Image, filter: ImageFilter)
        -> Result<(), ImageError>;

    /// The subset of `candidates` that `source` can be converted to.
    fn can_convert(&self, source: PixelFormat, candidates: &[PixelFormat]) -> Vec<PixelFormat>;
}

/// Encoder and decoder of block compressed data.
pub trait BlockCodec: Send + Sync {
    /// Decode one buffer of blocks into tightly packed 8-bit RGBA rows.
    fn decode(
        &self,
        blocks: &[u8],
        width: u32,
        height: u32,
        use_bc1_alpha: bool,
        format: PixelFormat,
    ) -> Result<Vec<u8>, ImageError>;

    /// Encode one buffer of tightly packed pixels in `source` format into blocks of `target`.
    fn encode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        source: PixelFormat,
        target: PixelFormat,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, ImageError>;
}
