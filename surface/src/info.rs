// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
use core::fmt;

use image_format::{PitchFlags, PixelFormat};

use crate::error::ImageError;

/// The dimensionality of an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageType {
    /// A row of pixels. The height is always one.
    Image1D,
    #[default]
    Image2D,
    /// A volume. The only type with more than one depth slice, and never an array.
    Image3D,
    /// An array of 2D images where each group of six forms the faces of a cube.
    ImageCube,
}

/// The shape and format of an image.
///
/// A value is a request until it went through [`ImageInfo::sanitize`], which an [`Image`] does on
/// construction. Afterwards all dimensions, the array count and the mip count are consistent with
/// each other.
///
/// [`Image`]: crate::Image
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageInfo {
    pub image_type: ImageType,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    /// The number of depth slices, only meaningful for [`ImageType::Image3D`].
    pub depth: u32,
    /// The number of array slots, always `1` for [`ImageType::Image3D`].
    pub array_count: u32,
    /// The number of mip levels. Zero requests the full chain.
    pub mip_count: u32,
    pub has_premultiplied_alpha: bool,
}

impl ImageInfo {
    /// A single pixel image of the given type.
    pub fn new(image_type: ImageType, format: PixelFormat) -> Self {
        ImageInfo {
            image_type,
            format,
            width: 1,
            height: 1,
            depth: 1,
            array_count: 1,
            mip_count: 1,
            has_premultiplied_alpha: false,
        }
    }

    /// Copy the shape of another image.
    ///
    /// Combine with [`Self::with_image_type`] and [`Self::with_format`] to override either.
    pub fn from_info(other: &ImageInfo) -> Self {
        *other
    }

    #[must_use]
    pub fn with_image_type(self, image_type: ImageType) -> Self {
        ImageInfo { image_type, ..self }
    }

    #[must_use]
    pub fn with_format(self, format: PixelFormat) -> Self {
        ImageInfo { format, ..self }
    }

    #[must_use]
    pub fn with_width(self, width: u32) -> Self {
        ImageInfo { width, ..self }
    }

    #[must_use]
    pub fn with_height(self, height: u32) -> Self {
        ImageInfo { height, ..self }
    }

    #[must_use]
    pub fn with_depth(self, depth: u32) -> Self {
        ImageInfo { depth, ..self }
    }

    #[must_use]
    pub fn with_array_count(self, array_count: u32) -> Self {
        ImageInfo {
            array_count,
            ..self
        }
    }

    #[must_use]
    pub fn with_mip_count(self, mip_count: u32) -> Self {
        ImageInfo { mip_count, ..self }
    }

    #[must_use]
    pub fn with_premultiplied_alpha(self, has_premultiplied_alpha: bool) -> Self {
        ImageInfo {
            has_premultiplied_alpha,
            ..self
        }
    }

    /// Check the dimensions an image of this type requires.
    pub fn validate(&self) -> Result<(), ImageError> {
        let shape_error = |dimension, value| ImageError::InvalidShape {
            dimension,
            value,
            image_type: self.image_type,
        };

        if self.width < 1 {
            return Err(shape_error("width", self.width));
        }

        if self.height < 1 && self.image_type != ImageType::Image1D {
            return Err(shape_error("height", self.height));
        }

        if self.depth < 1 && self.image_type == ImageType::Image3D {
            return Err(shape_error("depth", self.depth));
        }

        Ok(())
    }

    /// Make all dimensions consistent.
    ///
    /// Every dimension is clamped to at least one, dimensions the image type does not have are
    /// forced to one, the mip count is limited to the longest possible chain (and a request of
    /// zero selects that chain) and cube images get a multiple of six array slots. Sanitizing a
    /// sanitized value does not change it.
    #[must_use]
    pub fn sanitize(self) -> Self {
        let mut info = self;

        info.width = info.width.max(1);
        info.height = info.height.max(1);
        info.depth = info.depth.max(1);

        if info.image_type == ImageType::Image1D {
            info.height = 1;
        }

        if info.image_type == ImageType::Image3D {
            info.array_count = 1;
        } else {
            info.array_count = info.array_count.max(1);
            info.depth = 1;
        }

        let max_mips = calculate_max_mip_count(info.width, info.height, info.depth);
        info.mip_count = match info.mip_count {
            0 => max_mips,
            count => count.min(max_mips),
        };

        if info.image_type == ImageType::ImageCube {
            info.array_count = info.array_count.div_ceil(6) * 6;
        }

        info
    }

    /// The number of array slots, or depth slices of the top level for volumes.
    pub fn array_or_depth(&self) -> u32 {
        match self.image_type {
            ImageType::Image3D => self.depth,
            _ => self.array_count,
        }
    }

    /// The number of depth slices at a mip level.
    ///
    /// Always one except for volumes.
    pub fn depth_at(&self, mip_level: u32) -> u32 {
        match self.image_type {
            ImageType::Image3D => mip_extent(self.depth, mip_level),
            _ => 1,
        }
    }

    /// The total number of bytes to store an image of this shape.
    pub fn size_in_bytes(&self, flags: PitchFlags) -> Result<usize, ImageError> {
        calculate_size_in_bytes(
            self.image_type,
            self.width,
            self.height,
            self.array_or_depth(),
            self.format,
            self.mip_count,
            flags,
        )
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageType::Image1D => "1D",
            ImageType::Image2D => "2D",
            ImageType::Image3D => "3D",
            ImageType::ImageCube => "cube",
        })
    }
}

/// The size of a dimension at some mip level, never below one.
pub(crate) fn mip_extent(size: u32, mip_level: u32) -> u32 {
    size.checked_shr(mip_level).unwrap_or(0).max(1)
}

/// The length of the longest mip chain for an image of the given size.
///
/// Each level halves every dimension, rounding down but never below one, until all are one.
pub fn calculate_max_mip_count(width: u32, height: u32, depth: u32) -> u32 {
    let (mut width, mut height, mut depth) = (width.max(1), height.max(1), depth.max(1));
    let mut result = 1;

    while width > 1 || height > 1 || depth > 1 {
        width = (width >> 1).max(1);
        height = (height >> 1).max(1);
        depth = (depth >> 1).max(1);
        result += 1;
    }

    result
}

/// The total number of depth slices, over all mip levels, of a volume.
///
/// With fewer than two levels this is just the depth of the top level.
pub fn calculate_depth_slice_count(max_slices: u32, mip_count: u32) -> u32 {
    if mip_count < 2 {
        return max_slices;
    }

    (0..mip_count).map(|mip| mip_extent(max_slices, mip)).sum()
}

/// The number of bytes needed to store all levels of an image.
///
/// The `array_or_depth` argument is the depth of a volume, and the array count for every other
/// image type. Dimensions and counts below one are treated as one. The height of 1D images and
/// the depth of non-volumes is constant over the mip chain.
pub fn calculate_size_in_bytes(
    image_type: ImageType,
    width: u32,
    height: u32,
    array_or_depth: u32,
    format: PixelFormat,
    mip_count: u32,
    flags: PitchFlags,
) -> Result<usize, ImageError> {
    let info = format.info();
    if info.size_in_bytes() == 0 {
        return Err(ImageError::FormatNotSupported(format));
    }

    let (mut width, mut height) = (width.max(1), height.max(1));
    let mut slices = array_or_depth.max(1);
    let mut result = 0;

    for _ in 0..mip_count.max(1) {
        let pitch = info.pitch(width, height, flags);
        result += pitch.slice_pitch() * slices as usize;

        width = (width >> 1).max(1);
        match image_type {
            ImageType::Image1D => {}
            ImageType::Image2D | ImageType::ImageCube => height = (height >> 1).max(1),
            ImageType::Image3D => {
                height = (height >> 1).max(1);
                slices = (slices >> 1).max(1);
            }
        }
    }

    Ok(result)
}
