// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
//! Texture data with mip chains, arrays and volumes.
//!
//! An [`Image`] owns one allocation holding every mip level of every array slot, or every depth
//! slice of a volume, in a pixel format from [`image_format`]. Each of those is an
//! [`ImageBuffer`], a descriptor that locates its bytes and knows their pitch. Descriptors are
//! turned into borrowed views, [`BufferRef`] and [`BufferMut`], to read or copy pixels.
//!
//! Edits that change the shape or format are recorded between [`Image::begin_update`] and
//! [`Image::end_update`] and applied in order at the end. Resampling, format conversion and block
//! compression are delegated to collaborators in [`processor`] that are attached to the image.
//!
//! # Usage
//!
//! ```
//! use image_surface::{Image, ImageInfo, ImageType, PixelFormat, Rect};
//!
//! let info = ImageInfo::new(ImageType::Image2D, PixelFormat::R8G8B8A8_UNorm)
//!     .with_width(17)
//!     .with_height(5)
//!     .with_mip_count(0);
//! let mut image = Image::new(info)?;
//!
//! // The full chain: 17x5, 8x2, 4x1, 2x1 and 1x1.
//! assert_eq!(image.info().mip_count, 5);
//! assert_eq!(image.buffers().len(), 5);
//!
//! let mut top = image.buffer_mut(0, 0)?;
//! top.region_mut(Rect::new(2, 2, 4, 2))?
//!     .expect("region within the image")
//!     .fill(0xff);
//! assert_eq!(top.to_ref().row(1).unwrap()[..8], [0; 8]);
//! assert_eq!(top.to_ref().row(2).unwrap()[8..24], [0xff; 16]);
//! assert_eq!(top.to_ref().row(2).unwrap()[24..], [0; 44]);
//!
//! let second = image.buffer(1, 0)?;
//! assert_eq!(second.buffer().width(), 8);
//! # Ok::<(), image_surface::ImageError>(())
//! ```
#![deny(unsafe_code)]

mod buf;
mod buffer;
mod convert;
mod edit;
mod error;
mod image;
mod info;
mod layout;
pub mod processor;

pub use image_format::{FormatInfo, PitchFlags, PitchLayout, PixelFormat};

pub use self::buffer::{BufferMut, BufferRef, ImageBuffer, Rect};
pub use self::edit::EditOp;
pub use self::error::ImageError;
pub use self::image::Image;
pub use self::info::{
    calculate_depth_slice_count, calculate_max_mip_count, calculate_size_in_bytes, ImageInfo,
    ImageType,
};
pub use self::layout::BufferList;
