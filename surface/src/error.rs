// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
use image_format::{PitchError, PixelFormat};

use crate::info::ImageType;

/// Errors of image construction, addressing and editing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ImageError {
    /// The format is unknown or has no byte layout, or the requested conversion is unavailable.
    #[error("pixel format {0} is not supported here")]
    FormatNotSupported(PixelFormat),

    #[error("{dimension} of {value} is too small for a {image_type} image")]
    InvalidShape {
        dimension: &'static str,
        value: u32,
        image_type: ImageType,
    },

    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    #[error("{what} {index} is out of range 0..{len}")]
    IndexOutOfRange {
        what: &'static str,
        index: u32,
        len: u32,
    },

    #[error("an update of this image is already in progress")]
    AlreadyEditing,

    #[error("no update of this image is in progress")]
    NotEditing,

    /// Generic edits require uncompressed data with a concrete interpretation.
    #[error("operation is not supported on compressed or typeless format {0}")]
    UnsupportedOnCompressedData(PixelFormat),

    #[error("expected pixel format {expected}, found {found}")]
    FormatMismatch {
        expected: PixelFormat,
        found: PixelFormat,
    },

    #[error("expected at least {required} bytes, got {len}")]
    BufferTooSmall { required: usize, len: usize },

    /// A buffer descriptor was used after its image replaced the allocation it addresses.
    #[error("buffer descriptor refers to a replaced allocation")]
    StaleBuffer,

    #[error("no {0} is attached to the image")]
    MissingCollaborator(&'static str),

    /// An error reported by an image processor or block codec.
    #[error("image processing failed")]
    Processor(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Pitch(#[from] PitchError),
}

impl ImageError {
    /// Wrap an error of a collaborator.
    pub fn processor(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ImageError::Processor(err.into())
    }
}
