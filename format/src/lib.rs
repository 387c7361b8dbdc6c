// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
//! # Format
//!
//! Byte-level facts about texture pixel formats.
//!
//! This library is strictly `no_std` and allocation free. It answers a single question for a
//! closed set of pixel formats, uncompressed, packed video and block compressed alike: where do
//! the bytes of a row, and of a whole slice, live? The answers are computed from a static table of
//! format attributes and a handful of closed-form pitch rules:
//!
//! - A [`PixelFormat`] names the format, with the numeric identifiers commonly used by GPU APIs.
//! - A [`FormatInfo`] is the table row for that format plus the derived queries.
//! - A [`PitchLayout`] is the result of a pitch query for some width and height.
//! - [`PitchFlags`] reproduce legacy row alignments of historical on-disk layouts.
//!
//! ## Usage
//!
//! ```
//! use image_format::{PitchFlags, PixelFormat};
//!
//! let info = PixelFormat::BC3_UNorm.info();
//! assert!(info.is_compressed());
//!
//! // A 10x10 block compressed image is 3x3 blocks of 16 bytes each.
//! let pitch = info.pitch(10, 10, PitchFlags::empty());
//! assert_eq!(pitch.row_pitch(), 48);
//! assert_eq!(pitch.slice_pitch(), 144);
//! assert_eq!(info.scanlines(10), 3);
//! ```
#![no_std]
#![deny(unsafe_code)]

mod format;
mod info;
mod pitch;
mod table;

pub use self::format::PixelFormat;
pub use self::info::FormatInfo;
pub use self::pitch::{PitchError, PitchFlags, PitchLayout};
