// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
use bitflags::bitflags;

bitflags! {
    /// Adjustments to the row pitch of uncompressed formats.
    ///
    /// These exist to read and write surfaces of legacy file formats which do not use tightly
    /// packed rows. For modern data no flag should be set.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PitchFlags: u32 {
        /// Rows are padded to a multiple of 4 bytes.
        const LEGACY_DWORD = 0x1;
        /// Rows are padded to a multiple of 16 bytes.
        const ALIGN_16 = 0x2;
        /// Rows are padded to a multiple of 32 bytes.
        const ALIGN_32 = 0x4;
        /// Rows are padded to a multiple of 64 bytes.
        const ALIGN_64 = 0x8;
        /// Rows are padded to a multiple of 4096 bytes.
        const ALIGN_4K = 0x200;
        /// Compute as if each pixel had 24 bits.
        const BPP24 = 0x10000;
        /// Compute as if each pixel had 16 bits.
        const BPP16 = 0x20000;
        /// Compute as if each pixel had 8 bits.
        const BPP8 = 0x40000;
    }
}

/// The byte distances between rows and between slices of an image.
///
/// For block compressed formats the layout also records the number of blocks in each direction,
/// a row then refers to a row of blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PitchLayout {
    row_pitch: usize,
    slice_pitch: usize,
    horizontal_blocks: u32,
    vertical_blocks: u32,
}

/// A pitch layout with only one of its two block counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PitchError {
    #[error("block counts must both be zero or both be positive, got {horizontal}x{vertical}")]
    MismatchedBlocks { horizontal: u32, vertical: u32 },
}

impl PitchLayout {
    /// A layout of a format that is not block compressed.
    pub const fn new(row_pitch: usize, slice_pitch: usize) -> Self {
        PitchLayout {
            row_pitch,
            slice_pitch,
            horizontal_blocks: 0,
            vertical_blocks: 0,
        }
    }

    /// A layout with explicit block counts.
    ///
    /// Pass zero for both counts to describe an uncompressed layout.
    pub const fn with_blocks(
        row_pitch: usize,
        slice_pitch: usize,
        horizontal_blocks: u32,
        vertical_blocks: u32,
    ) -> Result<Self, PitchError> {
        if (horizontal_blocks == 0) != (vertical_blocks == 0) {
            return Err(PitchError::MismatchedBlocks {
                horizontal: horizontal_blocks,
                vertical: vertical_blocks,
            });
        }

        Ok(PitchLayout {
            row_pitch,
            slice_pitch,
            horizontal_blocks,
            vertical_blocks,
        })
    }

    /// Construct a block layout from counts that are known to be positive.
    pub(crate) const fn from_blocks(
        row_pitch: usize,
        slice_pitch: usize,
        horizontal_blocks: u32,
        vertical_blocks: u32,
    ) -> Self {
        debug_assert!(horizontal_blocks > 0 && vertical_blocks > 0);
        PitchLayout {
            row_pitch,
            slice_pitch,
            horizontal_blocks,
            vertical_blocks,
        }
    }

    pub const fn row_pitch(&self) -> usize {
        self.row_pitch
    }

    pub const fn slice_pitch(&self) -> usize {
        self.slice_pitch
    }

    pub const fn horizontal_blocks(&self) -> u32 {
        self.horizontal_blocks
    }

    pub const fn vertical_blocks(&self) -> u32 {
        self.vertical_blocks
    }

    /// The block counts `(horizontal, vertical)` if this is a block compressed layout.
    pub const fn blocks(&self) -> Option<(u32, u32)> {
        if self.horizontal_blocks == 0 {
            None
        } else {
            Some((self.horizontal_blocks, self.vertical_blocks))
        }
    }
}
