// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
use image_format::PitchFlags;

use crate::buffer::ImageBuffer;
use crate::error::ImageError;
use crate::info::{mip_extent, ImageInfo, ImageType};

/// The subdivision of an image allocation into buffers.
///
/// Buffers are stored in the order of their bytes. Arrays are ordered by array slot and then by mip
/// level, each slot holding its complete mip chain. Volumes hold every depth slice of the first
/// mip level, followed by every depth slice of the next level and so on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferList {
    buffers: Vec<ImageBuffer>,
    /// For each mip level, the index of its first buffer (of array slot zero).
    mip_start: Vec<usize>,
    image_type: ImageType,
    array_count: u32,
    mip_count: u32,
    total_len: usize,
}

impl BufferList {
    /// Lay out the buffers of a sanitized shape.
    pub(crate) fn new(info: &ImageInfo, generation: u64) -> Self {
        let format = info.format.info();
        let mut buffers = Vec::new();
        let mut mip_start = vec![0; info.mip_count as usize];
        let mut offset = 0;

        let mut push = |mip: u32, array_index: u32, depth_slice: u32, offset: &mut usize| {
            let width = mip_extent(info.width, mip);
            let height = match info.image_type {
                ImageType::Image1D => info.height,
                _ => mip_extent(info.height, mip),
            };

            let pitch = format.pitch(width, height, PitchFlags::empty());
            let len = pitch.slice_pitch();

            buffers.push(ImageBuffer {
                format: info.format,
                width,
                height,
                depth: info.depth_at(mip),
                mip_level: mip,
                array_index,
                depth_slice,
                pitch,
                offset: *offset,
                len,
                generation,
            });

            *offset += len;
        };

        if info.image_type == ImageType::Image3D {
            for mip in 0..info.mip_count {
                mip_start[mip as usize] = buffers_len(&mip_start, mip, info);
                for slice in 0..info.depth_at(mip) {
                    push(mip, 0, slice, &mut offset);
                }
            }
        } else {
            for array_index in 0..info.array_count {
                for mip in 0..info.mip_count {
                    push(mip, array_index, 0, &mut offset);
                }
            }

            for (mip, start) in mip_start.iter_mut().enumerate() {
                *start = mip;
            }
        }

        BufferList {
            buffers,
            mip_start,
            image_type: info.image_type,
            array_count: info.array_count,
            mip_count: info.mip_count,
            total_len: offset,
        }
    }

    /// Find the buffer of a mip level and an array slot, or a depth slice for volumes.
    pub fn get(&self, mip_level: u32, array_or_slice: u32) -> Result<&ImageBuffer, ImageError> {
        let start = self.start_of(mip_level)?;

        let index = match self.image_type {
            ImageType::Image3D => {
                let depth = self.depth_count(mip_level)?;
                check_index("depth slice", array_or_slice, depth)?;
                start + array_or_slice as usize
            }
            _ => {
                check_index("array index", array_or_slice, self.array_count)?;
                array_or_slice as usize * self.mip_count as usize + start
            }
        };

        Ok(&self.buffers[index])
    }

    /// The number of depth slices at a mip level, one for anything but volumes.
    pub fn depth_count(&self, mip_level: u32) -> Result<u32, ImageError> {
        let start = self.start_of(mip_level)?;

        Ok(match self.image_type {
            ImageType::Image3D => self.buffers[start].depth,
            _ => 1,
        })
    }

    /// The byte offset of the first buffer of a mip level.
    pub fn mip_offset(&self, mip_level: u32) -> Result<usize, ImageError> {
        let start = self.start_of(mip_level)?;
        Ok(self.buffers[start].offset)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, ImageBuffer> {
        self.buffers.iter()
    }

    pub fn as_slice(&self) -> &[ImageBuffer] {
        &self.buffers
    }

    /// The number of bytes addressed by all buffers together.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    fn start_of(&self, mip_level: u32) -> Result<usize, ImageError> {
        check_index("mip level", mip_level, self.mip_count)?;
        Ok(self.mip_start[mip_level as usize])
    }
}

impl<'lt> IntoIterator for &'lt BufferList {
    type Item = &'lt ImageBuffer;
    type IntoIter = core::slice::Iter<'lt, ImageBuffer>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The number of volume buffers before a mip level.
fn buffers_len(mip_start: &[usize], mip: u32, info: &ImageInfo) -> usize {
    match mip.checked_sub(1) {
        None => 0,
        Some(prev) => mip_start[prev as usize] + info.depth_at(prev) as usize,
    }
}

fn check_index(what: &'static str, index: u32, len: u32) -> Result<(), ImageError> {
    if index < len {
        Ok(())
    } else {
        Err(ImageError::IndexOutOfRange { what, index, len })
    }
}
