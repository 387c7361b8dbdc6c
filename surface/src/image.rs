// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
use std::fmt;
use std::sync::Arc;

use image_format::{FormatInfo, PitchFlags, PixelFormat};
use tracing::debug;

use crate::buf::Store;
use crate::buffer::{self, BufferMut, BufferRef, ImageBuffer, Rect};
use crate::convert;
use crate::edit::EditOp;
use crate::error::ImageError;
use crate::info::ImageInfo;
use crate::layout::BufferList;
use crate::processor::{BlockCodec, ImageProcessor};

/// An image with all of its mip levels, array slots and depth slices in one allocation.
///
/// The image exclusively owns its bytes. Buffers are described by [`ImageBuffer`] descriptors and
/// accessed through views borrowed from the image, so no view can outlive the data or observe it
/// being replaced. An edit (see [`Image::begin_update`]) may replace the allocation entirely,
/// which makes every previously obtained descriptor stale.
pub struct Image {
    pub(crate) info: ImageInfo,
    pub(crate) format_info: FormatInfo,
    pub(crate) store: Store,
    pub(crate) buffers: BufferList,
    /// The queued edits, `Some` exactly while an update is in progress.
    pub(crate) pending: Option<Vec<EditOp>>,
    pub(crate) processor: Option<Arc<dyn ImageProcessor>>,
    pub(crate) codec: Option<Arc<dyn BlockCodec>>,
}

impl Image {
    /// Allocate a zeroed image.
    ///
    /// The shape is validated and then sanitized, see [`ImageInfo::sanitize`].
    pub fn new(info: ImageInfo) -> Result<Self, ImageError> {
        let (info, len) = Self::prepare(info)?;
        Ok(Self::from_store(info, Store::new(len)))
    }

    /// Allocate an image and initialize it from existing bytes.
    ///
    /// The data must hold at least as many bytes as the image requires, any excess is ignored.
    pub fn with_data(info: ImageInfo, data: &[u8]) -> Result<Self, ImageError> {
        let (info, len) = Self::prepare(info)?;
        if data.len() < len {
            return Err(ImageError::BufferTooSmall {
                required: len,
                len: data.len(),
            });
        }

        Ok(Self::from_store(info, Store::from_bytes(&data[..len])))
    }

    fn prepare(info: ImageInfo) -> Result<(ImageInfo, usize), ImageError> {
        info.validate()?;
        let info = info.sanitize();
        let len = info.size_in_bytes(PitchFlags::empty())?;
        Ok((info, len))
    }

    fn from_store(info: ImageInfo, store: Store) -> Self {
        let buffers = BufferList::new(&info, store.generation());
        debug!(
            format = %info.format,
            width = info.width,
            height = info.height,
            depth = info.depth,
            array_count = info.array_count,
            mip_count = info.mip_count,
            bytes = store.len(),
            "allocated image"
        );

        Image {
            info,
            format_info: info.format.info(),
            store,
            buffers,
            pending: None,
            processor: None,
            codec: None,
        }
    }

    /// The sanitized shape.
    pub fn info(&self) -> &ImageInfo {
        &self.info
    }

    pub fn format(&self) -> PixelFormat {
        self.info.format
    }

    pub fn format_info(&self) -> &FormatInfo {
        &self.format_info
    }

    /// The number of bytes of all buffers.
    pub fn size_in_bytes(&self) -> usize {
        self.store.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.store.as_bytes()
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.store.as_bytes_mut()
    }

    /// Descriptors of all buffers.
    pub fn buffers(&self) -> &BufferList {
        &self.buffers
    }

    /// Borrow the buffer of a mip level and array slot, or depth slice for volumes.
    pub fn buffer(&self, mip_level: u32, array_or_slice: u32) -> Result<BufferRef<'_>, ImageError> {
        let buffer = *self.buffers.get(mip_level, array_or_slice)?;
        Ok(BufferRef::new(buffer, self.store.as_bytes()))
    }

    pub fn buffer_mut(
        &mut self,
        mip_level: u32,
        array_or_slice: u32,
    ) -> Result<BufferMut<'_>, ImageError> {
        let buffer = *self.buffers.get(mip_level, array_or_slice)?;
        Ok(BufferMut::new(buffer, self.store.as_bytes_mut()))
    }

    /// The bytes addressed by a descriptor of this image's current allocation.
    pub fn data(&self, buffer: &ImageBuffer) -> Result<&[u8], ImageError> {
        self.check_current(buffer)?;
        Ok(BufferRef::new(*buffer, self.store.as_bytes()).as_bytes())
    }

    pub fn data_mut(&mut self, buffer: &ImageBuffer) -> Result<&mut [u8], ImageError> {
        self.check_current(buffer)?;
        Ok(BufferMut::new(*buffer, self.store.as_bytes_mut()).into_bytes())
    }

    fn check_current(&self, buffer: &ImageBuffer) -> Result<(), ImageError> {
        let in_bounds = buffer
            .offset
            .checked_add(buffer.len)
            .is_some_and(|end| end <= self.store.len());

        if buffer.generation != self.store.generation() || !in_bounds {
            return Err(ImageError::StaleBuffer);
        }

        Ok(())
    }

    /// The number of depth slices at a mip level.
    pub fn depth_count(&self, mip_level: u32) -> Result<u32, ImageError> {
        self.buffers.depth_count(mip_level)
    }

    /// Copy pixels between two buffers of this image, see [`BufferRef::copy_to`].
    ///
    /// Copying a buffer onto itself does nothing. The two descriptors must not address
    /// overlapping bytes otherwise.
    pub fn copy_within(
        &mut self,
        source: &ImageBuffer,
        dest: &ImageBuffer,
        source_region: Option<Rect>,
        dest_x: i32,
        dest_y: i32,
    ) -> Result<(), ImageError> {
        self.check_current(source)?;
        self.check_current(dest)?;

        if source == dest {
            return Ok(());
        }

        let bytes = self.store.as_bytes_mut();
        let (src_data, dst_data) = if source.offset + source.len <= dest.offset {
            let (head, tail) = bytes.split_at_mut(dest.offset);
            (&head[source.offset..][..source.len], &mut tail[..dest.len])
        } else if dest.offset + dest.len <= source.offset {
            let (head, tail) = bytes.split_at_mut(source.offset);
            (&tail[..source.len], &mut head[dest.offset..][..dest.len])
        } else {
            return Err(ImageError::InvalidArgument {
                name: "dest",
                reason: "overlaps the source buffer",
            });
        };

        buffer::copy_pixels(
            source,
            src_data,
            dest,
            dst_data,
            source_region,
            dest_x,
            dest_y,
        )
    }

    /// Make another image an exact copy of this one.
    ///
    /// The destination keeps its attached collaborators and any pending edits.
    pub fn copy_to(&self, dest: &mut Image) {
        dest.adopt(self.info, self.store.clone());
    }

    /// Attach the processor used for conversions, resizing and mip generation.
    pub fn set_processor(&mut self, processor: Arc<dyn ImageProcessor>) {
        self.processor = Some(processor);
    }

    /// Attach the codec used to compress and decompress blocks.
    pub fn set_codec(&mut self, codec: Arc<dyn BlockCodec>) {
        self.codec = Some(codec);
    }

    pub(crate) fn processor(&self) -> Result<Arc<dyn ImageProcessor>, ImageError> {
        self.processor
            .clone()
            .ok_or(ImageError::MissingCollaborator("image processor"))
    }

    pub(crate) fn codec(&self) -> Result<Arc<dyn BlockCodec>, ImageError> {
        self.codec
            .clone()
            .ok_or(ImageError::MissingCollaborator("block codec"))
    }

    /// Whether the data can be converted to a format.
    ///
    /// Conversions other than the identity and those of `B4G4R4A4_UNorm` from and to the 8-bit
    /// four channel formats require an attached processor that supports them.
    pub fn can_convert_to(&self, format: PixelFormat) -> bool {
        !self.can_convert_to_any(&[format]).is_empty()
    }

    /// The subset of formats the data can be converted to.
    pub fn can_convert_to_any(&self, formats: &[PixelFormat]) -> Vec<PixelFormat> {
        let current = self.format();
        let processor = self.processor.as_deref();
        let via_processor = |from: PixelFormat, to: PixelFormat| {
            processor.is_some_and(|p| p.can_convert(from, &[to]).contains(&to))
        };

        formats
            .iter()
            .copied()
            .filter(|&target| match (current, target) {
                (_, PixelFormat::Unknown) => false,
                (from, to) if from == to => true,
                (PixelFormat::B4G4R4A4_UNorm, to) => {
                    convert::is_wide_format(to)
                        || via_processor(convert::wide_intermediate(to), to)
                }
                (from, PixelFormat::B4G4R4A4_UNorm) => {
                    convert::is_wide_format(from)
                        || via_processor(from, PixelFormat::B8G8R8A8_UNorm)
                }
                (from, to) => via_processor(from, to),
            })
            .collect()
    }

    /// Decode block compressed data into 8-bit RGBA.
    ///
    /// The result is `R8G8B8A8_UNorm_SRgb` for sRGB sources and `R8G8B8A8_UNorm` otherwise. This
    /// happens immediately and can not be part of an update.
    pub fn decompress(&mut self, use_bc1_alpha: bool) -> Result<&mut Self, ImageError> {
        if self.pending.is_some() {
            return Err(ImageError::AlreadyEditing);
        }

        let format = self.format();
        if !self.format_info.is_compressed() || self.format_info.is_typeless() {
            return Err(ImageError::FormatNotSupported(format));
        }

        let codec = self.codec()?;
        let target = if self.format_info.is_srgb() {
            PixelFormat::R8G8B8A8_UNorm_SRgb
        } else {
            PixelFormat::R8G8B8A8_UNorm
        };

        let mut decoded = Image::new(self.info.with_format(target))?;
        for (src, dst) in self.buffers.iter().zip(decoded.buffers.iter()) {
            let blocks = BufferRef::new(*src, self.store.as_bytes()).as_bytes();
            let pixels = codec.decode(blocks, src.width, src.height, use_bc1_alpha, format)?;
            let mut out = BufferMut::new(*dst, decoded.store.as_bytes_mut());
            fill_from(&mut out, &pixels)?;
        }

        debug!(from = %format, to = %target, "decompressed image");
        self.replace_with(decoded);
        Ok(self)
    }

    /// Take over the data of another image.
    ///
    /// Shape, format and bytes are replaced together. Collaborators and the update state of this
    /// image are kept.
    pub fn replace_with(&mut self, other: Image) {
        self.adopt(other.info, other.store);
    }

    pub(crate) fn adopt(&mut self, info: ImageInfo, store: Store) {
        debug!(
            format = %info.format,
            width = info.width,
            height = info.height,
            bytes = store.len(),
            "adopting image data"
        );

        self.buffers = BufferList::new(&info, store.generation());
        self.format_info = info.format.info();
        self.info = info;
        self.store = store;
    }
}

/// Copy tightly packed rows into a buffer, respecting its row pitch.
pub(crate) fn fill_from(dest: &mut BufferMut<'_>, packed: &[u8]) -> Result<(), ImageError> {
    let buffer = *dest.buffer();
    let line = buffer.line_bytes(buffer.width);

    if buffer.format.info().is_compressed() || buffer.pitch.row_pitch() == line {
        let required = buffer.len;
        let Some(source) = packed.get(..required) else {
            return Err(ImageError::BufferTooSmall {
                required,
                len: packed.len(),
            });
        };

        dest.as_bytes_mut().copy_from_slice(source);
        return Ok(());
    }

    let required = line * buffer.height as usize;
    if packed.len() < required {
        return Err(ImageError::BufferTooSmall {
            required,
            len: packed.len(),
        });
    }

    for (y, row) in packed.chunks_exact(line).take(buffer.height as usize).enumerate() {
        if let Some(target) = dest.row_mut(y as u32) {
            target.copy_from_slice(row);
        }
    }

    Ok(())
}

impl Clone for Image {
    /// A deep copy of the data, in a new allocation. Collaborators are shared, pending edits are
    /// not copied.
    fn clone(&self) -> Self {
        let store = self.store.clone();
        Image {
            info: self.info,
            format_info: self.format_info,
            buffers: BufferList::new(&self.info, store.generation()),
            store,
            pending: None,
            processor: self.processor.clone(),
            codec: self.codec.clone(),
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("info", &self.info)
            .field("size_in_bytes", &self.store.len())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
