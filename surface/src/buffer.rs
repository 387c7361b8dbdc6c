// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
use std::borrow::Cow;

use image_format::{FormatInfo, PitchLayout, PixelFormat};

use crate::error::ImageError;

/// A rectangle of pixels.
///
/// The origin may be negative, to describe regions partially outside of a buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin.
    pub const fn with_size(width: u32, height: u32) -> Self {
        Rect::new(0, 0, width, height)
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The area covered by both rectangles, or `None` if that area is empty.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = i64::from(self.x).max(i64::from(other.x));
        let top = i64::from(self.y).max(i64::from(other.y));
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return None;
        }

        // All values are within the bounds of the inputs.
        Some(Rect {
            x: left as i32,
            y: top as i32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }

    fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }
}

/// Describes one addressable slice of an image: one array slot (or depth slice) at one mip level.
///
/// This is a plain descriptor, it stores where its bytes live in the allocation of its image but
/// does not borrow them. Get the bytes with [`Image::data`], or use a [`BufferRef`] obtained from
/// [`Image::buffer`]. A descriptor is only valid for the allocation it was created for, after an
/// image has adopted new data the descriptor is stale.
///
/// [`Image::data`]: crate::Image::data
/// [`Image::buffer`]: crate::Image::buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageBuffer {
    pub(crate) format: PixelFormat,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) depth: u32,
    pub(crate) mip_level: u32,
    pub(crate) array_index: u32,
    pub(crate) depth_slice: u32,
    pub(crate) pitch: PitchLayout,
    pub(crate) offset: usize,
    pub(crate) len: usize,
    pub(crate) generation: u64,
}

impl ImageBuffer {
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn format_info(&self) -> FormatInfo {
        self.format.info()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The number of depth slices of the mip level this buffer belongs to.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn mip_level(&self) -> u32 {
        self.mip_level
    }

    pub fn array_index(&self) -> u32 {
        self.array_index
    }

    pub fn depth_slice(&self) -> u32 {
        self.depth_slice
    }

    pub fn pitch(&self) -> PitchLayout {
        self.pitch
    }

    /// The byte offset within the allocation of the image.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The number of bytes addressed.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The rectangle of all pixels.
    pub fn bounds(&self) -> Rect {
        Rect::with_size(self.width, self.height)
    }

    /// Bytes of the first `width` pixels of a row, never more than the row pitch.
    pub(crate) fn line_bytes(&self, width: u32) -> usize {
        (width as usize * self.format.info().size_in_bytes()).min(self.pitch.row_pitch())
    }

    /// Rectangles of pixels can only be addressed in formats with whole bytes per pixel.
    fn check_addressable(&self) -> Result<(), ImageError> {
        let info = self.format.info();
        if info.is_compressed() {
            return Err(ImageError::UnsupportedOnCompressedData(self.format));
        }

        if info.bit_depth() % 8 != 0
            || info.is_packed()
            || info.is_planar()
            || self.format == PixelFormat::YUY2
        {
            return Err(ImageError::FormatNotSupported(self.format));
        }

        Ok(())
    }

    fn range(&self) -> core::ops::Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Describe a clipped region, relative to this buffer's data.
    fn region_of(&self, rect: Rect) -> Result<Option<(ImageBuffer, usize)>, ImageError> {
        self.check_addressable()?;

        let Some(clip) = rect.intersect(&self.bounds()) else {
            return Ok(None);
        };

        let row_pitch = self.pitch.row_pitch();
        let line = self.line_bytes(clip.width);
        let start = clip.y as usize * row_pitch + self.line_bytes(clip.x as u32);
        let len = (clip.height as usize - 1) * row_pitch + line;
        let pitch = PitchLayout::new(row_pitch, line * clip.height as usize);

        let region = ImageBuffer {
            width: clip.width,
            height: clip.height,
            pitch,
            offset: self.offset + start,
            len,
            ..*self
        };

        Ok(Some((region, start)))
    }
}

/// A borrowed view of the bytes of one buffer.
#[derive(Clone, Copy, Debug)]
pub struct BufferRef<'data> {
    buffer: ImageBuffer,
    data: &'data [u8],
}

/// A mutable borrowed view of the bytes of one buffer.
#[derive(Debug)]
pub struct BufferMut<'data> {
    buffer: ImageBuffer,
    data: &'data mut [u8],
}

impl<'data> BufferRef<'data> {
    /// Borrow a buffer out of the whole data of its image.
    pub(crate) fn new(buffer: ImageBuffer, image_data: &'data [u8]) -> Self {
        let data = &image_data[buffer.range()];
        BufferRef { buffer, data }
    }

    /// The descriptor of this buffer.
    pub fn buffer(&self) -> &ImageBuffer {
        &self.buffer
    }

    /// The raw span of this view, from its first pixel to its last.
    ///
    /// Rows are strided by the row pitch. For a region that is narrower than its parent the span
    /// includes pixels outside of the region, use [`BufferRef::row`] to address the region alone.
    pub fn as_bytes(&self) -> &'data [u8] {
        self.data
    }

    /// View the raw span as texels, see [`BufferRef::as_bytes`].
    ///
    /// Returns `None` if the bytes are not aligned for `T` or are not a multiple of its size.
    pub fn as_texels<T: bytemuck::Pod>(&self) -> Option<&'data [T]> {
        bytemuck::try_cast_slice(self.data).ok()
    }

    /// All pixel bytes with the padding of each row removed.
    ///
    /// Borrows when rows are already contiguous. Block compressed data is always returned as is.
    pub fn to_packed(&self) -> Cow<'data, [u8]> {
        let line = self.buffer.line_bytes(self.buffer.width);
        if self.buffer.format.info().is_compressed() || self.buffer.pitch.row_pitch() == line {
            return Cow::Borrowed(self.data);
        }

        let mut packed = Vec::with_capacity(line * self.buffer.height as usize);
        for y in 0..self.buffer.height {
            packed.extend_from_slice(self.row(y).unwrap_or_default());
        }

        Cow::Owned(packed)
    }

    /// The pixel bytes of one row, without padding.
    pub fn row(&self, y: u32) -> Option<&'data [u8]> {
        row_range(&self.buffer, y).map(|range| &self.data[range])
    }

    /// The pixels of one row as texels.
    ///
    /// Returns `None` if the row does not exist or is not aligned for `T`.
    pub fn row_texels<T: bytemuck::Pod>(&self, y: u32) -> Option<&'data [T]> {
        bytemuck::try_cast_slice(self.row(y)?).ok()
    }

    /// A view of the pixels within a rectangle.
    ///
    /// The rectangle is clipped to the buffer. The region keeps the row pitch of this buffer, so
    /// its rows are not contiguous in general. Returns `None` if nothing remains after clipping.
    pub fn region(&self, rect: Rect) -> Result<Option<BufferRef<'data>>, ImageError> {
        match self.buffer.region_of(rect)? {
            None => Ok(None),
            Some((buffer, start)) => Ok(Some(BufferRef {
                buffer,
                data: &self.data[start..start + buffer.len],
            })),
        }
    }

    /// Copy pixels into another buffer of the same format.
    ///
    /// The source region (the whole buffer if `None`) is clipped to this buffer, and its copy at
    /// `(dest_x, dest_y)` is clipped to the destination. Pixels clipped on either side are not
    /// copied. When nothing remains, the destination is not modified.
    pub fn copy_to(
        &self,
        dest: &mut BufferMut<'_>,
        source_region: Option<Rect>,
        dest_x: i32,
        dest_y: i32,
    ) -> Result<(), ImageError> {
        copy_pixels(
            &self.buffer,
            self.data,
            &dest.buffer,
            dest.data,
            source_region,
            dest_x,
            dest_y,
        )
    }
}

impl<'data> BufferMut<'data> {
    pub(crate) fn new(buffer: ImageBuffer, image_data: &'data mut [u8]) -> Self {
        let data = &mut image_data[buffer.range()];
        BufferMut { buffer, data }
    }

    pub fn buffer(&self) -> &ImageBuffer {
        &self.buffer
    }

    /// Reborrow as an immutable view.
    pub fn to_ref(&self) -> BufferRef<'_> {
        BufferRef {
            buffer: self.buffer,
            data: &*self.data,
        }
    }

    /// The raw span of this view, see [`BufferRef::as_bytes`].
    pub fn as_bytes(&self) -> &[u8] {
        self.data
    }

    /// The raw span of this view.
    ///
    /// Writes to a region through this span can reach pixels outside of it, use
    /// [`BufferMut::row_mut`] or [`BufferMut::fill`] to stay within the region.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.data
    }

    pub fn into_bytes(self) -> &'data mut [u8] {
        self.data
    }

    pub fn as_texels<T: bytemuck::Pod>(&self) -> Option<&[T]> {
        bytemuck::try_cast_slice(&*self.data).ok()
    }

    /// View the raw span as texels, see [`BufferMut::as_bytes_mut`].
    pub fn as_texels_mut<T: bytemuck::Pod>(&mut self) -> Option<&mut [T]> {
        bytemuck::try_cast_slice_mut(&mut *self.data).ok()
    }

    /// The pixel bytes of one row, without padding.
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        let range = row_range(&self.buffer, y)?;
        Some(&mut self.data[range])
    }

    /// The pixels of one row as texels.
    ///
    /// Returns `None` if the row does not exist or is not aligned for `T`.
    pub fn row_texels_mut<T: bytemuck::Pod>(&mut self, y: u32) -> Option<&mut [T]> {
        bytemuck::try_cast_slice_mut(self.row_mut(y)?).ok()
    }

    /// A mutable view of the pixels within a rectangle, see [`BufferRef::region`].
    pub fn region_mut(&mut self, rect: Rect) -> Result<Option<BufferMut<'_>>, ImageError> {
        match self.buffer.region_of(rect)? {
            None => Ok(None),
            Some((buffer, start)) => Ok(Some(BufferMut {
                buffer,
                data: &mut self.data[start..start + buffer.len],
            })),
        }
    }

    /// Set the bytes of every pixel.
    ///
    /// Row padding is set as well when the view spans whole rows. A region narrower than its
    /// parent only has its own pixels set.
    pub fn fill(&mut self, value: u8) {
        let whole = self.data.len() == self.buffer.pitch.slice_pitch();
        if whole || self.buffer.format.info().is_compressed() {
            self.data.fill(value);
            return;
        }

        for y in 0..self.buffer.height {
            if let Some(row) = self.row_mut(y) {
                row.fill(value);
            }
        }
    }

    /// Copy pixels into another buffer, see [`BufferRef::copy_to`].
    pub fn copy_to(
        &self,
        dest: &mut BufferMut<'_>,
        source_region: Option<Rect>,
        dest_x: i32,
        dest_y: i32,
    ) -> Result<(), ImageError> {
        self.to_ref().copy_to(dest, source_region, dest_x, dest_y)
    }
}

fn row_range(buffer: &ImageBuffer, y: u32) -> Option<core::ops::Range<usize>> {
    if y >= buffer.height || buffer.format.info().is_compressed() {
        return None;
    }

    let start = y as usize * buffer.pitch.row_pitch();
    Some(start..start + buffer.line_bytes(buffer.width))
}

pub(crate) fn copy_pixels(
    src: &ImageBuffer,
    src_data: &[u8],
    dst: &ImageBuffer,
    dst_data: &mut [u8],
    source_region: Option<Rect>,
    dest_x: i32,
    dest_y: i32,
) -> Result<(), ImageError> {
    if src.format != dst.format {
        return Err(ImageError::FormatMismatch {
            expected: dst.format,
            found: src.format,
        });
    }

    src.check_addressable()?;

    let Some(mut src_rect) = source_region
        .unwrap_or_else(|| src.bounds())
        .intersect(&src.bounds())
    else {
        return Ok(());
    };

    // A negative destination cuts off the leading pixels of the source.
    let (mut dest_x, mut dest_y) = (i64::from(dest_x), i64::from(dest_y));
    if dest_x < 0 {
        let skip = (-dest_x).min(i64::from(src_rect.width));
        src_rect.x += skip as i32;
        src_rect.width -= skip as u32;
        dest_x = 0;
    }
    if dest_y < 0 {
        let skip = (-dest_y).min(i64::from(src_rect.height));
        src_rect.y += skip as i32;
        src_rect.height -= skip as u32;
        dest_y = 0;
    }

    if src_rect.is_empty() || dest_x > i64::from(i32::MAX) || dest_y > i64::from(i32::MAX) {
        return Ok(());
    }

    let wanted = Rect::new(dest_x as i32, dest_y as i32, src_rect.width, src_rect.height);
    let Some(dst_rect) = wanted.intersect(&dst.bounds()) else {
        return Ok(());
    };

    let rows = src_rect.height.min(dst_rect.height) as usize;
    let line = src.line_bytes(src_rect.width.min(dst_rect.width));
    let (src_pitch, dst_pitch) = (src.pitch.row_pitch(), dst.pitch.row_pitch());

    let full_copy = src_rect == src.bounds()
        && dst_rect == dst.bounds()
        && src.bounds() == dst.bounds()
        && src_pitch == dst_pitch
        && src_data.len() == dst_data.len();

    if full_copy {
        dst_data.copy_from_slice(src_data);
        return Ok(());
    }

    let src_start = src_rect.y as usize * src_pitch + src.line_bytes(src_rect.x as u32);
    let dst_start = dst_rect.y as usize * dst_pitch + dst.line_bytes(dst_rect.x as u32);

    for row in 0..rows {
        let from = src_start + row * src_pitch;
        let to = dst_start + row * dst_pitch;
        dst_data[to..to + line].copy_from_slice(&src_data[from..from + line]);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(format: PixelFormat, width: u32, height: u32, row_pitch: usize) -> ImageBuffer {
        let len = row_pitch * height as usize;
        ImageBuffer {
            format,
            width,
            height,
            depth: 1,
            mip_level: 0,
            array_index: 0,
            depth_slice: 0,
            pitch: PitchLayout::new(row_pitch, len),
            offset: 0,
            len,
            generation: 0,
        }
    }

    #[test]
    fn intersect() {
        let a = Rect::new(-2, -2, 5, 5);
        let b = Rect::with_size(4, 4);
        assert_eq!(a.intersect(&b), Some(Rect::new(0, 0, 3, 3)));
        assert_eq!(b.intersect(&Rect::new(4, 0, 1, 1)), None);
        assert_eq!(b.intersect(&Rect::new(1, 1, 0, 3)), None);
    }

    #[test]
    fn region_keeps_row_pitch() {
        let buffer = descriptor(PixelFormat::R8G8_UNorm, 4, 3, 10);
        let data: Vec<u8> = (0..30).collect();
        let view = BufferRef { buffer, data: &data };

        let region = view.region(Rect::new(1, 1, 8, 8)).unwrap().unwrap();
        assert_eq!(region.buffer().width(), 3);
        assert_eq!(region.buffer().height(), 2);
        assert_eq!(region.buffer().pitch().row_pitch(), 10);
        assert_eq!(region.buffer().pitch().slice_pitch(), 12);
        assert_eq!(region.as_bytes().len(), 10 + 6);
        assert_eq!(region.row(0), Some(&data[12..18]));
        assert_eq!(region.row(1), Some(&data[22..28]));
        assert_eq!(region.row(2), None);

        assert!(view.region(Rect::new(4, 0, 1, 1)).unwrap().is_none());

        let packed = region.to_packed();
        assert_eq!(&*packed, [12, 13, 14, 15, 16, 17, 22, 23, 24, 25, 26, 27]);
        assert!(matches!(view.to_packed(), Cow::Owned(_)));
    }

    #[test]
    fn fill_stays_in_region() {
        let buffer = descriptor(PixelFormat::R8_UNorm, 4, 3, 4);
        let mut data = [0u8; 12];
        let mut view = BufferMut {
            buffer,
            data: &mut data,
        };

        view.region_mut(Rect::new(1, 0, 1, 2)).unwrap().unwrap().fill(0xff);
        assert_eq!(data, [0, 0xff, 0, 0, 0, 0xff, 0, 0, 0, 0, 0, 0]);

        let mut view = BufferMut {
            buffer,
            data: &mut data,
        };
        let mut region = view.region_mut(Rect::new(2, 1, 2, 2)).unwrap().unwrap();
        region.row_texels_mut::<u8>(1).unwrap().fill(7);
        region.fill(3);
        assert_eq!(data, [0, 0xff, 0, 0, 0, 0xff, 3, 3, 0, 0, 3, 3]);
    }

    #[test]
    fn fill_whole_rows_sets_padding() {
        let buffer = descriptor(PixelFormat::R8G8_UNorm, 1, 2, 4);
        let mut data = [0u8; 8];
        BufferMut {
            buffer,
            data: &mut data,
        }
        .fill(5);
        assert_eq!(data, [5; 8]);
    }

    #[test]
    fn region_of_compressed() {
        let buffer = descriptor(PixelFormat::BC1_UNorm, 4, 4, 8);
        let data = [0; 8];
        let view = BufferRef { buffer, data: &data };
        assert!(matches!(
            view.region(Rect::with_size(1, 1)),
            Err(ImageError::UnsupportedOnCompressedData(_))
        ));
    }

    #[test]
    fn copy_mismatched_formats() {
        let src = descriptor(PixelFormat::R8_UNorm, 2, 2, 2);
        let dst = descriptor(PixelFormat::R8_UInt, 2, 2, 2);
        let data = [0; 4];
        let mut target = [0; 4];

        let result = copy_pixels(&src, &data, &dst, &mut target, None, 0, 0);
        assert!(matches!(result, Err(ImageError::FormatMismatch { .. })));
    }

    #[test]
    fn copy_clips_both_sides() {
        let src = descriptor(PixelFormat::R8_UNorm, 3, 3, 4);
        let dst = descriptor(PixelFormat::R8_UNorm, 2, 2, 2);
        let data: Vec<u8> = (1..=12).collect();
        let mut target = [0; 4];

        copy_pixels(&src, &data, &dst, &mut target, None, -1, 1).unwrap();
        // Source column 0 is cut off, only the first source row fits below row 1.
        assert_eq!(target, [0, 0, 2, 3]);
    }

    #[test]
    fn copy_out_of_bounds_is_noop() {
        let src = descriptor(PixelFormat::R8_UNorm, 2, 2, 2);
        let data = [7; 4];
        let mut target = [1, 2, 3, 4];

        copy_pixels(&src, &data, &src, &mut target, None, 2, 0).unwrap();
        copy_pixels(&src, &data, &src, &mut target, None, 0, -2).unwrap();
        copy_pixels(&src, &data, &src, &mut target, Some(Rect::new(5, 5, 1, 1)), 0, 0)
            .unwrap();
        assert_eq!(target, [1, 2, 3, 4]);
    }
}
