// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
//! Deferred editing of an image.
//!
//! Edits are recorded between [`Image::begin_update`] and [`Image::end_update`] and then applied
//! in the order they were recorded. Arguments are checked when an edit is recorded, the pixel work
//! happens only when the update ends. Each step that resamples or converts replaces the data of
//! the image, so descriptors obtained before the update are stale afterwards.
use image_format::{PitchFlags, PixelFormat};
use tracing::{debug, trace, warn};

use crate::buf::Store;
use crate::buffer::{BufferMut, BufferRef, Rect};
use crate::convert;
use crate::error::ImageError;
use crate::image::{fill_from, Image};
use crate::info::{calculate_max_mip_count, ImageType};
use crate::layout::BufferList;
use crate::processor::{
    CompressionQuality, EncodeOptions, ExpandAnchor, ImageDithering, ImageFilter, ResizeMode,
    ResizeRequest,
};

/// One recorded edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditOp {
    /// Keep the pixels within a rectangle, and for volumes the first `depth` slices.
    Crop { rect: Rect, depth: Option<u32> },
    /// Resample to a new size.
    Resize {
        width: u32,
        height: u32,
        depth: Option<u32>,
        filter: ImageFilter,
    },
    /// Grow the image, placing the existing pixels by an anchor.
    Expand {
        width: u32,
        height: u32,
        depth: Option<u32>,
        anchor: ExpandAnchor,
    },
    ConvertFormat {
        format: PixelFormat,
        dithering: ImageDithering,
    },
    PremultiplyAlpha,
    UnpremultiplyAlpha,
    /// Rebuild the mip chain from the first level. A count of zero requests the full chain.
    GenerateMipMaps { mip_count: u32, filter: ImageFilter },
    /// Block compress every buffer. Nothing can be recorded after this.
    Compress {
        format: PixelFormat,
        use_bc1_alpha: bool,
        quality: CompressionQuality,
        multithreaded: bool,
    },
}

impl Image {
    /// Start recording edits.
    pub fn begin_update(&mut self) -> Result<&mut Self, ImageError> {
        if self.pending.is_some() {
            return Err(ImageError::AlreadyEditing);
        }

        self.pending = Some(Vec::new());
        Ok(self)
    }

    /// Whether an update is in progress.
    pub fn is_editing(&self) -> bool {
        self.pending.is_some()
    }

    /// The edits recorded so far, empty when no update is in progress.
    pub fn pending_edits(&self) -> &[EditOp] {
        self.pending.as_deref().unwrap_or_default()
    }

    /// Finish an update.
    ///
    /// With `cancel` the recorded edits are dropped. Otherwise they are applied in order and the
    /// first failing edit aborts the remaining ones. Either way the image is no longer editing
    /// afterwards, and edits applied before a failure are kept.
    pub fn end_update(&mut self, cancel: bool) -> Result<&mut Self, ImageError> {
        let plan = self.pending.take().ok_or(ImageError::NotEditing)?;

        if cancel {
            if !plan.is_empty() {
                warn!(dropped = plan.len(), "update cancelled with pending edits");
            }
            return Ok(self);
        }

        debug!(steps = plan.len(), format = %self.format(), "applying image edits");
        for op in plan {
            trace!(?op, "applying edit");
            self.apply(op)?;
        }

        Ok(self)
    }

    /// Record a crop to a rectangle.
    ///
    /// The rectangle is clipped to the image when applied. The depth is only used by volumes, and
    /// can only shrink them.
    pub fn crop(&mut self, rect: Rect, depth: Option<u32>) -> Result<&mut Self, ImageError> {
        self.check_recording()?;
        self.check_editable()?;

        if rect.is_empty() {
            return Err(ImageError::InvalidArgument {
                name: "rect",
                reason: "must not be empty",
            });
        }

        self.check_depth(depth)?;
        self.record(EditOp::Crop { rect, depth })
    }

    /// Record resampling to a new size.
    ///
    /// The height of 1D images and the depth of anything but volumes stays unchanged.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        depth: Option<u32>,
        filter: ImageFilter,
    ) -> Result<&mut Self, ImageError> {
        self.check_recording()?;
        self.check_editable()?;

        if width < 1 {
            return Err(ImageError::InvalidArgument {
                name: "width",
                reason: "must be at least one",
            });
        }

        if height < 1 && self.info.image_type != ImageType::Image1D {
            return Err(ImageError::InvalidArgument {
                name: "height",
                reason: "must be at least one",
            });
        }

        self.check_depth(depth)?;
        self.record(EditOp::Resize {
            width,
            height,
            depth,
            filter,
        })
    }

    /// Record growing the image to a new size.
    ///
    /// Sizes smaller than the current ones are ignored. The new area is cleared.
    pub fn expand(
        &mut self,
        width: u32,
        height: u32,
        depth: Option<u32>,
        anchor: ExpandAnchor,
    ) -> Result<&mut Self, ImageError> {
        self.check_recording()?;
        self.check_editable()?;
        self.record(EditOp::Expand {
            width,
            height,
            depth,
            anchor,
        })
    }

    /// Record a conversion of the pixel format.
    pub fn convert_to_format(
        &mut self,
        format: PixelFormat,
        dithering: ImageDithering,
    ) -> Result<&mut Self, ImageError> {
        self.check_recording()?;
        self.check_editable()?;

        if format == PixelFormat::Unknown {
            return Err(ImageError::FormatNotSupported(format));
        }

        let planned = self.planned_format();
        if planned != self.format() {
            // Whether an intermediate format converts onward is only known when applied.
            let direct = planned == format
                || (planned == PixelFormat::B4G4R4A4_UNorm && convert::is_wide_format(format))
                || (format == PixelFormat::B4G4R4A4_UNorm && convert::is_wide_format(planned));
            if !direct {
                self.processor()?;
            }
        } else if !self.can_convert_to(format) {
            return Err(match self.processor {
                None => ImageError::MissingCollaborator("image processor"),
                Some(_) => ImageError::FormatNotSupported(format),
            });
        }

        self.record(EditOp::ConvertFormat { format, dithering })
    }

    /// Record multiplying color with alpha.
    ///
    /// Formats without alpha are left unchanged.
    pub fn convert_to_premultiplied_alpha(&mut self) -> Result<&mut Self, ImageError> {
        self.check_alpha()?;
        self.record(EditOp::PremultiplyAlpha)
    }

    /// Record dividing color by alpha.
    pub fn convert_from_premultiplied_alpha(&mut self) -> Result<&mut Self, ImageError> {
        self.check_alpha()?;
        self.record(EditOp::UnpremultiplyAlpha)
    }

    /// Record rebuilding the mip chain from the first level.
    ///
    /// Zero, or a count beyond the longest chain, requests the longest chain. A count below two
    /// leaves the image unchanged.
    pub fn generate_mip_maps(
        &mut self,
        mip_count: u32,
        filter: ImageFilter,
    ) -> Result<&mut Self, ImageError> {
        self.check_recording()?;
        self.check_editable()?;
        self.record(EditOp::GenerateMipMaps { mip_count, filter })
    }

    /// Record block compression into a format.
    ///
    /// This has to be the last edit of an update.
    pub fn compress(
        &mut self,
        format: PixelFormat,
        use_bc1_alpha: bool,
        quality: CompressionQuality,
        multithreaded: bool,
    ) -> Result<&mut Self, ImageError> {
        self.check_recording()?;

        let target = format.info();
        if !target.is_compressed() {
            return Err(ImageError::InvalidArgument {
                name: "format",
                reason: "is not a block compressed format",
            });
        }

        if target.is_typeless() {
            return Err(ImageError::InvalidArgument {
                name: "format",
                reason: "is typeless",
            });
        }

        if target.group() == PixelFormat::BC6H_Typeless {
            return Err(ImageError::InvalidArgument {
                name: "format",
                reason: "BC6H compression is not supported",
            });
        }

        self.check_editable()?;
        self.record(EditOp::Compress {
            format,
            use_bc1_alpha,
            quality,
            multithreaded,
        })
    }

    fn record(&mut self, op: EditOp) -> Result<&mut Self, ImageError> {
        let pending = self.pending.as_mut().ok_or(ImageError::NotEditing)?;
        trace!(?op, queued = pending.len(), "recorded edit");
        pending.push(op);
        Ok(self)
    }

    fn check_recording(&self) -> Result<(), ImageError> {
        match self.pending.as_deref() {
            None => Err(ImageError::NotEditing),
            Some([.., EditOp::Compress { .. }]) => Err(ImageError::InvalidArgument {
                name: "edit",
                reason: "can not follow block compression",
            }),
            Some(_) => Ok(()),
        }
    }

    /// The format after all recorded conversions.
    fn planned_format(&self) -> PixelFormat {
        self.pending_edits()
            .iter()
            .rev()
            .find_map(|op| match op {
                EditOp::ConvertFormat { format, .. } => Some(*format),
                _ => None,
            })
            .unwrap_or(self.info.format)
    }

    /// Generic edits need uncompressed data with a known type.
    fn check_editable(&self) -> Result<(), ImageError> {
        let format = self.planned_format();
        let info = format.info();

        if info.is_compressed() || info.is_typeless() {
            return Err(ImageError::UnsupportedOnCompressedData(format));
        }

        Ok(())
    }

    fn check_depth(&self, depth: Option<u32>) -> Result<(), ImageError> {
        if self.info.image_type == ImageType::Image3D && depth == Some(0) {
            return Err(ImageError::InvalidArgument {
                name: "depth",
                reason: "must be at least one",
            });
        }

        Ok(())
    }

    fn check_alpha(&self) -> Result<(), ImageError> {
        self.check_recording()?;
        self.check_editable()?;

        let format = self.planned_format();
        if !convert::supports_premultiply(format) {
            return Err(ImageError::FormatNotSupported(format));
        }

        Ok(())
    }

    fn apply(&mut self, op: EditOp) -> Result<(), ImageError> {
        match op {
            EditOp::Crop { rect, depth } => self.apply_crop(rect, depth),
            EditOp::Resize {
                width,
                height,
                depth,
                filter,
            } => self.apply_resize(width, height, depth, filter),
            EditOp::Expand {
                width,
                height,
                depth,
                anchor,
            } => self.apply_expand(width, height, depth, anchor),
            EditOp::ConvertFormat { format, dithering } => self.apply_convert(format, dithering),
            EditOp::PremultiplyAlpha => self.apply_alpha(true),
            EditOp::UnpremultiplyAlpha => self.apply_alpha(false),
            EditOp::GenerateMipMaps { mip_count, filter } => self.apply_mip_maps(mip_count, filter),
            EditOp::Compress {
                format,
                use_bc1_alpha,
                quality,
                multithreaded,
            } => self.apply_compress(
                format,
                EncodeOptions {
                    use_bc1_alpha,
                    quality,
                    multithreaded,
                },
            ),
        }
    }

    fn apply_crop(&mut self, rect: Rect, depth: Option<u32>) -> Result<(), ImageError> {
        self.check_editable()?;
        let info = self.info;

        let (rect, depth) = match info.image_type {
            ImageType::Image1D => (Rect::new(rect.x, 0, rect.width, info.height), info.depth),
            ImageType::Image2D | ImageType::ImageCube => (rect, info.depth),
            ImageType::Image3D => (rect, depth.unwrap_or(info.depth).clamp(1, info.depth)),
        };

        let bounds = Rect::with_size(info.width, info.height);
        let clip = rect.intersect(&bounds).ok_or(ImageError::InvalidArgument {
            name: "rect",
            reason: "lies outside of the image",
        })?;

        if clip == bounds && depth == info.depth {
            return Ok(());
        }

        self.resize_with(&ResizeRequest {
            x: clip.x,
            y: clip.y,
            width: clip.width,
            height: clip.height,
            depth,
            mip_count: calculate_max_mip_count(clip.width, clip.height, depth).min(info.mip_count),
            filter: ImageFilter::Point,
            mode: ResizeMode::Crop,
        })
    }

    fn apply_resize(
        &mut self,
        width: u32,
        height: u32,
        depth: Option<u32>,
        filter: ImageFilter,
    ) -> Result<(), ImageError> {
        self.check_editable()?;
        let info = self.info;

        let (height, depth) = match info.image_type {
            ImageType::Image1D => (info.height, info.depth),
            ImageType::Image2D | ImageType::ImageCube => (height, info.depth),
            ImageType::Image3D => (height, depth.unwrap_or(info.depth).max(1)),
        };

        if width == info.width && height == info.height && depth == info.depth {
            return Ok(());
        }

        self.resize_with(&ResizeRequest {
            x: 0,
            y: 0,
            width,
            height,
            depth,
            mip_count: calculate_max_mip_count(width, height, depth).min(info.mip_count),
            filter,
            mode: ResizeMode::Scale,
        })
    }

    fn apply_expand(
        &mut self,
        width: u32,
        height: u32,
        depth: Option<u32>,
        anchor: ExpandAnchor,
    ) -> Result<(), ImageError> {
        self.check_editable()?;
        let info = self.info;

        let width = width.max(info.width);
        let (height, depth) = match info.image_type {
            ImageType::Image1D => (info.height, info.depth),
            ImageType::Image2D | ImageType::ImageCube => (height.max(info.height), info.depth),
            ImageType::Image3D => (
                height.max(info.height),
                depth.unwrap_or(info.depth).max(info.depth),
            ),
        };

        if width == info.width && height == info.height && depth == info.depth {
            return Ok(());
        }

        // The new size is never smaller, none of these underflow.
        let center = (width / 2 - info.width / 2, height / 2 - info.height / 2);
        let far = (width - info.width, height - info.height);

        let (x, y) = match anchor {
            ExpandAnchor::UpperLeft => (0, 0),
            ExpandAnchor::UpperMiddle => (center.0, 0),
            ExpandAnchor::UpperRight => (far.0, 0),
            ExpandAnchor::MiddleLeft => (0, center.1),
            ExpandAnchor::Center => center,
            ExpandAnchor::MiddleRight => (far.0, center.1),
            ExpandAnchor::BottomLeft => (0, far.1),
            ExpandAnchor::BottomMiddle => (center.0, far.1),
            ExpandAnchor::BottomRight => far,
        };

        self.resize_with(&ResizeRequest {
            x: offset(x)?,
            y: offset(y)?,
            width,
            height,
            depth,
            mip_count: calculate_max_mip_count(width, height, depth).min(info.mip_count),
            filter: ImageFilter::Point,
            mode: ResizeMode::Expand,
        })
    }

    fn resize_with(&mut self, request: &ResizeRequest) -> Result<(), ImageError> {
        let processor = self.processor()?;
        debug!(
            mode = ?request.mode,
            width = request.width,
            height = request.height,
            depth = request.depth,
            "resizing image"
        );

        let resized = self.through_wide_format(|image| processor.resize(image, request))?;
        if resized.format() != self.format() {
            return Err(ImageError::FormatMismatch {
                expected: self.format(),
                found: resized.format(),
            });
        }

        self.replace_with(resized);
        Ok(())
    }

    /// Run a processor operation, widening `B4G4R4A4_UNorm` data around it.
    fn through_wide_format(
        &self,
        op: impl FnOnce(&Image) -> Result<Image, ImageError>,
    ) -> Result<Image, ImageError> {
        if self.format() != PixelFormat::B4G4R4A4_UNorm {
            return op(self);
        }

        let wide = self.widened(PixelFormat::R8G8B8A8_UNorm)?;
        op(&wide)?.narrowed()
    }

    /// A copy of `B4G4R4A4_UNorm` data in an 8-bit four channel format.
    fn widened(&self, format: PixelFormat) -> Result<Image, ImageError> {
        let mut wide = Image::new(self.info.with_format(format))?;

        for (src, dst) in self.buffers.iter().zip(wide.buffers.iter()) {
            let from = BufferRef::new(*src, self.store.as_bytes());
            let mut to = BufferMut::new(*dst, wide.store.as_bytes_mut());
            convert::widen_b4g4r4a4(&from, &mut to)?;
        }

        Ok(wide)
    }

    /// A copy of 8-bit four channel data in `B4G4R4A4_UNorm`.
    fn narrowed(&self) -> Result<Image, ImageError> {
        let mut narrow = Image::new(self.info.with_format(PixelFormat::B4G4R4A4_UNorm))?;

        for (src, dst) in self.buffers.iter().zip(narrow.buffers.iter()) {
            let from = BufferRef::new(*src, self.store.as_bytes());
            let mut to = BufferMut::new(*dst, narrow.store.as_bytes_mut());
            convert::narrow_to_b4g4r4a4(&from, &mut to)?;
        }

        Ok(narrow)
    }

    fn apply_convert(
        &mut self,
        format: PixelFormat,
        dithering: ImageDithering,
    ) -> Result<(), ImageError> {
        self.check_editable()?;
        let current = self.format();

        if format == current {
            return Ok(());
        }

        debug!(from = %current, to = %format, "converting image");

        if format == PixelFormat::B4G4R4A4_UNorm {
            let narrowed = if convert::is_wide_format(current) {
                self.narrowed()?
            } else {
                self.processor_convert(PixelFormat::B8G8R8A8_UNorm, dithering)?
                    .narrowed()?
            };

            self.replace_with(narrowed);
            return Ok(());
        }

        if current == PixelFormat::B4G4R4A4_UNorm {
            let intermediate = convert::wide_intermediate(format);
            let wide = self.widened(intermediate)?;
            self.replace_with(wide);

            if intermediate != format {
                let converted = self.processor_convert(format, ImageDithering::None)?;
                self.replace_with(converted);
            }

            return Ok(());
        }

        let converted = self.processor_convert(format, dithering)?;
        self.replace_with(converted);
        Ok(())
    }

    fn processor_convert(
        &self,
        format: PixelFormat,
        dithering: ImageDithering,
    ) -> Result<Image, ImageError> {
        let processor = self.processor()?;
        let converted = processor.convert_format(
            self,
            format,
            dithering,
            self.format_info.is_srgb(),
            format.info().is_srgb(),
        )?;

        if converted.format() != format {
            return Err(ImageError::FormatMismatch {
                expected: format,
                found: converted.format(),
            });
        }

        Ok(converted)
    }

    fn apply_alpha(&mut self, multiply: bool) -> Result<(), ImageError> {
        self.check_editable()?;

        if !self.format_info.has_alpha() || self.info.has_premultiplied_alpha == multiply {
            return Ok(());
        }

        let bytes = self.store.as_bytes_mut();
        for buffer in self.buffers.iter() {
            let mut view = BufferMut::new(*buffer, &mut *bytes);
            if multiply {
                convert::premultiply(&mut view)?;
            } else {
                convert::unpremultiply(&mut view)?;
            }
        }

        self.info.has_premultiplied_alpha = multiply;
        Ok(())
    }

    fn apply_mip_maps(&mut self, mip_count: u32, filter: ImageFilter) -> Result<(), ImageError> {
        self.check_editable()?;
        let info = self.info;

        let max = calculate_max_mip_count(info.width, info.height, info.depth);
        let mip_count = match mip_count {
            0 => max,
            count => count.min(max),
        };

        if mip_count < 2 {
            return Ok(());
        }

        let processor = self.processor()?;
        let mut chain = Image::new(info.with_mip_count(mip_count))?;
        for index in 0..info.array_or_depth() {
            let src = self.buffer(0, index)?;
            chain.buffer_mut(0, index)?.as_bytes_mut().copy_from_slice(src.as_bytes());
        }

        debug!(levels = mip_count, ?filter, "generating mip maps");

        let chain = if chain.format() == PixelFormat::B4G4R4A4_UNorm {
            let mut wide = chain.widened(PixelFormat::R8G8B8A8_UNorm)?;
            processor.generate_mip_images(&mut wide, filter)?;
            wide.narrowed()?
        } else {
            processor.generate_mip_images(&mut chain, filter)?;
            chain
        };

        self.replace_with(chain);
        Ok(())
    }

    fn apply_compress(
        &mut self,
        format: PixelFormat,
        options: EncodeOptions,
    ) -> Result<(), ImageError> {
        self.check_editable()?;
        let codec = self.codec()?;

        let group = self.format_info.group();
        let converted;
        let source = if group != PixelFormat::R8G8B8A8_Typeless
            && group != PixelFormat::B8G8R8A8_Typeless
            && self.can_convert_to(PixelFormat::R8G8B8A8_UNorm)
        {
            let mut rgba = self.clone();
            rgba.apply_convert(PixelFormat::R8G8B8A8_UNorm, ImageDithering::None)?;
            converted = rgba;
            &converted
        } else {
            &*self
        };

        let info = source.info.with_format(format);
        let mut store = Store::new(info.size_in_bytes(PitchFlags::empty())?);
        let blocks = BufferList::new(&info, store.generation());

        debug!(from = %source.format(), to = %format, ?options, "compressing image");

        for (src, dst) in source.buffers.iter().zip(blocks.iter()) {
            let pixels = BufferRef::new(*src, source.store.as_bytes()).to_packed();
            let encoded =
                codec.encode(&pixels, src.width, src.height, src.format, format, &options)?;
            let mut out = BufferMut::new(*dst, store.as_bytes_mut());
            fill_from(&mut out, &encoded)?;
        }

        self.adopt(info, store);
        Ok(())
    }
}

fn offset(value: u32) -> Result<i32, ImageError> {
    i32::try_from(value).map_err(|_| ImageError::InvalidArgument {
        name: "size",
        reason: "exceeds the addressable range",
    })
}
