use std::sync::{Arc, Mutex};

use image_surface::processor::{
    BlockCodec, CompressionQuality, EncodeOptions, ExpandAnchor, ImageDithering, ImageFilter,
    ImageProcessor, ResizeMode, ResizeRequest,
};
use image_surface::{
    EditOp, Image, ImageBuffer, ImageError, ImageInfo, ImageType, PitchFlags, PixelFormat, Rect,
};

/// Nearest neighbour resampling of the first mip level and a few 8-bit conversions.
#[derive(Default)]
struct Nearest {
    calls: Mutex<Vec<(&'static str, PixelFormat)>>,
    requests: Mutex<Vec<ResizeRequest>>,
    fail: bool,
}

const ROUTES: [(PixelFormat, PixelFormat); 4] = [
    (PixelFormat::R8G8B8A8_UNorm, PixelFormat::B8G8R8A8_UNorm),
    (PixelFormat::B8G8R8A8_UNorm, PixelFormat::R8G8B8A8_UNorm),
    (PixelFormat::R8G8B8A8_UNorm, PixelFormat::R8_UNorm),
    (PixelFormat::B8G8R8A8_UNorm, PixelFormat::R8_UNorm),
];

impl Nearest {
    fn failing() -> Self {
        Nearest {
            fail: true,
            ..Nearest::default()
        }
    }

    fn record(&self, op: &'static str, format: PixelFormat) -> Result<(), ImageError> {
        self.calls.lock().unwrap().push((op, format));
        if self.fail {
            return Err(ImageError::processor("refused by test processor"));
        }
        Ok(())
    }

    fn calls(&self) -> Vec<(&'static str, PixelFormat)> {
        self.calls.lock().unwrap().clone()
    }

    fn requests(&self) -> Vec<ResizeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ImageProcessor for Nearest {
    fn convert_format(
        &self,
        image: &Image,
        format: PixelFormat,
        _: ImageDithering,
        _: bool,
        _: bool,
    ) -> Result<Image, ImageError> {
        self.record("convert", image.format())?;

        let map: fn(&[u8]) -> Vec<u8> = match (image.format(), format) {
            (PixelFormat::R8G8B8A8_UNorm, PixelFormat::B8G8R8A8_UNorm)
            | (PixelFormat::B8G8R8A8_UNorm, PixelFormat::R8G8B8A8_UNorm) => {
                |p: &[u8]| vec![p[2], p[1], p[0], p[3]]
            }
            (PixelFormat::R8G8B8A8_UNorm, PixelFormat::R8_UNorm) => |p: &[u8]| vec![p[0]],
            (PixelFormat::B8G8R8A8_UNorm, PixelFormat::R8_UNorm) => |p: &[u8]| vec![p[2]],
            (from, _) => return Err(ImageError::FormatNotSupported(from)),
        };

        let mut out = Image::new(image.info().with_format(format))?;
        let bpp = image.format_info().size_in_bytes();
        for (src, dst) in image.buffers().iter().zip(descriptors(&out)) {
            let converted: Vec<u8> = image.data(src)?.chunks_exact(bpp).flat_map(map).collect();
            out.data_mut(&dst)?.copy_from_slice(&converted);
        }

        Ok(out)
    }

    fn resize(&self, image: &Image, request: &ResizeRequest) -> Result<Image, ImageError> {
        self.record("resize", image.format())?;
        self.requests.lock().unwrap().push(*request);

        let source = *image.info();
        let info = source
            .with_width(request.width)
            .with_height(request.height)
            .with_depth(request.depth)
            .with_mip_count(request.mip_count);
        let mut out = Image::new(info)?;
        let target = *out.info();
        let bpp = image.format_info().size_in_bytes();

        for index in 0..target.array_or_depth() {
            let from_index = match request.mode {
                ResizeMode::Scale => index * source.array_or_depth() / target.array_or_depth(),
                ResizeMode::Crop | ResizeMode::Expand => index,
            };

            if from_index >= source.array_or_depth() {
                continue;
            }

            let src = image.buffer(0, from_index)?;
            let mut dst = out.buffer_mut(0, index)?;
            for y in 0..target.height {
                for x in 0..target.width {
                    let (sx, sy) = match request.mode {
                        ResizeMode::Crop => (
                            i64::from(x) + i64::from(request.x),
                            i64::from(y) + i64::from(request.y),
                        ),
                        ResizeMode::Expand => (
                            i64::from(x) - i64::from(request.x),
                            i64::from(y) - i64::from(request.y),
                        ),
                        ResizeMode::Scale => (
                            i64::from(x * source.width / target.width),
                            i64::from(y * source.height / target.height),
                        ),
                    };

                    if sx < 0
                        || sy < 0
                        || sx >= i64::from(source.width)
                        || sy >= i64::from(source.height)
                    {
                        continue;
                    }

                    let from = &src.row(sy as u32).unwrap()[sx as usize * bpp..][..bpp];
                    dst.row_mut(y).unwrap()[x as usize * bpp..][..bpp].copy_from_slice(from);
                }
            }
        }

        Ok(out)
    }

    fn generate_mip_images(
        &self,
        image: &mut Image,
        _: ImageFilter,
    ) -> Result<(), ImageError> {
        self.record("mips", image.format())?;
        let info = *image.info();

        for mip in 1..info.mip_count {
            let count = match info.image_type {
                ImageType::Image3D => image.depth_count(mip)?,
                _ => info.array_count,
            };

            for index in 0..count {
                let top_index = match info.image_type {
                    ImageType::Image3D => index << mip,
                    _ => index,
                };

                let (width, height) = {
                    let level = image.buffer(mip, index)?;
                    (level.buffer().width(), level.buffer().height())
                };

                for y in 0..height {
                    for x in 0..width {
                        let value = pixel(image, 0, top_index, x << mip, y << mip);
                        put(image, mip, index, x, y, &value);
                    }
                }
            }
        }

        Ok(())
    }

    fn can_convert(&self, source: PixelFormat, candidates: &[PixelFormat]) -> Vec<PixelFormat> {
        candidates
            .iter()
            .copied()
            .filter(|&target| ROUTES.contains(&(source, target)))
            .collect()
    }
}

/// Every block holds the first byte of the pixels it was encoded from.
struct Solid;

impl BlockCodec for Solid {
    fn decode(
        &self,
        blocks: &[u8],
        width: u32,
        height: u32,
        _: bool,
        _: PixelFormat,
    ) -> Result<Vec<u8>, ImageError> {
        Ok(vec![blocks[0]; width as usize * height as usize * 4])
    }

    fn encode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        _: PixelFormat,
        target: PixelFormat,
        _: &EncodeOptions,
    ) -> Result<Vec<u8>, ImageError> {
        let len = target
            .info()
            .pitch(width, height, PitchFlags::empty())
            .slice_pitch();
        Ok(vec![pixels[0]; len])
    }
}

fn descriptors(image: &Image) -> Vec<ImageBuffer> {
    image.buffers().iter().copied().collect()
}

fn pixel(image: &Image, mip: u32, index: u32, x: u32, y: u32) -> Vec<u8> {
    let bpp = image.format_info().size_in_bytes();
    let buffer = image.buffer(mip, index).unwrap();
    buffer.row(y).unwrap()[x as usize * bpp..][..bpp].to_vec()
}

fn put(image: &mut Image, mip: u32, index: u32, x: u32, y: u32, value: &[u8]) {
    let bpp = value.len();
    let mut buffer = image.buffer_mut(mip, index).unwrap();
    buffer.row_mut(y).unwrap()[x as usize * bpp..][..bpp].copy_from_slice(value);
}

/// A single channel image where the pixel at `(x, y)` holds `x + y * width + 1`.
fn gradient(width: u32, height: u32) -> Image {
    let info = ImageInfo::new(ImageType::Image2D, PixelFormat::R8_UNorm)
        .with_width(width)
        .with_height(height);
    let data: Vec<u8> = (0..width * height).map(|v| (v + 1) as u8).collect();
    Image::with_data(info, &data).unwrap()
}

fn attach(image: &mut Image) -> Arc<Nearest> {
    let processor = Arc::new(Nearest::default());
    image.set_processor(processor.clone());
    processor
}

#[test]
fn crop_takes_a_rectangle() {
    let mut image = gradient(8, 8);
    let processor = attach(&mut image);

    image
        .begin_update()
        .unwrap()
        .crop(Rect::new(2, 2, 4, 4), None)
        .unwrap()
        .end_update(false)
        .unwrap();

    assert_eq!((image.info().width, image.info().height), (4, 4));
    assert_eq!(pixel(&image, 0, 0, 0, 0), [19]);
    assert_eq!(pixel(&image, 0, 0, 3, 3), [46]);

    let requests = processor.requests();
    assert_eq!(requests.len(), 1);
    let request = requests[0];
    assert_eq!(request.mode, ResizeMode::Crop);
    assert_eq!(request.filter, ImageFilter::Point);
    assert_eq!((request.x, request.y), (2, 2));
}

#[test]
fn crop_is_clipped() {
    let mut image = gradient(8, 8);
    attach(&mut image);

    image.begin_update().unwrap();
    image.crop(Rect::new(6, 6, 10, 10), None).unwrap();
    image.end_update(false).unwrap();

    assert_eq!((image.info().width, image.info().height), (2, 2));
    assert_eq!(pixel(&image, 0, 0, 0, 0), [55]);
}

#[test]
fn crop_volume_depth() {
    let info = ImageInfo::new(ImageType::Image3D, PixelFormat::R8_UNorm)
        .with_width(4)
        .with_height(4)
        .with_depth(4);
    let mut image = Image::new(info).unwrap();
    for slice in 0..4 {
        image.buffer_mut(0, slice).unwrap().fill(slice as u8 + 1);
    }
    let processor = attach(&mut image);

    image.begin_update().unwrap();
    image.crop(Rect::with_size(4, 4), Some(2)).unwrap();
    image.end_update(false).unwrap();

    assert_eq!(image.info().depth, 2);
    assert_eq!(processor.requests()[0].depth, 2);
    assert!(image.buffer(0, 1).unwrap().as_bytes().iter().all(|&v| v == 2));
    assert!(image.buffer(0, 2).is_err());
}

#[test]
fn expand_anchors() {
    // Placing 2x2 pixels within 5x3.
    let cases = [
        (ExpandAnchor::UpperLeft, (0, 0)),
        (ExpandAnchor::UpperMiddle, (1, 0)),
        (ExpandAnchor::UpperRight, (3, 0)),
        (ExpandAnchor::MiddleLeft, (0, 0)),
        (ExpandAnchor::Center, (1, 0)),
        (ExpandAnchor::MiddleRight, (3, 0)),
        (ExpandAnchor::BottomLeft, (0, 1)),
        (ExpandAnchor::BottomMiddle, (1, 1)),
        (ExpandAnchor::BottomRight, (3, 1)),
    ];

    for (anchor, (x, y)) in cases {
        let mut image = gradient(2, 2);
        let processor = attach(&mut image);

        image.begin_update().unwrap();
        image.expand(5, 3, None, anchor).unwrap();
        image.end_update(false).unwrap();

        let request = processor.requests()[0];
        assert_eq!(request.mode, ResizeMode::Expand, "{anchor:?}");
        assert_eq!((request.x, request.y), (x as i32, y as i32), "{anchor:?}");

        assert_eq!((image.info().width, image.info().height), (5, 3));
        assert_eq!(pixel(&image, 0, 0, x, y), [1], "{anchor:?}");
        assert_eq!(pixel(&image, 0, 0, x + 1, y + 1), [4], "{anchor:?}");
    }
}

#[test]
fn expand_clears_new_pixels() {
    let mut image = gradient(2, 2);
    attach(&mut image);

    image.begin_update().unwrap();
    image.expand(4, 4, None, ExpandAnchor::Center).unwrap();
    image.end_update(false).unwrap();

    assert_eq!(pixel(&image, 0, 0, 0, 0), [0]);
    assert_eq!(pixel(&image, 0, 0, 1, 1), [1]);
    assert_eq!(pixel(&image, 0, 0, 2, 2), [4]);
    assert_eq!(pixel(&image, 0, 0, 3, 3), [0]);
}

#[test]
fn resize_scales() {
    let mut image = gradient(4, 4);
    let processor = attach(&mut image);

    image.begin_update().unwrap();
    image.resize(2, 2, None, ImageFilter::Linear).unwrap();
    image.end_update(false).unwrap();

    assert_eq!(pixel(&image, 0, 0, 1, 1), [11]);
    let request = processor.requests()[0];
    assert_eq!((request.mode, request.filter), (ResizeMode::Scale, ImageFilter::Linear));
}

#[test]
fn edits_apply_in_order() {
    let mut image = gradient(8, 8);
    let processor = attach(&mut image);

    image.begin_update().unwrap();
    image.crop(Rect::with_size(4, 4), None).unwrap();
    image.resize(2, 2, None, ImageFilter::Point).unwrap();
    assert_eq!(image.pending_edits().len(), 2);
    assert!(processor.calls().is_empty());
    image.end_update(false).unwrap();

    let modes: Vec<_> = processor.requests().iter().map(|r| r.mode).collect();
    assert_eq!(modes, [ResizeMode::Crop, ResizeMode::Scale]);
    assert_eq!((image.info().width, image.info().height), (2, 2));
    assert_eq!(pixel(&image, 0, 0, 1, 1), [19]);
}

#[test]
fn cancel_drops_edits() {
    let mut image = gradient(8, 8);
    let processor = attach(&mut image);

    image.begin_update().unwrap();
    image.crop(Rect::with_size(4, 4), None).unwrap();
    image.end_update(true).unwrap();

    assert!(processor.calls().is_empty());
    assert_eq!(image.info().width, 8);
    assert!(!image.is_editing());
}

#[test]
fn failure_aborts_remaining_edits() {
    let mut image = gradient(8, 8);
    let processor = Arc::new(Nearest::failing());
    image.set_processor(processor.clone());

    image.begin_update().unwrap();
    image.crop(Rect::with_size(4, 4), None).unwrap();
    image.resize(2, 2, None, ImageFilter::Point).unwrap();

    assert!(matches!(image.end_update(false), Err(ImageError::Processor(_))));
    assert_eq!(processor.calls().len(), 1);
    assert_eq!(image.info().width, 8);
    assert!(!image.is_editing());
}

#[test]
fn descriptors_go_stale() {
    let mut image = gradient(8, 8);
    attach(&mut image);
    let old = *image.buffers().get(0, 0).unwrap();
    assert!(image.data(&old).is_ok());

    image.begin_update().unwrap();
    image.crop(Rect::with_size(4, 4), None).unwrap();
    image.end_update(false).unwrap();

    assert!(matches!(image.data(&old), Err(ImageError::StaleBuffer)));
    let current = *image.buffers().get(0, 0).unwrap();
    assert_eq!(image.data(&current).unwrap().len(), 16);
}

#[test]
fn resize_b4g4r4a4_through_rgba() {
    let info = ImageInfo::new(ImageType::Image2D, PixelFormat::B4G4R4A4_UNorm)
        .with_width(2)
        .with_height(2);
    let texels = [0x1111u16, 0xfc31, 0x2222, 0x8421];
    let data: Vec<u8> = texels.iter().flat_map(|t| t.to_le_bytes()).collect();
    let mut image = Image::with_data(info, &data).unwrap();
    let processor = attach(&mut image);

    image.begin_update().unwrap();
    image.crop(Rect::new(1, 0, 1, 2), None).unwrap();
    image.end_update(false).unwrap();

    assert_eq!(processor.calls(), [("resize", PixelFormat::R8G8B8A8_UNorm)]);
    assert_eq!(image.format(), PixelFormat::B4G4R4A4_UNorm);
    assert_eq!(pixel(&image, 0, 0, 0, 0), 0xfc31u16.to_le_bytes());
    assert_eq!(pixel(&image, 0, 0, 0, 1), 0x8421u16.to_le_bytes());
}

#[test]
fn convert_with_processor() {
    let info = ImageInfo::new(ImageType::Image2D, PixelFormat::R8G8B8A8_UNorm);
    let mut image = Image::with_data(info, &[1, 2, 3, 4]).unwrap();
    let processor = attach(&mut image);

    assert!(image.can_convert_to(PixelFormat::B8G8R8A8_UNorm));
    assert!(!image.can_convert_to(PixelFormat::R16_Float));

    image.begin_update().unwrap();
    assert!(matches!(
        image.convert_to_format(PixelFormat::R16_Float, ImageDithering::None),
        Err(ImageError::FormatNotSupported(PixelFormat::R16_Float))
    ));
    image
        .convert_to_format(PixelFormat::B8G8R8A8_UNorm, ImageDithering::ErrorDiffusion)
        .unwrap();
    image.end_update(false).unwrap();

    assert_eq!(image.format(), PixelFormat::B8G8R8A8_UNorm);
    assert_eq!(image.as_bytes(), [3, 2, 1, 4]);
    assert_eq!(processor.calls(), [("convert", PixelFormat::R8G8B8A8_UNorm)]);
}

#[test]
fn convert_b4g4r4a4_through_bgra() {
    let info = ImageInfo::new(ImageType::Image2D, PixelFormat::B4G4R4A4_UNorm);
    let mut image = Image::with_data(info, &0xfc31u16.to_le_bytes()).unwrap();
    let processor = attach(&mut image);

    assert!(image.can_convert_to(PixelFormat::R8_UNorm));

    image.begin_update().unwrap();
    image
        .convert_to_format(PixelFormat::R8_UNorm, ImageDithering::None)
        .unwrap();
    image.end_update(false).unwrap();

    assert_eq!(image.format(), PixelFormat::R8_UNorm);
    assert_eq!(image.as_bytes(), [0xcc]);
    assert_eq!(processor.calls(), [("convert", PixelFormat::B8G8R8A8_UNorm)]);
}

#[test]
fn mip_chain_from_first_level() {
    let mut image = gradient(4, 4);
    let processor = attach(&mut image);

    image.begin_update().unwrap();
    image.generate_mip_maps(0, ImageFilter::Fant).unwrap();
    image.end_update(false).unwrap();

    assert_eq!(image.info().mip_count, 3);
    assert_eq!(image.buffers().len(), 3);
    assert_eq!(pixel(&image, 0, 0, 3, 3), [16]);
    assert_eq!(pixel(&image, 1, 0, 1, 1), [11]);
    assert_eq!(pixel(&image, 2, 0, 0, 0), [1]);
    assert_eq!(processor.calls(), [("mips", PixelFormat::R8_UNorm)]);
}

#[test]
fn mip_chain_of_arrays() {
    let info = ImageInfo::new(ImageType::Image2D, PixelFormat::R8_UNorm)
        .with_width(2)
        .with_height(2)
        .with_array_count(2);
    let mut image = Image::new(info).unwrap();
    image.buffer_mut(0, 0).unwrap().fill(3);
    image.buffer_mut(0, 1).unwrap().fill(5);
    attach(&mut image);

    image.begin_update().unwrap();
    image.generate_mip_maps(8, ImageFilter::Point).unwrap();
    image.end_update(false).unwrap();

    assert_eq!(image.info().mip_count, 2);
    assert_eq!(image.buffer(1, 0).unwrap().as_bytes(), [3]);
    assert_eq!(image.buffer(1, 1).unwrap().as_bytes(), [5]);
}

#[test]
fn compress_and_decompress() {
    let info = ImageInfo::new(ImageType::Image2D, PixelFormat::R8G8B8A8_UNorm)
        .with_width(4)
        .with_height(4);
    let mut image = Image::with_data(info, &[7; 64]).unwrap();
    image.set_codec(Arc::new(Solid));

    image.begin_update().unwrap();
    image
        .compress(PixelFormat::BC1_UNorm, true, CompressionQuality::BestQuality, false)
        .unwrap();
    assert!(matches!(
        image.pending_edits(),
        [EditOp::Compress {
            format: PixelFormat::BC1_UNorm,
            use_bc1_alpha: true,
            ..
        }]
    ));
    assert!(matches!(image.decompress(false), Err(ImageError::AlreadyEditing)));
    image.end_update(false).unwrap();

    assert_eq!(image.format(), PixelFormat::BC1_UNorm);
    assert_eq!(image.size_in_bytes(), 8);
    assert!(image.as_bytes().iter().all(|&v| v == 7));

    image.decompress(false).unwrap();
    assert_eq!(image.format(), PixelFormat::R8G8B8A8_UNorm);
    assert_eq!(image.as_bytes(), [7; 64]);
}

#[test]
fn compress_requires_codec() {
    let info = ImageInfo::new(ImageType::Image2D, PixelFormat::R8G8B8A8_UNorm);
    let mut image = Image::new(info).unwrap();

    image.begin_update().unwrap();
    image
        .compress(PixelFormat::BC3_UNorm, false, CompressionQuality::Fast, true)
        .unwrap();

    assert!(matches!(
        image.end_update(false),
        Err(ImageError::MissingCollaborator("block codec"))
    ));
    assert_eq!(image.format(), PixelFormat::R8G8B8A8_UNorm);
}

#[test]
fn decompress_rejects_uncompressed() {
    let mut image = gradient(2, 2);
    image.set_codec(Arc::new(Solid));
    assert!(matches!(
        image.decompress(false),
        Err(ImageError::FormatNotSupported(PixelFormat::R8_UNorm))
    ));
}
