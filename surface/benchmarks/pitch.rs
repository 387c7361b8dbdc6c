//! Benchmarks sizing, allocating and copying between buffers.
use brunch::Bench;

use image_surface::{
    calculate_size_in_bytes, Image, ImageError, ImageInfo, ImageType, PitchFlags, PixelFormat,
    Rect,
};

struct Shape {
    image_type: ImageType,
    format: PixelFormat,
    sz: u32,
    array_or_depth: u32,
}

impl Shape {
    fn info(&self) -> ImageInfo {
        let info = ImageInfo::new(self.image_type, self.format)
            .with_width(self.sz)
            .with_height(self.sz)
            .with_mip_count(0);

        match self.image_type {
            ImageType::Image3D => info.with_depth(self.array_or_depth),
            _ => info.with_array_count(self.array_or_depth),
        }
    }

    fn name(&self, what: &str) -> String {
        format!(
            "surface::{what}({:?}, {}, {}, {})",
            self.image_type, self.format, self.sz, self.array_or_depth
        )
    }

    fn size(&self) -> impl FnMut() -> usize {
        let info = self.info().sanitize();
        move || {
            calculate_size_in_bytes(
                info.image_type,
                info.width,
                info.height,
                info.array_or_depth(),
                info.format,
                info.mip_count,
                PitchFlags::empty(),
            )
            .unwrap_or(0)
        }
    }

    fn allocate(&self) -> impl FnMut() -> Image {
        let info = self.info();
        move || Image::new(info).unwrap()
    }

    fn copy(&self) -> Result<impl FnMut(), ImageError> {
        let mut image = Image::new(self.info().with_image_type(ImageType::Image2D))?;
        let source = *image.buffers().get(0, 0)?;
        let dest = *image.buffers().get(0, image.info().array_count - 1)?;
        let half = self.sz / 2;
        let region = Rect::with_size(half, half);

        Ok(move || {
            image
                .copy_within(&source, &dest, Some(region), half as i32 / 2, half as i32 / 2)
                .unwrap()
        })
    }
}

fn main() {
    let shapes = [
        Shape {
            image_type: ImageType::Image2D,
            format: PixelFormat::R8G8B8A8_UNorm,
            sz: 1024,
            array_or_depth: 2,
        },
        Shape {
            image_type: ImageType::ImageCube,
            format: PixelFormat::BC7_UNorm,
            sz: 512,
            array_or_depth: 6,
        },
        Shape {
            image_type: ImageType::Image3D,
            format: PixelFormat::R16G16B16A16_Float,
            sz: 128,
            array_or_depth: 64,
        },
        Shape {
            image_type: ImageType::Image2D,
            format: PixelFormat::NV12,
            sz: 1024,
            array_or_depth: 2,
        },
    ];

    let mut benches = brunch::Benches::default();
    benches.extend(
        shapes
            .iter()
            .map(|shape| Bench::new(shape.name("size")).run(shape.size())),
    );
    benches.extend(
        shapes
            .iter()
            .map(|shape| Bench::new(shape.name("allocate")).run(shape.allocate())),
    );
    benches.extend(
        shapes
            .iter()
            .filter(|shape| shape.image_type != ImageType::Image3D)
            .filter(|shape| !shape.format.info().is_compressed() && !shape.format.info().is_planar())
            .map(|shape| {
                Bench::new(shape.name("copy"))
                    .run(shape.copy().expect("Failed to setup benchmark"))
            }),
    );
    benches.finish();
}
