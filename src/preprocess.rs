use std::path::Path;

use anyhow::{Context, Result};
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use ndarray::Array4;
use tract_onnx::prelude::*;

use crate::settings::{CHANNELS, INPUT_SIZE};

/// Reads a file and decodes it as PNG, whatever its extension says.
pub fn load_png<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();
    let buf = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    image::load_from_memory_with_format(&buf, ImageFormat::Png)
        .with_context(|| format!("decoding {} as PNG", path.display()))
}

/// Builds the `[1, 224, 224, 3]` NHWC input, pixel values kept on the 0..=255 scale.
pub fn to_input_tensor(img: &DynamicImage) -> Tensor {
    let (width, height) = img.dimensions();
    let rgb = if (width, height) == (INPUT_SIZE, INPUT_SIZE) {
        img.to_rgb8()
    } else {
        tracing::debug!(width, height, "resizing input to {INPUT_SIZE}x{INPUT_SIZE}");
        img.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
            .to_rgb8()
    };

    let side = INPUT_SIZE as usize;
    let input: Array4<f32> = Array4::from_shape_fn((1, side, side, CHANNELS), |(_, y, x, c)| {
        f32::from(rgb[(x as u32, y as u32)][c])
    });
    input.into_tensor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn keeps_raw_pixel_scale_in_nhwc() {
        let mut img = RgbImage::new(INPUT_SIZE, INPUT_SIZE);
        img.put_pixel(5, 3, Rgb([10, 20, 255]));
        let tensor = to_input_tensor(&DynamicImage::ImageRgb8(img));
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        let view = tensor.to_array_view::<f32>().unwrap();
        assert_eq!(view[[0, 3, 5, 0]], 10.0);
        assert_eq!(view[[0, 3, 5, 1]], 20.0);
        assert_eq!(view[[0, 3, 5, 2]], 255.0);
        assert_eq!(view[[0, 5, 3, 0]], 0.0);
    }

    #[test]
    fn drops_alpha_and_resizes() {
        let img = RgbaImage::from_pixel(32, 48, Rgba([200, 100, 50, 7]));
        let tensor = to_input_tensor(&DynamicImage::ImageRgba8(img));
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        let view = tensor.to_array_view::<f32>().unwrap();
        assert_eq!(view[[0, 100, 100, 0]], 200.0);
        assert_eq!(view[[0, 223, 223, 2]], 50.0);
    }

    #[test]
    fn expands_grayscale_to_three_channels() {
        let mut img = GrayImage::new(INPUT_SIZE, INPUT_SIZE);
        img.put_pixel(9, 4, Luma([137]));
        let tensor = to_input_tensor(&DynamicImage::ImageLuma8(img));
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        let view = tensor.to_array_view::<f32>().unwrap();
        for c in 0..CHANNELS {
            assert_eq!(view[[0, 4, 9, c]], 137.0);
            assert_eq!(view[[0, 0, 0, c]], 0.0);
        }
    }

    #[test]
    fn decodes_png_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picture.bin");
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        let img = load_png(&path).unwrap();
        assert_eq!(img.dimensions(), (4, 4));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_png("does/not/exist.png").unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.png"));
    }
}
