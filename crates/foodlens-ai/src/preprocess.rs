//! Upload decoding and the ImageNet-style input transform.
//!
//! The classifier was trained on 224×224 RGB crops, scaled to `[0, 1]` and
//! normalized per channel with the ImageNet mean/std. The tensor layout is
//! NCHW: every red value, then every green, then every blue, row-major.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageError, ImageReader, Limits, RgbImage};

use crate::error::InferenceError;

/// Model input edge length in pixels.
pub const INPUT_SIZE: u32 = 224;

/// Per-channel mean (R, G, B) of the training data, on the `[0, 1]` scale.
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel standard deviation (R, G, B), on the `[0, 1]` scale.
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Largest accepted upload width or height, in pixels.
pub const MAX_DIMENSION: u32 = 8192;

/// Decoder allocation cap: one 8192×8192 RGB8 raster plus headroom.
pub const MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;

const PLANE: usize = (INPUT_SIZE * INPUT_SIZE) as usize;

/// Normalized `(1, 3, 224, 224)` input tensor, stored flat.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
}

impl ImageTensor {
    pub const SHAPE: [usize; 4] = [1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize];

    pub fn shape(&self) -> [usize; 4] {
        Self::SHAPE
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Values of one colour plane (0 = R, 1 = G, 2 = B).
    pub fn channel(&self, c: usize) -> &[f32] {
        &self.data[c * PLANE..(c + 1) * PLANE]
    }
}

/// Decode uploaded bytes into an RGB image.
///
/// The container format is sniffed from the content. Alpha is dropped and
/// greyscale expanded. Images wider or taller than [`MAX_DIMENSION`], or
/// needing more than [`MAX_DECODE_ALLOC`] bytes to decode, are rejected
/// before any pixel buffer is allocated.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, InferenceError> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DIMENSION);
    limits.max_image_height = Some(MAX_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(ImageError::IoError)?;
    reader.limits(limits);
    Ok(reader.decode()?.into_rgb8())
}

/// Resize to 224×224, scale to `[0, 1]`, and normalize with [`MEAN`]/[`STD`].
pub fn preprocess(image: &RgbImage) -> ImageTensor {
    // Triangle is bilinear with an antialiasing footprint when shrinking,
    // which is what the training transform used.
    let resized = if image.dimensions() == (INPUT_SIZE, INPUT_SIZE) {
        image.clone()
    } else {
        imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
    };

    let mut data = vec![0.0f32; 3 * PLANE];
    for (i, pixel) in resized.pixels().enumerate() {
        for c in 0..3 {
            let x = pixel[c] as f32 / 255.0;
            data[c * PLANE + i] = (x - MEAN[c]) / STD[c];
        }
    }

    ImageTensor { data }
}

/// Lowest and highest value a channel can take after normalization.
pub fn channel_bounds(c: usize) -> (f32, f32) {
    ((0.0 - MEAN[c]) / STD[c], (1.0 - MEAN[c]) / STD[c])
}
