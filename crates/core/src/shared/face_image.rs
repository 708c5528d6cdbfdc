use std::path::Path;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageBuffer, Rgb, RgbImage};
use ndarray::s;
use thiserror::Error;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::{Frame, CHANNELS};

const JPEG_QUALITY: u8 = 95;

/// Resampling filter used for every canonical resize.
///
/// Bilinear. Changing it changes every identity hash ever produced.
pub const CANONICAL_FILTER: FilterType = FilterType::Triangle;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("face region {0:?} does not overlap the frame")]
    EmptyRegion(BoundingBox),
    #[error("image has zero width or height ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("image codec failed: {0}")]
    Codec(#[from] image::ImageError),
}

/// An owned RGB face crop.
///
/// Pixels are shared behind an `Arc` and never mutated, so clones are
/// cheap and a crop outlives the frame it was cut from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceImage {
    data: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl FaceImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self, EncodingError> {
        if width == 0 || height == 0 {
            return Err(EncodingError::ZeroSize { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(EncodingError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: data.into(),
            width,
            height,
        })
    }

    /// Deep-copies the pixels under `bbox` out of `frame`.
    ///
    /// The box is clamped to the frame first; a box with no overlap is
    /// rejected rather than producing an empty crop.
    pub fn crop(frame: &Frame, bbox: &BoundingBox) -> Result<Self, EncodingError> {
        let clamped = bbox
            .clamp_to(frame.width(), frame.height())
            .ok_or(EncodingError::EmptyRegion(*bbox))?;

        let x = clamped.x as usize;
        let y = clamped.y as usize;
        let w = clamped.width as usize;
        let h = clamped.height as usize;

        let pixels: Vec<u8> = frame
            .as_ndarray()
            .slice(s![y..y + h, x..x + w, ..])
            .iter()
            .copied()
            .collect();

        Self::new(pixels, clamped.width, clamped.height)
    }

    /// Decodes an image file (any format the `image` crate reads) as a face.
    pub fn open(path: &Path) -> Result<Self, EncodingError> {
        Self::from_rgb_image(image::open(path)?.to_rgb8())
    }

    pub fn from_rgb_image(image: RgbImage) -> Result<Self, EncodingError> {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height)
    }

    /// Raw row-major RGB bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resamples the face to `size` x `size` with [`CANONICAL_FILTER`].
    pub fn canonical(&self, size: u32) -> Result<RgbImage, EncodingError> {
        let view: ImageBuffer<Rgb<u8>, &[u8]> =
            ImageBuffer::from_raw(self.width, self.height, &self.data[..]).ok_or(
                EncodingError::BufferSize {
                    expected: self.width as usize * self.height as usize * CHANNELS,
                    actual: self.data.len(),
                },
            )?;
        Ok(imageops::resize(&view, size, size, CANONICAL_FILTER))
    }

    pub fn to_jpeg(&self) -> Result<Vec<u8>, EncodingError> {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).encode(
            &self.data,
            self.width,
            self.height,
            ExtendedColorType::Rgb8,
        )?;
        Ok(bytes)
    }
}
