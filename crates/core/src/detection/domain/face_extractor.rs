use crate::detection::domain::face_detector::{DetectError, FaceDetector};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::face_image::{EncodingError, FaceImage};
use crate::shared::frame::Frame;

/// Outcome of cutting one detected box out of a frame.
pub type ExtractedFace = (BoundingBox, Result<FaceImage, EncodingError>);

/// Turns detector boxes into owned face crops.
///
/// A box that cannot be cropped is reported in place (detection order is
/// kept) so the caller can reject that face and carry on with the rest.
pub struct FaceExtractor {
    detector: Box<dyn FaceDetector>,
}

impl FaceExtractor {
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        Self { detector }
    }

    pub fn extract(&mut self, frame: &Frame) -> Result<Vec<ExtractedFace>, DetectError> {
        let boxes = self.detector.detect(frame)?;
        Ok(boxes
            .into_iter()
            .map(|bbox| {
                let face = FaceImage::crop(frame, &bbox);
                (bbox, face)
            })
            .collect())
    }
}
