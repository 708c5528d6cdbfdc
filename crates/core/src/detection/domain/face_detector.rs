use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

pub type DetectError = Box<dyn std::error::Error + Send + Sync>;

/// Domain interface for face detection.
///
/// Implementations return boxes clamped to the frame and an empty list
/// when nothing is found. They may be stateful, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, DetectError>;
}
