use crate::shared::face_image::{EncodingError, FaceImage};

/// Domain interface for the coarse "same face as before" check.
///
/// Implementations must be symmetric. They need not be transitive, so
/// callers cannot treat similarity as an equivalence relation.
pub trait SimilarityMatcher: Send {
    fn similar(&self, a: &FaceImage, b: &FaceImage) -> Result<bool, EncodingError>;
}
