use sha2::{Digest, Sha256};

use crate::identity::domain::face_identity::FaceIdentity;
use crate::shared::constants::IDENTITY_CANONICAL_SIZE;
use crate::shared::face_image::{EncodingError, FaceImage};

/// Derives a [`FaceIdentity`] from face pixels.
///
/// Pipeline: resample to 100x100 with the canonical bilinear filter, take
/// the row-major RGB bytes, SHA-256 them. Pure, so identities computed on
/// one machine can be typed in as a target on another.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityHasher;

impl IdentityHasher {
    pub fn new() -> Self {
        Self
    }

    pub fn hash(&self, face: &FaceImage) -> Result<FaceIdentity, EncodingError> {
        let canonical = face.canonical(IDENTITY_CANONICAL_SIZE)?;
        let digest = Sha256::digest(canonical.as_raw());
        Ok(FaceIdentity::from_digest(&digest))
    }
}
