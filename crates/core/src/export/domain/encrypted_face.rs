use crate::encryption::encryptor::{DecryptionError, EncryptionError, Encryptor};
use crate::shared::face_image::FaceImage;

const DIMS_LEN: usize = 8;

/// Encrypts a face so that it can be rebuilt without side information.
///
/// Layout:
///
/// ```text
/// width (u32 BE) | height (u32 BE) | token
/// ```
///
/// The token wraps the raw row-major RGB bytes. The dimension prefix is in
/// the clear but bound to the token as associated data, so changing it
/// fails decryption.
pub fn seal(encryptor: &Encryptor, face: &FaceImage) -> Result<Vec<u8>, EncryptionError> {
    let mut dims = [0u8; DIMS_LEN];
    dims[..4].copy_from_slice(&face.width().to_be_bytes());
    dims[4..].copy_from_slice(&face.height().to_be_bytes());

    let token = encryptor.encrypt_bound(face.data(), &dims)?;
    let mut sealed = Vec::with_capacity(DIMS_LEN + token.len());
    sealed.extend_from_slice(&dims);
    sealed.extend_from_slice(&token);
    Ok(sealed)
}

/// Reverses [`seal`].
pub fn open_sealed(encryptor: &Encryptor, sealed: &[u8]) -> Result<FaceImage, DecryptionError> {
    if sealed.len() < DIMS_LEN {
        return Err(DecryptionError::Malformed(sealed.len()));
    }
    let (dims, token) = sealed.split_at(DIMS_LEN);
    let pixels = encryptor.decrypt_bound(token, dims)?;

    let mut w = [0u8; 4];
    let mut h = [0u8; 4];
    w.copy_from_slice(&dims[..4]);
    h.copy_from_slice(&dims[4..]);
    let len = pixels.len();
    FaceImage::new(pixels, u32::from_be_bytes(w), u32::from_be_bytes(h))
        .map_err(|_| DecryptionError::Malformed(len))
}
