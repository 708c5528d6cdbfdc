use std::time::{SystemTime, UNIX_EPOCH};

use aes_gcm_siv::aead::{Aead, Payload};
use aes_gcm_siv::{Aes256GcmSiv, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::encryption::session_key::{KeyGenerationError, SessionKey};

pub const TOKEN_VERSION: u8 = 0x80;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + 8;
const MIN_TOKEN_LEN: usize = HEADER_LEN + NONCE_LEN + TAG_LEN;

#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("could not draw nonce: {0}")]
    Nonce(#[from] rand::Error),
    #[error("cipher failure")]
    Cipher,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecryptionError {
    #[error("token is too short ({0} bytes)")]
    Malformed(usize),
    #[error("unsupported token version 0x{0:02x}")]
    UnsupportedVersion(u8),
    #[error("token failed authentication")]
    Authentication,
}

/// Authenticated symmetric encryption of face exports.
///
/// Token layout:
///
/// ```text
/// 0x80 | issued-at (u64 BE seconds) | nonce (12) | ciphertext + tag (16)
/// ```
///
/// The version byte and timestamp are bound as associated data, together
/// with any caller context, so altering any byte of the token fails
/// decryption.
pub struct Encryptor {
    cipher: Aes256GcmSiv,
}

impl Encryptor {
    pub fn new(key: &SessionKey) -> Self {
        Self {
            cipher: Aes256GcmSiv::new(key.as_bytes().into()),
        }
    }

    /// Encryptor under a freshly generated session key.
    pub fn with_session_key() -> Result<Self, KeyGenerationError> {
        Ok(Self::new(&SessionKey::generate()?))
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        self.encrypt_bound(plaintext, &[])
    }

    /// Like [`Encryptor::encrypt`], but `context` is also authenticated.
    /// It is not stored in the token; the same bytes must be passed to
    /// [`Encryptor::decrypt_bound`].
    pub fn encrypt_bound(
        &self,
        plaintext: &[u8],
        context: &[u8],
    ) -> Result<Vec<u8>, EncryptionError> {
        let issued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.try_fill_bytes(&mut nonce)?;

        let mut token = Vec::with_capacity(MIN_TOKEN_LEN + plaintext.len());
        token.push(TOKEN_VERSION);
        token.extend_from_slice(&issued_at.to_be_bytes());

        let aad = [&token[..HEADER_LEN], context].concat();
        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|_| EncryptionError::Cipher)?;

        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(token)
    }

    pub fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        self.decrypt_bound(token, &[])
    }

    pub fn decrypt_bound(
        &self,
        token: &[u8],
        context: &[u8],
    ) -> Result<Vec<u8>, DecryptionError> {
        if token.len() < MIN_TOKEN_LEN {
            return Err(DecryptionError::Malformed(token.len()));
        }
        if token[0] != TOKEN_VERSION {
            return Err(DecryptionError::UnsupportedVersion(token[0]));
        }
        let (header, rest) = token.split_at(HEADER_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        let aad = [header, context].concat();
        self.cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|_| DecryptionError::Authentication)
    }

    /// Unix seconds recorded in a token's header. Not authenticated on its
    /// own; call [`Encryptor::decrypt`] to verify it.
    pub fn token_issued_at(token: &[u8]) -> Result<u64, DecryptionError> {
        if token.len() < MIN_TOKEN_LEN {
            return Err(DecryptionError::Malformed(token.len()));
        }
        if token[0] != TOKEN_VERSION {
            return Err(DecryptionError::UnsupportedVersion(token[0]));
        }
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&token[1..HEADER_LEN]);
        Ok(u64::from_be_bytes(ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::session_key::SESSION_KEY_LEN;

    fn encryptor(byte: u8) -> Encryptor {
        Encryptor::new(&SessionKey::from_bytes([byte; SESSION_KEY_LEN]))
    }

    #[test]
    fn test_decrypt_recovers_plaintext() {
        let enc = encryptor(1);
        let plaintext: Vec<u8> = (0..=255).collect();
        let token = enc.encrypt(&plaintext).unwrap();
        assert_eq!(enc.decrypt(&token).unwrap(), plaintext);
    }

    #[test]
    fn test_empty_plaintext() {
        let enc = encryptor(2);
        let token = enc.encrypt(&[]).unwrap();
        assert_eq!(token.len(), MIN_TOKEN_LEN);
        assert!(enc.decrypt(&token).unwrap().is_empty());
    }

    #[test]
    fn test_token_layout() {
        let enc = encryptor(3);
        let token = enc.encrypt(b"face").unwrap();
        assert_eq!(token[0], TOKEN_VERSION);
        assert_eq!(token.len(), MIN_TOKEN_LEN + 4);
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        let issued = Encryptor::token_issued_at(&token).unwrap();
        assert!(issued <= now && now - issued < 60);
    }

    #[test]
    fn test_same_plaintext_gives_different_tokens() {
        let enc = encryptor(4);
        assert_ne!(enc.encrypt(b"same").unwrap(), enc.encrypt(b"same").unwrap());
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let token = encryptor(5).encrypt(b"secret").unwrap();
        assert_eq!(
            encryptor(6).decrypt(&token),
            Err(DecryptionError::Authentication)
        );
    }

    #[test]
    fn test_tampering_any_byte_fails() {
        let enc = encryptor(7);
        let token = enc.encrypt(b"tamper me").unwrap();
        // Byte 0 is the version, reported separately
        for i in 1..token.len() {
            let mut bad = token.clone();
            bad[i] ^= 0x01;
            assert_eq!(enc.decrypt(&bad), Err(DecryptionError::Authentication), "byte {i}");
        }
    }

    #[test]
    fn test_bound_context_must_match() {
        let enc = encryptor(10);
        let token = enc.encrypt_bound(b"pixels", b"ctx-a").unwrap();
        assert_eq!(enc.decrypt_bound(&token, b"ctx-a").unwrap(), b"pixels");
        assert_eq!(
            enc.decrypt_bound(&token, b"ctx-b"),
            Err(DecryptionError::Authentication)
        );
        assert_eq!(enc.decrypt(&token), Err(DecryptionError::Authentication));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let enc = encryptor(8);
        let mut token = enc.encrypt(b"x").unwrap();
        token[0] = 0x81;
        assert_eq!(enc.decrypt(&token), Err(DecryptionError::UnsupportedVersion(0x81)));
    }

    #[test]
    fn test_short_token_is_malformed() {
        let enc = encryptor(9);
        assert_eq!(enc.decrypt(&[TOKEN_VERSION; 10]), Err(DecryptionError::Malformed(10)));
        assert_eq!(Encryptor::token_issued_at(&[]), Err(DecryptionError::Malformed(0)));
    }

    #[test]
    fn test_session_keys_are_independent() {
        let a = Encryptor::with_session_key().unwrap();
        let b = Encryptor::with_session_key().unwrap();
        let token = a.encrypt(b"face").unwrap();
        assert!(a.decrypt(&token).is_ok());
        assert!(b.decrypt(&token).is_err());
    }
}
