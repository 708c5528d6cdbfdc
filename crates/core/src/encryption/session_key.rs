use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

pub const SESSION_KEY_LEN: usize = 32;

#[derive(Error, Debug)]
#[error("could not generate session key: {0}")]
pub struct KeyGenerationError(#[from] rand::Error);

/// 256-bit symmetric key for one run of the program.
///
/// Lives only in memory. Nothing encrypted under it can be read once the
/// process exits.
#[derive(Clone)]
pub struct SessionKey([u8; SESSION_KEY_LEN]);

impl SessionKey {
    /// Fresh key from the operating system's secure random source.
    pub fn generate() -> Result<Self, KeyGenerationError> {
        let mut bytes = [0u8; SESSION_KEY_LEN];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; SESSION_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}
