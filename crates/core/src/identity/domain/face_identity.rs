use std::fmt;

/// Hex-encoded SHA-256 of a face's canonical pixels (64 lowercase chars).
///
/// An exact-equality key: unlike the similarity check, two faces share an
/// identity only when their canonical bytes are identical.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceIdentity(String);

impl FaceIdentity {
    pub(crate) fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FaceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for FaceIdentity {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
