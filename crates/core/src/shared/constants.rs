/// Side length faces are resampled to before the similarity check.
pub const SIMILARITY_CANONICAL_SIZE: u32 = 50;

/// Side length faces are resampled to before identity hashing.
pub const IDENTITY_CANONICAL_SIZE: u32 = 100;

/// Mean absolute per-channel difference (0-255 scale) below which two
/// faces count as the same.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 20.0;

/// Pause between ticks of a live session (~33 fps).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 30;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
