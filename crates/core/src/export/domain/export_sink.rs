use std::error::Error;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How gallery faces are written out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JPEG-encoded face crop.
    #[default]
    Jpeg,
    /// Session-key token over the raw RGB bytes.
    Encrypted,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Encrypted => "enc",
        }
    }
}

/// Destination for exported faces. The sink owns naming and storage.
pub trait ExportSink {
    /// Persist one face. `index` is 1-based. Returns where it was written.
    fn write(
        &mut self,
        index: usize,
        format: ExportFormat,
        bytes: &[u8],
    ) -> Result<PathBuf, Box<dyn Error>>;
}
