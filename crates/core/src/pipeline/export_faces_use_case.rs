use std::error::Error;
use std::path::PathBuf;

use thiserror::Error;

use crate::encryption::encryptor::{EncryptionError, Encryptor};
use crate::export::domain::encrypted_face;
use crate::export::domain::export_sink::{ExportFormat, ExportSink};
use crate::identity::domain::face_gallery::GalleryEntry;
use crate::shared::face_image::EncodingError;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("could not encode face {index}: {source}")]
    Encoding {
        index: usize,
        #[source]
        source: EncodingError,
    },
    #[error("could not encrypt face {index}: {source}")]
    Encryption {
        index: usize,
        #[source]
        source: EncryptionError,
    },
    #[error("could not write face {index}: {source}")]
    Sink {
        index: usize,
        #[source]
        source: Box<dyn Error>,
    },
}

/// Writes gallery faces to an [`ExportSink`], optionally encrypted under
/// the session key.
///
/// Plain exports are JPEG. Encrypted exports are sealed with
/// [`encrypted_face::seal`] so that opening them recovers the exact pixels
/// and dimensions.
pub struct ExportFacesUseCase {
    sink: Box<dyn ExportSink>,
    encryptor: Encryptor,
}

impl ExportFacesUseCase {
    pub fn new(sink: Box<dyn ExportSink>, encryptor: Encryptor) -> Self {
        Self { sink, encryptor }
    }

    /// Exports `entries` in order with 1-based indices. Stops at the first
    /// failure. Returns the number of faces written.
    pub fn execute(
        &mut self,
        entries: &[GalleryEntry],
        format: ExportFormat,
    ) -> Result<usize, ExportError> {
        for (i, entry) in entries.iter().enumerate() {
            self.export_single(entry, i + 1, format)?;
        }
        if !entries.is_empty() {
            log::info!("Exported {} face(s) as {format:?}", entries.len());
        }
        Ok(entries.len())
    }

    pub fn export_single(
        &mut self,
        entry: &GalleryEntry,
        index: usize,
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        let bytes = match format {
            ExportFormat::Jpeg => entry
                .face()
                .to_jpeg()
                .map_err(|source| ExportError::Encoding { index, source })?,
            ExportFormat::Encrypted => encrypted_face::seal(&self.encryptor, entry.face())
                .map_err(|source| ExportError::Encryption { index, source })?,
        };
        self.sink
            .write(index, format, &bytes)
            .map_err(|source| ExportError::Sink { index, source })
    }
}
