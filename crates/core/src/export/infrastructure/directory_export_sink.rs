use std::error::Error;
use std::path::PathBuf;

use crate::export::domain::export_sink::{ExportFormat, ExportSink};

/// Writes `face_<n>.<ext>` files into a directory, creating it on first write.
pub struct DirectoryExportSink {
    dir: PathBuf,
}

impl DirectoryExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_name(index: usize, format: ExportFormat) -> String {
        format!("face_{index}.{}", format.extension())
    }
}

impl ExportSink for DirectoryExportSink {
    fn write(
        &mut self,
        index: usize,
        format: ExportFormat,
        bytes: &[u8],
    ) -> Result<PathBuf, Box<dyn Error>> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(Self::file_name(index, format));
        std::fs::write(&path, bytes)?;
        log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_names() {
        assert_eq!(DirectoryExportSink::file_name(1, ExportFormat::Encrypted), "face_1.enc");
        assert_eq!(DirectoryExportSink::file_name(12, ExportFormat::Jpeg), "face_12.jpg");
    }

    #[test]
    fn test_write_creates_directory_and_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("out");
        let mut sink = DirectoryExportSink::new(&dir);
        let path = sink.write(3, ExportFormat::Encrypted, b"abc").unwrap();
        assert_eq!(path, dir.join("face_3.enc"));
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn test_write_overwrites_existing() {
        let tmp = TempDir::new().unwrap();
        let mut sink = DirectoryExportSink::new(tmp.path());
        sink.write(1, ExportFormat::Jpeg, b"old").unwrap();
        let path = sink.write(1, ExportFormat::Jpeg, b"new").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"new");
    }
}
