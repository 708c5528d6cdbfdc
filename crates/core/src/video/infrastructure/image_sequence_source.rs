use std::error::Error;
use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{Acquisition, FrameSource};

/// Plays back a single image or a directory of images as a frame stream.
///
/// Directory entries are filtered by extension and sorted by file name.
/// Files are decoded lazily, one per `acquire`.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    frame_index: usize,
}

impl ImageSequenceSource {
    pub fn open(path: &Path) -> Result<Self, Box<dyn Error>> {
        let paths = if path.is_dir() {
            let mut paths: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_image_file(p))
                .collect();
            paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            paths
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(format!("Input not found: {}", path.display()).into());
        };

        if paths.is_empty() {
            log::warn!("No images found in {}", path.display());
        } else {
            log::info!("Opened {} image(s) from {}", paths.len(), path.display());
        }

        Ok(Self {
            paths,
            cursor: 0,
            frame_index: 0,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn decode(&self, path: &Path) -> Result<Frame, Box<dyn Error>> {
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Frame::new(rgb.into_raw(), width, height, self.frame_index)?)
    }
}

impl FrameSource for ImageSequenceSource {
    fn acquire(&mut self) -> Acquisition {
        let Some(path) = self.paths.get(self.cursor).cloned() else {
            return Acquisition::EndOfStream;
        };
        self.cursor += 1;
        match self.decode(&path) {
            Ok(frame) => {
                self.frame_index += 1;
                Acquisition::Frame(frame)
            }
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                Acquisition::Unavailable
            }
        }
    }

    fn close(&mut self) {
        self.cursor = self.paths.len();
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
