use std::time::Instant;

use thiserror::Error;

use crate::detection::domain::face_detector::{DetectError, FaceDetector};
use crate::detection::domain::face_extractor::FaceExtractor;
use crate::identity::domain::face_gallery::{FaceGallery, GalleryEntry};
use crate::identity::domain::face_identity::FaceIdentity;
use crate::identity::domain::identity_hasher::IdentityHasher;
use crate::identity::domain::target_watcher::TargetWatcher;
use crate::identity::infrastructure::mean_difference_matcher::MeanDifferenceMatcher;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::face_image::{EncodingError, FaceImage};
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{Acquisition, FrameSource};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no frame available this tick")]
    AcquisitionUnavailable,
    #[error("face detection failed: {0}")]
    DetectionFailure(#[source] DetectError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// A watched identity was seen in a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertEvent {
    pub frame_index: usize,
    pub bounding_box: BoundingBox,
    pub face: FaceImage,
    pub identity: FaceIdentity,
}

/// Wall-clock time spent in each stage of one frame, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageTimings {
    pub extract_ms: f64,
    pub admit_ms: f64,
    pub hash_ms: f64,
}

/// Everything one processed frame produced.
#[derive(Debug)]
pub struct FrameReport {
    pub frame_index: usize,
    pub faces_detected: usize,
    /// Entries newly added to the gallery, in detection order.
    pub admitted: Vec<GalleryEntry>,
    pub alerts: Vec<AlertEvent>,
    /// Faces dropped because their pixels could not be used.
    pub rejected: Vec<(BoundingBox, EncodingError)>,
    pub gallery_size: usize,
    pub timings: StageTimings,
}

/// Owns the per-session state and runs the per-frame sequence:
/// extract faces, admit each into the gallery, hash it, check it against
/// the target.
///
/// Every face is hashed and checked whether or not it was admitted, so a
/// target that stays in view alerts on every frame it appears in.
pub struct FrameProcessor {
    extractor: FaceExtractor,
    gallery: FaceGallery,
    hasher: IdentityHasher,
    watcher: TargetWatcher,
}

impl FrameProcessor {
    pub fn new(extractor: FaceExtractor, gallery: FaceGallery, hasher: IdentityHasher) -> Self {
        Self {
            extractor,
            gallery,
            hasher,
            watcher: TargetWatcher::new(),
        }
    }

    /// Processor with the pixel-difference matcher at `similarity_threshold`.
    pub fn with_detector(detector: Box<dyn FaceDetector>, similarity_threshold: f64) -> Self {
        let hasher = IdentityHasher::new();
        Self::new(
            FaceExtractor::new(detector),
            FaceGallery::new(
                Box::new(MeanDifferenceMatcher::new(similarity_threshold)),
                hasher,
            ),
            hasher,
        )
    }

    pub fn process(&mut self, frame: &Frame) -> Result<FrameReport, PipelineError> {
        let mut timings = StageTimings::default();

        let t0 = Instant::now();
        let faces = self
            .extractor
            .extract(frame)
            .map_err(PipelineError::DetectionFailure)?;
        timings.extract_ms = elapsed_ms(t0);

        let mut report = FrameReport {
            frame_index: frame.index(),
            faces_detected: faces.len(),
            admitted: Vec::new(),
            alerts: Vec::new(),
            rejected: Vec::new(),
            gallery_size: self.gallery.len(),
            timings,
        };

        for (bbox, face) in faces {
            let outcome = face
                .map_err(PipelineError::from)
                .and_then(|face| self.process_face(frame.index(), bbox, face, &mut report));
            match outcome {
                Ok(()) => {}
                Err(PipelineError::Encoding(e)) => {
                    log::debug!("Rejected face at {bbox:?} in frame {}: {e}", frame.index());
                    report.rejected.push((bbox, e));
                }
                Err(e) => log::warn!("Face at {bbox:?} in frame {}: {e}", frame.index()),
            }
        }

        report.gallery_size = self.gallery.len();
        Ok(report)
    }

    fn process_face(
        &mut self,
        frame_index: usize,
        bbox: BoundingBox,
        face: FaceImage,
        report: &mut FrameReport,
    ) -> Result<(), PipelineError> {
        let t0 = Instant::now();
        let admitted = self.gallery.admit(face.clone())?;
        report.timings.admit_ms += elapsed_ms(t0);

        // Admission already hashed this face
        let identity = match &admitted {
            Some(entry) => entry.identity().clone(),
            None => {
                let t0 = Instant::now();
                let identity = self.hasher.hash(&face)?;
                report.timings.hash_ms += elapsed_ms(t0);
                identity
            }
        };

        if let Some(entry) = admitted {
            report.admitted.push(entry);
        }

        if self.watcher.check(&identity) {
            log::info!("Target {identity} seen in frame {frame_index}");
            report.alerts.push(AlertEvent {
                frame_index,
                bounding_box: bbox,
                face,
                identity,
            });
        }
        Ok(())
    }

    /// Pulls one frame from `source` and processes it.
    ///
    /// `Ok(None)` means the source is exhausted. A tick with no frame is
    /// reported as [`PipelineError::AcquisitionUnavailable`].
    pub fn tick(&mut self, source: &mut dyn FrameSource) -> Result<Option<FrameReport>, PipelineError> {
        match source.acquire() {
            Acquisition::Frame(frame) => self.process(&frame).map(Some),
            Acquisition::Unavailable => Err(PipelineError::AcquisitionUnavailable),
            Acquisition::EndOfStream => Ok(None),
        }
    }

    pub fn set_target(&mut self, target: &str) {
        self.watcher.set_target(target);
    }

    pub fn gallery(&self) -> &FaceGallery {
        &self.gallery
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
