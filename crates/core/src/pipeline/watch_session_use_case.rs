use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::identity::domain::face_gallery::GalleryEntry;
use crate::pipeline::frame_processor::{AlertEvent, FrameProcessor, FrameReport, PipelineError};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::target_source::TargetSource;
use crate::shared::settings::Settings;
use crate::video::domain::frame_source::FrameSource;

/// Owned values handed to the presentation side of a session.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    FaceAdmitted(GalleryEntry),
    Alert(AlertEvent),
}

/// Counters for a finished session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames_processed: usize,
    pub idle_ticks: usize,
    pub detection_failures: usize,
    pub faces_rejected: usize,
    pub alerts: usize,
    pub gallery_size: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Pause between ticks.
    pub tick_interval: Duration,
    /// Stop after this many consecutive ticks without a frame.
    pub max_idle_ticks: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for SessionConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            tick_interval: settings.tick_interval(),
            max_idle_ticks: settings.max_idle_ticks,
        }
    }
}

/// Drives a [`FrameProcessor`] from a [`FrameSource`] one tick at a time.
///
/// Each tick samples the operator target, pulls at most one frame and
/// processes it. The loop ends when the source is exhausted, the session
/// is cancelled, or too many ticks in a row had no frame. No single
/// frame's failure ends the session.
pub struct WatchSessionUseCase {
    source: Box<dyn FrameSource>,
    processor: FrameProcessor,
    target: Box<dyn TargetSource>,
    logger: Box<dyn PipelineLogger>,
    events: Option<Sender<SessionEvent>>,
    config: SessionConfig,
    on_progress: Option<Box<dyn Fn(usize) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl WatchSessionUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        processor: FrameProcessor,
        target: Box<dyn TargetSource>,
        logger: Box<dyn PipelineLogger>,
        events: Option<Sender<SessionEvent>>,
        config: SessionConfig,
        on_progress: Option<Box<dyn Fn(usize) -> bool + Send>>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source,
            processor,
            target,
            logger,
            events,
            config,
            on_progress,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(&mut self) -> SessionSummary {
        let mut summary = SessionSummary::default();
        let mut consecutive_idle: u64 = 0;
        let mut first = true;

        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                self.logger.info("Session cancelled");
                break;
            }
            if !first && !self.config.tick_interval.is_zero() {
                std::thread::sleep(self.config.tick_interval);
            }
            first = false;

            let target = self.target.sample();
            self.processor.set_target(&target);

            match self.processor.tick(self.source.as_mut()) {
                Ok(Some(report)) => {
                    consecutive_idle = 0;
                    summary.frames_processed += 1;
                    self.record(&report, &mut summary);
                    self.logger.progress(summary.frames_processed);
                    if let Some(cb) = &self.on_progress {
                        if !cb(summary.frames_processed) {
                            self.logger.info("Session stopped by progress callback");
                            break;
                        }
                    }
                }
                Ok(None) => {
                    self.logger.info("Frame source exhausted");
                    break;
                }
                Err(PipelineError::AcquisitionUnavailable) => {
                    self.logger.count("idle_tick");
                    summary.idle_ticks += 1;
                    consecutive_idle += 1;
                    if self
                        .config
                        .max_idle_ticks
                        .is_some_and(|max| consecutive_idle >= max)
                    {
                        self.logger
                            .info(&format!("No frames for {consecutive_idle} ticks, stopping"));
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("Skipping frame: {e}");
                    self.logger.count("detection_failure");
                    summary.detection_failures += 1;
                }
            }
        }

        self.source.close();
        summary.gallery_size = self.processor.gallery().len();
        self.logger.summary();
        summary
    }

    fn record(&mut self, report: &FrameReport, summary: &mut SessionSummary) {
        self.logger.timing("extract", report.timings.extract_ms);
        self.logger.timing("admit", report.timings.admit_ms);
        self.logger.timing("hash", report.timings.hash_ms);
        self.logger
            .metric("faces_per_frame", report.faces_detected as f64);
        self.logger.metric("gallery_size", report.gallery_size as f64);

        for _ in &report.rejected {
            self.logger.count("face_rejected");
        }
        for _ in &report.alerts {
            self.logger.count("alert");
        }
        summary.faces_rejected += report.rejected.len();
        summary.alerts += report.alerts.len();

        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is watching
            for entry in &report.admitted {
                let _ = tx.send(SessionEvent::FaceAdmitted(entry.clone()));
            }
            for alert in &report.alerts {
                let _ = tx.send(SessionEvent::Alert(alert.clone()));
            }
        }
    }

    pub fn processor(&self) -> &FrameProcessor {
        &self.processor
    }
}
