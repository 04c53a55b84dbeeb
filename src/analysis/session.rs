use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{AnalysisResult, AnalysisService, VisionType};
use crate::error::{Error, Result};
use crate::math::LiveContrastChecker;

/// Lifecycle of the current analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Submitting => "submitting",
            SessionState::Succeeded => "succeeded",
            SessionState::Failed => "failed",
        }
    }
}

/// Where the selected image's bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Bytes already handed over by the host (e.g. a browser `File`).
    Memory(Vec<u8>),
    /// A file on disk, read on demand.
    File(PathBuf),
}

impl ImageSource {
    /// Scoped read of the full image. The bytes are complete when this resolves.
    pub async fn read(&self) -> Result<Vec<u8>> {
        match self {
            ImageSource::Memory(bytes) => Ok(bytes.clone()),
            ImageSource::File(path) => tokio::fs::read(path).await.map_err(Error::ImageReadFailed),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage {
    pub name: String,
    pub source: ImageSource,
}

impl SelectedImage {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: ImageSource::Memory(bytes),
        }
    }

    /// The display name is the file name component of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            source: ImageSource::File(path),
        }
    }
}

/// Everything a submission needs, captured when it starts.
///
/// The generation ties the eventual response back to the session state that
/// produced it; see [`Session::complete`].
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    generation: u64,
    image: SelectedImage,
    vision_type: VisionType,
}

impl SubmissionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn vision_type(&self) -> VisionType {
        self.vision_type
    }

    /// Read the image and perform the single round trip. Never touches the session.
    pub async fn run(&self, service: &dyn AnalysisService) -> Attempt {
        let bytes = match self.image.source.read().await {
            Ok(bytes) => bytes,
            Err(err) => {
                return Attempt {
                    outcome: Err(err),
                    elapsed: Duration::ZERO,
                }
            }
        };

        let start = Instant::now();
        let outcome = service
            .analyze(&self.image.name, bytes, self.vision_type)
            .await;
        let elapsed = start.elapsed();

        info!(
            generation = self.generation,
            vision_type = %self.vision_type,
            elapsed_seconds = round_seconds(elapsed),
            ok = outcome.is_ok(),
            "analysis round trip finished"
        );

        Attempt { outcome, elapsed }
    }
}

/// Outcome of one round trip, with its wall-clock duration.
#[derive(Debug)]
pub struct Attempt {
    pub outcome: Result<AnalysisResult>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response was stored in the session.
    Applied,
    /// A newer submission or image selection happened first; the response was dropped.
    Superseded,
}

/// Mutable aggregate behind one analyzer page.
///
/// Only user events (image selection, vision type, colors) and
/// [`Session::complete`] mutate it. The report composer only reads it.
#[derive(Debug, Default)]
pub struct Session {
    selected_image: Option<SelectedImage>,
    vision_type: VisionType,
    checker: LiveContrastChecker,
    current_result: Option<AnalysisResult>,
    elapsed_seconds: Option<f64>,
    state: SessionState,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a new image. Drops any result and duration and returns to `Idle`.
    /// A submission still in flight will find its ticket stale.
    pub fn select_image(&mut self, image: SelectedImage) {
        debug!(name = %image.name, "image selected");
        self.selected_image = Some(image);
        self.current_result = None;
        self.elapsed_seconds = None;
        self.state = SessionState::Idle;
        self.generation += 1;
    }

    pub fn selected_image(&self) -> Option<&SelectedImage> {
        self.selected_image.as_ref()
    }

    pub fn image_name(&self) -> &str {
        self.selected_image.as_ref().map_or("", |i| i.name.as_str())
    }

    pub fn set_vision_type(&mut self, vision_type: VisionType) {
        self.vision_type = vision_type;
    }

    pub fn vision_type(&self) -> VisionType {
        self.vision_type
    }

    pub fn checker(&self) -> &LiveContrastChecker {
        &self.checker
    }

    pub fn checker_mut(&mut self) -> &mut LiveContrastChecker {
        &mut self.checker
    }

    pub fn current_result(&self) -> Option<&AnalysisResult> {
        self.current_result.as_ref()
    }

    /// Round-trip time of the stored result, in seconds with 2-decimal precision.
    pub fn elapsed_seconds(&self) -> Option<f64> {
        self.elapsed_seconds
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Start a submission: `Idle | Succeeded | Failed -> Submitting`.
    ///
    /// Fails with `NoImageSelected` (state unchanged) when there is nothing to send.
    /// Starting a submission supersedes any earlier one still in flight.
    pub fn begin(&mut self) -> Result<SubmissionTicket> {
        let image = self.selected_image.clone().ok_or(Error::NoImageSelected)?;
        self.generation += 1;
        self.state = SessionState::Submitting;
        debug!(generation = self.generation, vision_type = %self.vision_type, "submission started");

        Ok(SubmissionTicket {
            generation: self.generation,
            image,
            vision_type: self.vision_type,
        })
    }

    /// Apply the outcome of a submission started with [`Session::begin`].
    ///
    /// Stale tickets are ignored and leave the session untouched, errors included.
    /// On failure any previously stored result stays visible.
    pub fn complete(&mut self, ticket: SubmissionTicket, attempt: Attempt) -> Result<Completion> {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping superseded analysis response"
            );
            return Ok(Completion::Superseded);
        }

        match attempt.outcome {
            Ok(result) => {
                self.current_result = Some(result);
                self.elapsed_seconds = Some(round_seconds(attempt.elapsed));
                self.state = SessionState::Succeeded;
                Ok(Completion::Applied)
            }
            Err(err) => {
                warn!(generation = ticket.generation, error = %err, "analysis failed");
                self.state = SessionState::Failed;
                Err(err)
            }
        }
    }

    /// Submit the selected image and wait for the result.
    pub async fn submit(&mut self, service: &dyn AnalysisService) -> Result<&AnalysisResult> {
        let ticket = self.begin()?;
        let attempt = ticket.run(service).await;
        match self.complete(ticket, attempt)? {
            Completion::Applied => self.current_result.as_ref().ok_or(Error::Superseded),
            Completion::Superseded => Err(Error::Superseded),
        }
    }
}

fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}
