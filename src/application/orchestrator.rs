use std::time::Duration;

use tracing::{debug, info, warn};

use super::progress_poller::{PollEvent, PollerHandle};
use super::status::{render_status, Status, StatusView};
use crate::{
    config::AppConfig,
    domain::{
        AppError, CompletedDownload, DownloadOutcome, DownloadPhase, DownloadRequest, MediaFormat,
        PreviewInfo, Quality, Thumbnail,
    },
    utils::{storage_path, validate_locator},
};

/// Async work the orchestrator asks its host to run. Every result must be
/// fed back together with the `generation` it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fire-and-forget `/reset-progress`.
    ResetProgress,
    FetchPreview {
        generation: u64,
        locator: String,
        delay: Duration,
    },
    FetchThumbnail {
        generation: u64,
        url: String,
    },
    /// Start the progress poller and the download request side by side, then
    /// hand the poller's handle back through [`Orchestrator::attach_poller`].
    StartDownload {
        generation: u64,
        request: DownloadRequest,
    },
}

/// Session state for the download workflow.
///
/// Each submit, paste or reset starts a new generation. Results tagged with an
/// older generation are dropped, and at most one poller handle is held at a time.
pub struct Orchestrator {
    storage_root: String,
    paste_settle_delay: Duration,
    max_missed_polls: u32,

    generation: u64,
    phase: DownloadPhase,
    status: Status,
    preview: Option<PreviewInfo>,
    request: Option<DownloadRequest>,
    poller: Option<PollerHandle>,
    missed_polls: u32,
    loading: bool,
}

impl Orchestrator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            storage_root: config.storage_root.clone(),
            paste_settle_delay: config.paste_settle_delay,
            max_missed_polls: config.max_missed_polls,
            generation: 0,
            phase: DownloadPhase::Idle,
            status: Status::Empty,
            preview: None,
            request: None,
            poller: None,
            missed_polls: 0,
            loading: false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> DownloadPhase {
        self.phase
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_view(&self) -> StatusView {
        render_status(self.status())
    }

    pub fn preview(&self) -> Option<&PreviewInfo> {
        self.preview.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_downloading(&self) -> bool {
        self.phase() == DownloadPhase::Downloading
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_stopped())
    }

    fn stop_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }

    /// Drops everything belonging to the current session and opens a new generation.
    fn clear(&mut self) -> u64 {
        self.stop_poller();
        self.generation += 1;
        self.phase = DownloadPhase::Idle;
        self.status = Status::Empty;
        self.preview = None;
        self.request = None;
        self.missed_polls = 0;
        self.loading = false;
        self.generation
    }

    fn finish(&mut self, status: Status) {
        self.stop_poller();
        self.phase = match status {
            Status::Succeeded(_) => DownloadPhase::Succeeded,
            _ => DownloadPhase::Failed,
        };
        self.status = status;
        self.request = None;
        self.loading = false;
    }

    pub fn submit(&mut self, locator: &str, format: MediaFormat, quality: Quality) -> Vec<Effect> {
        let locator = match validate_locator(locator) {
            Ok(locator) => locator,
            Err(err) => {
                debug!(error = %err, "rejected submit");
                self.status = Status::Invalid(err);
                return Vec::new();
            }
        };

        let generation = self.clear();
        let request = DownloadRequest::new(locator, format, quality);
        info!(
            generation,
            locator = %request.locator,
            format = request.format.wire_name(),
            "starting download"
        );

        self.phase = DownloadPhase::Downloading;
        self.status = Status::Initiating;
        self.loading = true;
        self.request = Some(request.clone());

        vec![
            Effect::ResetProgress,
            Effect::StartDownload {
                generation,
                request,
            },
        ]
    }

    /// Takes ownership of a freshly started poller. A handle for anything but
    /// the running download is stopped on the spot.
    pub fn attach_poller(&mut self, handle: PollerHandle) {
        if handle.generation() != self.generation || !self.is_downloading() {
            debug!(generation = handle.generation(), "stopping poller for a finished session");
            handle.stop();
            return;
        }

        self.stop_poller();
        self.poller = Some(handle);
    }

    pub fn on_progress(&mut self, event: PollEvent) -> Vec<Effect> {
        // A handle is only ever attached for the current generation.
        let current =
            self.is_downloading() && event.generation == self.generation && self.is_polling();
        if !current {
            debug!(generation = event.generation, "discarding stale progress tick");
            return Vec::new();
        }

        match event.result {
            Ok(None) => {
                debug!(generation = event.generation, "progress tick without a value");
                Vec::new()
            }
            Ok(Some(snapshot)) => {
                self.missed_polls = 0;
                let format = self.request.as_ref().map(|r| r.format).unwrap_or_default();
                self.status = Status::Progress { snapshot, format };
                Vec::new()
            }
            Err(_) => {
                self.missed_polls += 1;
                if self.max_missed_polls == 0 || self.missed_polls < self.max_missed_polls {
                    return Vec::new();
                }

                warn!(
                    generation = self.generation,
                    missed = self.missed_polls,
                    "giving up on download after repeated progress failures"
                );
                self.finish(Status::Failed(AppError::Transport(format!(
                    "lost contact with the progress service after {} failed polls",
                    self.missed_polls
                ))));
                vec![Effect::ResetProgress]
            }
        }
    }

    pub fn on_download_settled(
        &mut self,
        generation: u64,
        result: Result<DownloadOutcome, AppError>,
    ) -> Vec<Effect> {
        if generation != self.generation || !self.is_downloading() {
            debug!(generation, "discarding stale download response");
            return Vec::new();
        }

        self.stop_poller();
        let format = self.request.as_ref().map(|r| r.format).unwrap_or_default();

        let status = match result {
            Ok(outcome) => {
                info!(generation, file = %outcome.file_name, "download finished");
                Status::Succeeded(CompletedDownload {
                    file_path: storage_path(&self.storage_root, format, &outcome.file_name),
                    message: outcome.message,
                    format,
                    file_name: outcome.file_name,
                    sanitized_file_name: outcome.sanitized_file_name,
                })
            }
            Err(err) => {
                info!(generation, error = %err, "download failed");
                Status::Failed(err)
            }
        };

        self.finish(status);
        vec![Effect::ResetProgress]
    }

    /// A paste resets everything and previews the pasted locator after a short delay.
    pub fn paste(&mut self, pasted: &str) -> Vec<Effect> {
        let generation = self.clear();
        let mut effects = vec![Effect::ResetProgress];

        let locator = pasted.trim();
        if locator.is_empty() {
            return effects;
        }

        self.phase = DownloadPhase::Previewing;
        self.status = Status::FetchingPreview;
        self.loading = true;
        effects.push(Effect::FetchPreview {
            generation,
            locator: locator.to_string(),
            delay: self.paste_settle_delay,
        });
        effects
    }

    pub fn on_preview(
        &mut self,
        generation: u64,
        result: Result<PreviewInfo, AppError>,
    ) -> Vec<Effect> {
        if generation != self.generation || self.phase != DownloadPhase::Previewing {
            debug!(generation, "discarding stale preview");
            return Vec::new();
        }

        self.phase = DownloadPhase::Idle;
        self.loading = false;

        match result {
            Ok(info) => {
                self.status = Status::Empty;
                let thumbnail = info.thumbnail_url.clone();
                self.preview = Some(info);
                if thumbnail.is_empty() {
                    Vec::new()
                } else {
                    vec![Effect::FetchThumbnail {
                        generation,
                        url: thumbnail,
                    }]
                }
            }
            Err(err) => {
                self.preview = None;
                self.status = Status::PreviewFailed(err);
                Vec::new()
            }
        }
    }

    /// Returns the thumbnail if it still belongs to the visible preview.
    pub fn on_thumbnail(
        &mut self,
        generation: u64,
        result: Result<Thumbnail, AppError>,
    ) -> Option<Thumbnail> {
        if generation != self.generation || self.preview.is_none() {
            return None;
        }
        match result {
            Ok(thumbnail) => Some(thumbnail),
            Err(err) => {
                warn!(generation, error = %err, "thumbnail unavailable");
                None
            }
        }
    }

    pub fn reset(&mut self) -> Vec<Effect> {
        let generation = self.clear();
        debug!(generation, "session reset");
        vec![Effect::ResetProgress]
    }
}
