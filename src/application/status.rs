use crate::domain::{AppError, CompletedDownload, MediaFormat, ProgressSnapshot};

/// Everything the status area can show for one session.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Empty,
    Invalid(AppError),
    FetchingPreview,
    PreviewFailed(AppError),
    Initiating,
    Progress {
        snapshot: ProgressSnapshot,
        format: MediaFormat,
    },
    Succeeded(CompletedDownload),
    Failed(AppError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub text: String,
    pub tone: Tone,
    /// Percent for the progress bar, only while downloading.
    pub progress: Option<f32>,
    /// Target of the open-file / open-folder actions, only after success.
    pub completed: Option<CompletedDownload>,
}

impl StatusView {
    fn text(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
            progress: None,
            completed: None,
        }
    }
}

pub fn render_status(status: &Status) -> StatusView {
    match status {
        Status::Empty => StatusView::text("", Tone::Plain),
        Status::Invalid(err) => StatusView::text(err.to_string(), Tone::Error),
        Status::FetchingPreview => StatusView::text("Fetching video info...", Tone::Info),
        Status::PreviewFailed(AppError::Rejected(message)) => {
            StatusView::text(format!("Error: {}", message), Tone::Error)
        }
        Status::PreviewFailed(err) => {
            StatusView::text(format!("Error fetching video info: {}", err), Tone::Error)
        }
        Status::Initiating => StatusView::text("Starting download...", Tone::Info),
        Status::Progress { snapshot, format } => {
            let mut text = format!("{:.1}%", snapshot.percent);
            if let Some(note) = progress_note(snapshot, *format) {
                text.push_str(" - ");
                text.push_str(note);
            }
            StatusView {
                text,
                tone: Tone::Info,
                progress: Some(snapshot.percent as f32),
                completed: None,
            }
        }
        Status::Succeeded(done) => StatusView {
            text: format!(
                "{}: {}\nSaved to {}",
                done.message, done.file_name, done.file_path
            ),
            tone: Tone::Success,
            progress: None,
            completed: Some(done.clone()),
        },
        Status::Failed(err) => StatusView::text(format!("Error: {}", err), Tone::Error),
    }
}

fn progress_note(snapshot: &ProgressSnapshot, format: MediaFormat) -> Option<&'static str> {
    match format {
        MediaFormat::Audio if snapshot.converting => Some("Converting to MP3..."),
        MediaFormat::Audio if snapshot.percent < 50.0 => Some("Downloading audio..."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(raw: f64, converting: bool, format: MediaFormat) -> StatusView {
        render_status(&Status::Progress {
            snapshot: ProgressSnapshot::new(raw, converting),
            format,
        })
    }

    #[test]
    fn test_progress_text_is_clamped() {
        assert_eq!(progress(-5.0, false, MediaFormat::Video).text, "0.0%");
        assert_eq!(progress(123.456, false, MediaFormat::Video).text, "100.0%");
        assert_eq!(progress(123.456, false, MediaFormat::Video).progress, Some(100.0));
    }

    #[test]
    fn test_audio_progress_notes() {
        assert_eq!(
            progress(12.0, false, MediaFormat::Audio).text,
            "12.0% - Downloading audio..."
        );
        assert_eq!(
            progress(50.0, true, MediaFormat::Audio).text,
            "50.0% - Converting to MP3..."
        );
        assert_eq!(progress(75.0, false, MediaFormat::Audio).text, "75.0%");
    }

    #[test]
    fn test_errors_are_prefixed() {
        let view = render_status(&Status::Failed(AppError::Rejected("boom".into())));
        assert_eq!(view.text, "Error: boom");
        assert_eq!(view.tone, Tone::Error);
        assert!(view.completed.is_none());

        let view = render_status(&Status::PreviewFailed(AppError::Transport("timed out".into())));
        assert_eq!(view.text, "Error fetching video info: timed out");
    }

    #[test]
    fn test_success_exposes_actions() {
        let done = CompletedDownload {
            message: "Audio downloaded".into(),
            format: MediaFormat::Audio,
            file_name: "Song.mp3".into(),
            sanitized_file_name: "Song.mp3".into(),
            file_path: "descargas/audio/Song.mp3".into(),
        };
        let view = render_status(&Status::Succeeded(done.clone()));
        assert_eq!(
            view.text,
            "Audio downloaded: Song.mp3\nSaved to descargas/audio/Song.mp3"
        );
        assert_eq!(view.completed, Some(done));
    }
}
