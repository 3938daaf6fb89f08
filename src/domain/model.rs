use std::fmt;

/// Output container requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaFormat {
    #[default]
    Video,
    Audio,
}

impl MediaFormat {
    pub const ALL: [MediaFormat; 2] = [MediaFormat::Video, MediaFormat::Audio];

    /// Value of the `format` query parameter.
    pub fn wire_name(self) -> &'static str {
        match self {
            MediaFormat::Video => "mp4",
            MediaFormat::Audio => "mp3",
        }
    }

    /// Sub-directory of the storage root the server saves into.
    pub fn storage_dir(self) -> &'static str {
        match self {
            MediaFormat::Video => "video",
            MediaFormat::Audio => "audio",
        }
    }

    pub fn has_quality(self) -> bool {
        matches!(self, MediaFormat::Video)
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaFormat::Video => write!(f, "Video (MP4)"),
            MediaFormat::Audio => write!(f, "Audio (MP3)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    #[default]
    Highest,
    P720,
    P480,
    P360,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Highest, Quality::P720, Quality::P480, Quality::P360];

    pub fn wire_name(self) -> &'static str {
        match self {
            Quality::Highest => "highest",
            Quality::P720 => "720p",
            Quality::P480 => "480p",
            Quality::P360 => "360p",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Highest => write!(f, "Highest available"),
            other => write!(f, "{}", other.wire_name()),
        }
    }
}

/// A validated request for the `/descargar` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub locator: String,
    pub format: MediaFormat,
    /// Only set for video downloads.
    pub quality: Option<Quality>,
}

impl DownloadRequest {
    pub fn new(locator: impl Into<String>, format: MediaFormat, quality: Quality) -> Self {
        Self {
            locator: locator.into(),
            format,
            quality: format.has_quality().then_some(quality),
        }
    }

    pub fn quality_param(&self) -> &'static str {
        self.quality.map(Quality::wire_name).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewInfo {
    pub title: String,
    pub thumbnail_url: String,
    pub duration_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Clamped to `[0, 100]` and rounded to one decimal place.
    pub percent: f64,
    pub converting: bool,
}

impl ProgressSnapshot {
    pub fn new(raw_percent: f64, converting: bool) -> Self {
        let clamped = if raw_percent.is_nan() {
            0.0
        } else {
            raw_percent.clamp(0.0, 100.0)
        };

        Self {
            percent: (clamped * 10.0).round() / 10.0,
            converting,
        }
    }
}

/// What the server reports once a download finished successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub message: String,
    pub file_name: String,
    pub sanitized_file_name: String,
}

/// A finished download, scoped to where the server stored it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedDownload {
    pub message: String,
    pub format: MediaFormat,
    pub file_name: String,
    pub sanitized_file_name: String,
    /// `<storage_root>/<audio|video>/<file_name>`
    pub file_path: String,
}

/// Decoded RGBA thumbnail pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    Previewing,
    Downloading,
    Succeeded,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_clamped_and_rounded() {
        assert_eq!(ProgressSnapshot::new(-5.0, false).percent, 0.0);
        assert_eq!(ProgressSnapshot::new(123.456, false).percent, 100.0);
        assert_eq!(ProgressSnapshot::new(42.26, true).percent, 42.3);
        assert_eq!(ProgressSnapshot::new(f64::NAN, false).percent, 0.0);
    }

    #[test]
    fn test_quality_only_kept_for_video() {
        let video = DownloadRequest::new("https://x", MediaFormat::Video, Quality::P480);
        assert_eq!(video.quality_param(), "480p");

        let audio = DownloadRequest::new("https://x", MediaFormat::Audio, Quality::P480);
        assert_eq!(audio.quality, None);
        assert_eq!(audio.quality_param(), "");
    }
}
