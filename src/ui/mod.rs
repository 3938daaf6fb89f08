use iced::{
    widget::{button, column, image, pick_list, progress_bar, row, text, text_input, Space},
    Alignment, Element, Length,
};

use crate::{
    application::{StatusView, Tone},
    domain::{MediaFormat, PreviewInfo, Quality},
};

/// Form state owned by the view
pub struct DownloadView {
    pub locator: String,
    pub format: MediaFormat,
    pub quality: Quality,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            locator: String::new(),
            format: MediaFormat::default(),
            quality: Quality::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    LocatorChanged(String),
    LocatorPasted(String),
    FormatSelected(MediaFormat),
    QualitySelected(Quality),
    DownloadPressed,
    ResetPressed,
    OpenFilePressed,
    OpenFolderPressed,
}

/// Session data the view renders next to the form.
pub struct SessionView<'a> {
    pub status: StatusView,
    pub preview: Option<&'a PreviewInfo>,
    pub thumbnail: Option<&'a image::Handle>,
    pub loading: bool,
    pub downloading: bool,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::LocatorChanged(value) => {
                self.locator = value;
            }
            DownloadMessage::FormatSelected(format) => {
                self.format = format;
            }
            DownloadMessage::QualitySelected(quality) => {
                self.quality = quality;
            }
            DownloadMessage::ResetPressed => {
                self.locator.clear();
            }
            DownloadMessage::LocatorPasted(_)
            | DownloadMessage::DownloadPressed
            | DownloadMessage::OpenFilePressed
            | DownloadMessage::OpenFolderPressed => {
                // Will be handled by the app
            }
        }
    }

    /// A paste always replaces the whole field. Returns the new locator.
    pub fn replace_locator(&mut self, pasted: &str) -> String {
        self.locator = pasted.trim().to_string();
        self.locator.clone()
    }

    pub fn show_quality(&self) -> bool {
        self.format.has_quality()
    }

    pub fn view<'a>(&'a self, session: SessionView<'a>) -> Element<'a, DownloadMessage> {
        let mut options = row![
            text("Format:").size(16),
            pick_list(MediaFormat::ALL, Some(self.format), DownloadMessage::FormatSelected),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        if self.show_quality() {
            options = options
                .push(text("Quality:").size(16))
                .push(pick_list(
                    Quality::ALL,
                    Some(self.quality),
                    DownloadMessage::QualitySelected,
                ));
        }

        let mut content = column![
            text("Media Downloader").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text("Video URL:").size(16),
            text_input("Paste a video URL...", &self.locator)
                .on_input(DownloadMessage::LocatorChanged)
                .on_paste(DownloadMessage::LocatorPasted)
                .on_submit(DownloadMessage::DownloadPressed)
                .padding(10),
            options,
        ]
        .padding(20)
        .spacing(10);

        if let Some(preview) = session.preview {
            let mut card = row![].spacing(15).align_y(Alignment::Center);
            if let Some(handle) = session.thumbnail {
                card = card.push(image(handle.clone()).width(Length::Fixed(160.0)));
            }
            card = card.push(column![
                text(preview.title.clone()).size(18),
                text(format!("Duration: {}", preview.duration_text)).size(14),
            ]);
            content = content.push(card);
        }

        content = content.push(
            row![
                button("Download")
                    .on_press_maybe((!session.downloading).then_some(DownloadMessage::DownloadPressed))
                    .padding([10, 20]),
                button("Clear")
                    .on_press(DownloadMessage::ResetPressed)
                    .padding([10, 20]),
            ]
            .spacing(10),
        );

        if session.loading {
            content = content.push(text("Working...").size(14));
        }

        if let Some(percent) = session.status.progress {
            content = content.push(progress_bar(0.0..=100.0, percent));
        }

        if !session.status.text.is_empty() {
            let status = text(session.status.text.clone()).size(14);
            content = content.push(match session.status.tone {
                Tone::Error => status.style(text::danger),
                Tone::Success => status.style(text::success),
                Tone::Info | Tone::Plain => status,
            });
        }

        if session.status.completed.is_some() {
            content = content.push(
                row![
                    button("Play").on_press(DownloadMessage::OpenFilePressed),
                    button("Open folder").on_press(DownloadMessage::OpenFolderPressed),
                ]
                .spacing(10),
            );
        }

        content.into()
    }
}

/// The text inserted between `before` and `after`, found by stripping the
/// longest common prefix and suffix. Used when the clipboard can't be read.
pub fn pasted_text(before: &str, after: &str) -> String {
    let prefix: usize = before
        .chars()
        .zip(after.chars())
        .take_while(|(a, b)| a == b)
        .map(|(c, _)| c.len_utf8())
        .sum();
    let suffix: usize = before[prefix..]
        .chars()
        .rev()
        .zip(after[prefix..].chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(c, _)| c.len_utf8())
        .sum();

    after[prefix..after.len() - suffix].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Effect, Orchestrator};
    use crate::config::AppConfig;

    #[test]
    fn test_format_toggles_quality_selector() {
        let mut view = DownloadView::default();
        assert!(view.show_quality());

        view.update(DownloadMessage::FormatSelected(MediaFormat::Audio));
        assert!(!view.show_quality());
        assert_eq!(view.quality, Quality::Highest);

        view.update(DownloadMessage::FormatSelected(MediaFormat::Video));
        assert!(view.show_quality());
    }

    #[test]
    fn test_paste_into_filled_field_previews_only_pasted_link() {
        let mut view = DownloadView::default();
        let mut orch = Orchestrator::new(&AppConfig::default());
        view.update(DownloadMessage::LocatorChanged("https://youtu.be/old".into()));

        // iced reports the whole field after the paste landed at the cursor.
        let contents = "https://youtu.be/oldhttps://youtu.be/new".to_string();
        view.update(DownloadMessage::LocatorPasted(contents.clone()));
        assert_eq!(view.locator, "https://youtu.be/old");

        let pasted = pasted_text(&view.locator, &contents);
        let locator = view.replace_locator(&pasted);
        assert_eq!(view.locator, "https://youtu.be/new");

        match orch.paste(&locator).pop() {
            Some(Effect::FetchPreview { locator, .. }) => {
                assert_eq!(locator, "https://youtu.be/new")
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn test_pasted_text_extraction() {
        assert_eq!(pasted_text("", "https://youtu.be/x"), "https://youtu.be/x");
        assert_eq!(pasted_text("ab", "aXYb"), "XY");
        assert_eq!(pasted_text("héllo", "héllo wörld"), " wörld");
    }

    #[test]
    fn test_reset_clears_locator() {
        let mut view = DownloadView::default();
        view.replace_locator(" https://youtu.be/x ");
        assert_eq!(view.locator, "https://youtu.be/x");

        view.update(DownloadMessage::ResetPressed);
        assert!(view.locator.is_empty());
    }
}
