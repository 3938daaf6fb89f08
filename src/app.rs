use iced::widget::image;
use iced::Task;
use tracing::debug;

use crate::api::ApiClient;
use crate::application::{
    action_failure_text, ActionDispatcher, Effect, MetadataFetcher, Orchestrator, PollEvent,
    ProgressPoller,
};
use crate::domain::{AppError, DownloadOutcome, PreviewInfo, Thumbnail};
use crate::ui::{pasted_text, DownloadMessage, DownloadView, SessionView};

pub struct DownloadApp {
    view: DownloadView,
    orchestrator: Orchestrator,
    api_client: ApiClient,
    poller: ProgressPoller,
    metadata: MetadataFetcher,
    actions: ActionDispatcher,
    // Tagged with the generation of the preview it belongs to
    thumbnail: Option<(u64, image::Handle)>,
}

impl DownloadApp {
    pub fn new(api_client: ApiClient) -> Self {
        let config = api_client.config().clone();

        Self {
            view: DownloadView::default(),
            orchestrator: Orchestrator::new(&config),
            poller: ProgressPoller::new(api_client.clone(), config.poll_interval),
            metadata: MetadataFetcher::new(api_client.clone()),
            actions: ActionDispatcher::new(api_client.clone()),
            api_client,
            thumbnail: None,
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> Task<Message> {
        let tasks: Vec<Task<Message>> = effects
            .into_iter()
            .map(|effect| self.run_effect(effect))
            .collect();
        Task::batch(tasks)
    }

    fn run_effect(&mut self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::ResetProgress => {
                let client = self.api_client.clone();
                Task::perform(
                    async move {
                        if let Err(e) = client.reset_progress().await {
                            debug!(error = %e, "reset-progress request failed");
                        }
                    },
                    |_| Message::Ignored,
                )
            }
            Effect::FetchPreview {
                generation,
                locator,
                delay,
            } => {
                let metadata = self.metadata.clone();
                Task::perform(
                    async move { metadata.fetch_preview(&locator, delay).await },
                    move |result| Message::PreviewLoaded(generation, result),
                )
            }
            Effect::FetchThumbnail { generation, url } => {
                let metadata = self.metadata.clone();
                Task::perform(
                    async move { metadata.fetch_thumbnail(&url).await },
                    move |result| Message::ThumbnailLoaded(generation, result),
                )
            }
            Effect::StartDownload {
                generation,
                request,
            } => {
                // Poller and download run side by side; the poller never waits on the download.
                let (ticks, handle) = self.poller.start(generation);
                self.orchestrator.attach_poller(handle);

                let client = self.api_client.clone();
                Task::batch([
                    Task::run(ticks, Message::ProgressTick),
                    Task::perform(
                        async move { client.download(&request).await.map_err(AppError::from) },
                        move |result| Message::DownloadSettled(generation, result),
                    ),
                ])
            }
        }
    }

    fn session_view(&self) -> SessionView<'_> {
        let preview = self.orchestrator.preview();
        let thumbnail = self
            .thumbnail
            .as_ref()
            .filter(|(generation, _)| {
                preview.is_some() && *generation == self.orchestrator.generation()
            })
            .map(|(_, handle)| handle);

        SessionView {
            status: self.orchestrator.status_view(),
            preview,
            thumbnail,
            loading: self.orchestrator.is_loading(),
            downloading: self.orchestrator.is_downloading(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Text that was pasted into the locator field
    PasteResolved(String),
    PreviewLoaded(u64, Result<PreviewInfo, AppError>),
    ThumbnailLoaded(u64, Result<Thumbnail, AppError>),
    ProgressTick(PollEvent),
    DownloadSettled(u64, Result<DownloadOutcome, AppError>),
    /// (What was opened, outcome)
    ActionFinished(&'static str, Result<(), AppError>),
    Ignored,
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::DownloadPressed => {
                    let effects =
                        app.orchestrator
                            .submit(&app.view.locator, app.view.format, app.view.quality);
                    return app.run_effects(effects);
                }
                DownloadMessage::LocatorPasted(contents) => {
                    // iced hands over the whole field; only the clipboard text replaces it.
                    let fallback = pasted_text(&app.view.locator, &contents);
                    return iced::clipboard::read().map(move |clip| {
                        let text = clip
                            .map(|text| text.to_string())
                            .filter(|text| !text.trim().is_empty())
                            .unwrap_or_else(|| fallback.clone());
                        Message::PasteResolved(text)
                    });
                }
                DownloadMessage::ResetPressed => {
                    app.thumbnail = None;
                    let effects = app.orchestrator.reset();
                    return app.run_effects(effects);
                }
                DownloadMessage::OpenFilePressed => {
                    if let Some(done) = app.orchestrator.status_view().completed {
                        let actions = app.actions.clone();
                        return Task::perform(
                            async move { actions.open_file(&done).await },
                            |result| Message::ActionFinished("file", result),
                        );
                    }
                }
                DownloadMessage::OpenFolderPressed => {
                    if let Some(done) = app.orchestrator.status_view().completed {
                        let actions = app.actions.clone();
                        return Task::perform(
                            async move { actions.open_folder(&done.file_path).await },
                            |result| Message::ActionFinished("folder", result),
                        );
                    }
                }
                DownloadMessage::LocatorChanged(_)
                | DownloadMessage::FormatSelected(_)
                | DownloadMessage::QualitySelected(_) => {}
            }
        }
        Message::PasteResolved(pasted) => {
            let locator = app.view.replace_locator(&pasted);
            let effects = app.orchestrator.paste(&locator);
            return app.run_effects(effects);
        }
        Message::PreviewLoaded(generation, result) => {
            let effects = app.orchestrator.on_preview(generation, result);
            return app.run_effects(effects);
        }
        Message::ThumbnailLoaded(generation, result) => {
            if let Some(thumb) = app.orchestrator.on_thumbnail(generation, result) {
                let handle = image::Handle::from_rgba(thumb.width, thumb.height, thumb.rgba);
                app.thumbnail = Some((generation, handle));
            }
        }
        Message::ProgressTick(event) => {
            let effects = app.orchestrator.on_progress(event);
            return app.run_effects(effects);
        }
        Message::DownloadSettled(generation, result) => {
            let effects = app.orchestrator.on_download_settled(generation, result);
            return app.run_effects(effects);
        }
        Message::ActionFinished(_, Ok(())) => {}
        Message::ActionFinished(target, Err(err)) => {
            let description = action_failure_text(target, &err);
            return Task::perform(show_alert(description), |_| Message::Ignored);
        }
        Message::Ignored => {}
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view(app.session_view()).map(Message::UiMessage)
}

/// Blocking native alert, kept apart from the status area.
async fn show_alert(description: String) {
    let _ = rfd::AsyncMessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("Media Downloader")
        .set_description(description)
        .set_buttons(rfd::MessageButtons::Ok)
        .show()
        .await;
}
