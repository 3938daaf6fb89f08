mod api;
mod app;
mod application;
mod config;
mod domain;
mod ui;
mod utils;

use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("simple_media_downloader=info")),
        )
        .init();

    let config = config::AppConfig::from_env();
    info!(server = %config.base_url, "starting media downloader");
    let api_client = api::ApiClient::new(config)?;

    iced::application(
        move || app::DownloadApp::new(api_client.clone()),
        app::update,
        app::view,
    )
    .title("Media Downloader")
    .run()?;

    Ok(())
}
