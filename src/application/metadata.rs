use std::time::Duration;

use tracing::debug;

use crate::{
    api::ApiClient,
    domain::{AppError, PreviewInfo, Thumbnail},
};

/// Resolves a locator into preview metadata before anything is downloaded.
#[derive(Clone)]
pub struct MetadataFetcher {
    api_client: ApiClient,
}

impl MetadataFetcher {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// Waits `delay` (lets a pasted value settle), then asks the server once.
    pub async fn fetch_preview(&self, locator: &str, delay: Duration) -> Result<PreviewInfo, AppError> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        debug!(locator, "fetching preview");
        Ok(self.api_client.fetch_preview(locator).await?)
    }

    pub async fn fetch_thumbnail(&self, url: &str) -> Result<Thumbnail, AppError> {
        let bytes = self.api_client.fetch_thumbnail(url).await?;
        decode_thumbnail(&bytes)
    }
}

pub fn decode_thumbnail(bytes: &[u8]) -> Result<Thumbnail, AppError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AppError::Image(e.to_string()))?
        .to_rgba8();
    let (width, height) = img.dimensions();

    Ok(Thumbnail {
        width,
        height,
        rgba: img.into_raw(),
    })
}
