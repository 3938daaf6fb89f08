use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::models::{ActionResponse, DownloadResponse, InfoResponse, ProgressResponse};
use crate::config::AppConfig;
use crate::domain::{DownloadOutcome, DownloadRequest, MediaFormat, PreviewInfo, ProgressSnapshot};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server responded with status {0}")]
    Status(u16),

    /// `success: false` payload, error text as sent by the server.
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Client for the download server's HTTP endpoints.
#[derive(Clone)]
pub struct ApiClient {
    config: AppConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path
        ))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, timeout: Option<Duration>) -> Result<T> {
        let mut request = self.http.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    /// Resolves a video URL into its title, thumbnail and duration.
    pub async fn fetch_preview(&self, locator: &str) -> Result<PreviewInfo> {
        let url = self.endpoint("obtener-info", &[("url", locator)])?;
        let json: InfoResponse = self.get_json(url, None).await?;

        if !json.success {
            return Err(ApiError::Rejected(
                json.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        Ok(PreviewInfo {
            title: json.title,
            thumbnail_url: json.thumbnail,
            duration_text: json.duration,
        })
    }

    /// Asks the server to download (and convert) the media. Resolves only once
    /// the server is done, which can take minutes.
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome> {
        let url = self.endpoint(
            "descargar",
            &[
                ("url", request.locator.as_str()),
                ("format", request.format.wire_name()),
                ("quality", request.quality_param()),
            ],
        )?;
        let json: DownloadResponse = self
            .get_json(url, Some(self.config.download_timeout))
            .await?;

        if !json.success {
            return Err(ApiError::Rejected(
                json.error
                    .unwrap_or_else(|| "Unknown download error".to_string()),
            ));
        }

        Ok(DownloadOutcome {
            message: json.message,
            file_name: json.file,
            sanitized_file_name: json.sanitized_file,
        })
    }

    /// `Ok(None)` when the payload carries no `progress` value.
    pub async fn progress(&self) -> Result<Option<ProgressSnapshot>> {
        let url = self.endpoint("progreso", &[])?;
        let json: ProgressResponse = self.get_json(url, None).await?;
        Ok(json
            .progress
            .map(|percent| ProgressSnapshot::new(percent, json.converting)))
    }

    /// Tells the server to zero its progress counter. The body is ignored.
    pub async fn reset_progress(&self) -> Result<()> {
        let url = self.endpoint("reset-progress", &[])?;
        self.http.get(url).send().await?;
        Ok(())
    }

    pub async fn open_file(&self, sanitized_path: &str, format: MediaFormat) -> Result<()> {
        let url = self.endpoint(
            "abrir-archivo",
            &[("sanitized_path", sanitized_path), ("format", format.wire_name())],
        )?;
        let json: ActionResponse = self.get_json(url, None).await?;
        action_result(json)
    }

    pub async fn open_folder(&self, path: &str) -> Result<()> {
        let url = self.endpoint("abrir-carpeta", &[("path", path)])?;
        let json: ActionResponse = self.get_json(url, None).await?;
        action_result(json)
    }

    /// Raw bytes of a thumbnail image; the URL usually points at a third-party CDN.
    pub async fn fetch_thumbnail(&self, thumbnail_url: &str) -> Result<bytes::Bytes> {
        let url = Url::parse(thumbnail_url)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?)
    }
}

fn action_result(json: ActionResponse) -> Result<()> {
    if json.success {
        Ok(())
    } else {
        Err(ApiError::Rejected(
            json.error.unwrap_or_else(|| "Unknown error".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Quality;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server) -> ApiClient {
        ApiClient::new(AppConfig {
            base_url: server.url(),
            ..AppConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let client = ApiClient::new(AppConfig {
            base_url: "http://localhost:5000/".to_string(),
            ..AppConfig::default()
        })
        .unwrap();

        let url = client
            .endpoint("obtener-info", &[("url", "https://youtu.be/x?t=1&a=b")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/obtener-info?url=https%3A%2F%2Fyoutu.be%2Fx%3Ft%3D1%26a%3Db"
        );

        let bare = client.endpoint("progreso", &[]).unwrap();
        assert_eq!(bare.as_str(), "http://localhost:5000/progreso");
    }

    #[tokio::test]
    async fn test_fetch_preview_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/obtener-info")
            .match_query(Matcher::UrlEncoded(
                "url".into(),
                "https://www.youtube.com/watch?v=abc".into(),
            ))
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "success": true,
                    "title": "Song",
                    "thumbnail": "https://img/hq.jpg",
                    "duration": "3:07"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let preview = client_for(&server)
            .fetch_preview("https://www.youtube.com/watch?v=abc")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(preview.title, "Song");
        assert_eq!(preview.thumbnail_url, "https://img/hq.jpg");
        assert_eq!(preview.duration_text, "3:07");
    }

    #[tokio::test]
    async fn test_fetch_preview_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/obtener-info")
            .match_query(Matcher::Any)
            .with_body(json!({"success": false, "error": "Video unavailable"}).to_string())
            .create_async()
            .await;

        let err = client_for(&server).fetch_preview("https://x").await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "Video unavailable"));
    }

    #[tokio::test]
    async fn test_download_sends_format_and_quality() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/descargar")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("url".into(), "https://youtu.be/abc".into()),
                Matcher::UrlEncoded("format".into(), "mp4".into()),
                Matcher::UrlEncoded("quality".into(), "720p".into()),
            ]))
            .with_body(
                json!({
                    "success": true,
                    "message": "Video downloaded",
                    "file": "Clip.mp4",
                    "sanitized_file": "Clip.mp4"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let request = DownloadRequest::new("https://youtu.be/abc", MediaFormat::Video, Quality::P720);
        let outcome = client_for(&server).download(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(outcome.file_name, "Clip.mp4");
        assert_eq!(outcome.sanitized_file_name, "Clip.mp4");
        assert_eq!(outcome.message, "Video downloaded");
    }

    #[tokio::test]
    async fn test_download_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/descargar")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let request = DownloadRequest::new("https://youtu.be/abc", MediaFormat::Audio, Quality::Highest);
        let err = client_for(&server).download(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Status(500)));

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/descargar")
            .match_query(Matcher::Any)
            .with_body("<html>oops</html>")
            .create_async()
            .await;
        let err = client_for(&server).download(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_progress_is_clamped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/progreso")
            .with_body(json!({"progress": 123.456, "converting": true}).to_string())
            .create_async()
            .await;

        let snapshot = client_for(&server).progress().await.unwrap().unwrap();
        assert_eq!(snapshot.percent, 100.0);
        assert!(snapshot.converting);
    }

    #[tokio::test]
    async fn test_progress_without_value_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/progreso")
            .with_body(json!({"converting": false}).to_string())
            .create_async()
            .await;

        let snapshot = client_for(&server).progress().await.unwrap();
        assert_eq!(snapshot, None);
    }

    #[tokio::test]
    async fn test_open_folder_reports_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/abrir-carpeta")
            .match_query(Matcher::UrlEncoded("path".into(), "/descargas/audio/Song.mp3".into()))
            .with_body(json!({"success": false, "error": "Folder not found"}).to_string())
            .create_async()
            .await;

        let err = client_for(&server)
            .open_folder("/descargas/audio/Song.mp3")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Folder not found");
    }
}
