use tracing::{error, info};

use crate::{
    api::ApiClient,
    domain::{AppError, CompletedDownload},
    utils::{folder_request_path, sanitize_file_name},
};

/// Post-download commands executed by the server on its own machine.
#[derive(Clone)]
pub struct ActionDispatcher {
    api_client: ApiClient,
}

impl ActionDispatcher {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    pub async fn open_file(&self, download: &CompletedDownload) -> Result<(), AppError> {
        let name = sanitize_file_name(&download.sanitized_file_name);
        info!(file = %name, format = download.format.wire_name(), "opening file");

        self.api_client
            .open_file(&name, download.format)
            .await
            .map_err(|e| {
                error!(file = %name, error = %e, "could not open file");
                AppError::from(e)
            })
    }

    pub async fn open_folder(&self, path: &str) -> Result<(), AppError> {
        let path = folder_request_path(path);
        info!(path = %path, "opening folder");

        self.api_client.open_folder(&path).await.map_err(|e| {
            error!(path = %path, error = %e, "could not open folder");
            AppError::from(e)
        })
    }
}

/// Text for the blocking alert shown when an action fails.
pub fn action_failure_text(action: &str, err: &AppError) -> String {
    match err {
        AppError::Rejected(message) => format!("Could not open the {}: {}", action, message),
        _ => format!("Error while trying to open the {}", action),
    }
}
