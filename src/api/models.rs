use serde::{Deserialize, Serialize};

/// Response from the /obtener-info endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InfoResponse {
    pub success: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from the /descargar endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub sanitized_file: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from the /progreso endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgressResponse {
    /// Absent while the server has nothing to report.
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub converting: bool,
}

/// Response from /abrir-archivo and /abrir-carpeta
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}
