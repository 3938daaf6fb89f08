use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::domain::{AppError, MediaFormat};

static REPEATED_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/+").expect("separator pattern is valid"));

/// Normalizes a path before handing it to the server: drops colons and
/// double quotes, turns backslashes into forward slashes and collapses
/// repeated separators.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, ':' | '"'))
        .map(|c| if c == '\\' { '/' } else { c })
        .collect();

    REPEATED_SEPARATORS
        .replace_all(&cleaned, "/")
        .trim()
        .to_string()
}

/// Sanitized path with exactly one leading separator, as `/abrir-carpeta` expects.
pub fn folder_request_path(path: &str) -> String {
    let sanitized = sanitize_file_name(path);
    format!("/{}", sanitized.trim_start_matches('/'))
}

/// Where the server stores a finished file: `<root>/<audio|video>/<file>`.
pub fn storage_path(root: &str, format: MediaFormat, file_name: &str) -> String {
    format!("{}/{}/{}", root, format.storage_dir(), file_name)
}

/// Trims the locator and checks it is an absolute http(s) URL.
pub fn validate_locator(raw: &str) -> Result<String, AppError> {
    let locator = raw.trim();
    if locator.is_empty() {
        return Err(AppError::EmptyLocator);
    }

    let parsed = Url::parse(locator).map_err(|e| AppError::InvalidLocator(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(locator.to_string()),
        scheme => Err(AppError::InvalidLocator(format!(
            "unsupported address scheme '{}'",
            scheme
        ))),
    }
}
