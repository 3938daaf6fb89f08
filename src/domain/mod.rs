pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{
    CompletedDownload, DownloadOutcome, DownloadPhase, DownloadRequest, MediaFormat, PreviewInfo,
    ProgressSnapshot, Quality, Thumbnail,
};
