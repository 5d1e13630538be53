use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchbinError>;

#[derive(Error, Debug)]
pub enum FetchbinError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed: {url}")]
    DownloadFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download failed: {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("File {path:?} has no extension")]
    NoExtension { path: PathBuf },

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Extraction failed: {path:?}: {message}")]
    ExtractionFailed { path: PathBuf, message: String },

    #[error("Archive entry {entry:?} escapes the destination directory")]
    UnsafeArchiveEntry { entry: PathBuf },

    #[error("{path:?} is not a file")]
    NotAFile { path: PathBuf },

    #[error("{path:?} is not an executable file")]
    NotExecutable { path: PathBuf },

    #[error("Permission denied: {path:?}")]
    PermissionDenied { path: PathBuf },

    #[error("{message}")]
    InstallationFailed { message: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,
}
