// file_path: src/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotrError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Upload file not found: {0}")]
    FileNotFound(String),

    #[error("Response decode error: {0}")]
    DecodeError(#[from] serde_json::Error),
}

// reqwest 错误统一归为网络错误
impl From<reqwest::Error> for BotrError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BotrError>;
