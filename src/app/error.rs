use thiserror::Error;

#[derive(Error, Debug)]
pub enum CasaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot add post, {} is not writable", .0.display())]
    NotWritable(std::path::PathBuf),

    #[error("Editor exited with {0}")]
    Editor(std::process::ExitStatus),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CasaError>;
