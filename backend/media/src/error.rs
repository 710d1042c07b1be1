use thiserror::Error;

/// Errors raised while uploading or converting media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not detect the file type of the upload")]
    UnknownFileType,

    #[error("upload response did not contain a file url")]
    MissingUploadUrl,

    #[error("conversion page is missing {0}")]
    MissingField(&'static str),

    #[error("invalid output url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
