use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("no contact email for user {0}")]
    MissingContact(String),

    #[error("directory lookup failed: {0}")]
    Directory(String),

    #[error("email provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type DigestResult<T> = std::result::Result<T, DigestError>;
