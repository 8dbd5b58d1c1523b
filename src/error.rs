use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid hex color: {0} (expected RRGGBB, e.g. 1a1b26)")]
    InvalidColor(String),

    #[error("invalid star speed: {0} (expected a finite number >= 0)")]
    InvalidSpeed(String),

    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;
