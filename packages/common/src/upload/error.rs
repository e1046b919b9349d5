use std::fmt;

/// Errors raised while spooling an upload to disk.
#[derive(Debug)]
pub enum UploadError {
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The upload exceeds the configured size limit.
    TooLarge { limit: u64 },
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "upload IO error: {err}"),
            Self::TooLarge { limit } => write!(f, "upload exceeds size limit of {limit} bytes"),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::TooLarge { .. } => None,
        }
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
