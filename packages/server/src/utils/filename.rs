/// Longest original filename accepted, in characters.
pub const MAX_FILENAME_LEN: usize = 255;

/// Why a client-supplied upload filename was rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains null bytes.
    NullByte,
    /// Filename contains control characters (CR, LF, etc.).
    ControlCharacter,
    /// Filename is longer than [`MAX_FILENAME_LEN`].
    TooLong,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
            Self::TooLong => "Invalid filename: name is too long",
        }
    }
}

/// Reduce a multipart filename to its final component and validate it.
///
/// Some clients send the full local path (`C:\Users\me\buyers.csv`); only
/// the part after the last separator is kept.
pub fn clean_upload_filename(filename: &str) -> Result<&str, FilenameError> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    if base.is_empty() {
        return Err(FilenameError::Empty);
    }

    if base.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    // The name is echoed back in responses and logs.
    if base.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if base.chars().count() > MAX_FILENAME_LEN {
        return Err(FilenameError::TooLong);
    }

    Ok(base)
}
