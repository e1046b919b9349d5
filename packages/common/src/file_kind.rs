use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Extensions accepted for upload, lowercase with leading dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".csv", ".xls", ".xlsx"];

/// Content types accepted for upload.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "text/csv",
    "application/csv",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/octet-stream",
];

/// The decoder a file is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    Csv,
    Excel,
}

impl FileKind {
    /// Pick a decoder from the original file name and declared content type.
    ///
    /// The extension decides when it is recognized; otherwise the content
    /// type is consulted. Returns `None` when neither identifies a
    /// spreadsheet.
    pub fn detect(file_name: &str, mime_type: Option<&str>) -> Option<Self> {
        match extension(file_name).as_deref() {
            Some(".csv") => return Some(Self::Csv),
            Some(".xls" | ".xlsx") => return Some(Self::Excel),
            _ => {}
        }

        let mime = mime_type?.to_ascii_lowercase();
        if mime.contains("csv") {
            Some(Self::Csv)
        } else if mime.contains("spreadsheetml") || mime.contains("ms-excel") {
            Some(Self::Excel)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased extension of `file_name` including the dot, if any.
pub fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
}

/// Upload gate: both the extension and the declared content type must be on
/// their allow-lists.
pub fn is_allowed_upload(file_name: &str, mime_type: &str) -> bool {
    let ext_ok = extension(file_name)
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
    let mime = mime_type.to_ascii_lowercase();
    let mime_ok = ALLOWED_MIME_TYPES
        .iter()
        .any(|allowed| mime.split(';').next().map(str::trim) == Some(*allowed));
    ext_ok && mime_ok
}
