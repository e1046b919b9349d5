mod service;

pub use service::{DeleteOutcome, UploadService};
