use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} not found")]
    NotFound { entity: String },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed save data: {reason}")]
    SaveFormat { reason: String },

    #[error("Save version {found} is newer than supported version {supported}")]
    UnsupportedSaveVersion { found: u32, supported: u32 },

    #[error("Could not determine project directories")]
    NoProjectDirs,
}

impl AppError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::NotFound { entity: entity.into() }
    }

    pub(crate) fn save_format(reason: impl Into<String>) -> Self {
        AppError::SaveFormat { reason: reason.into() }
    }
}

// For CLI output - converts AppError to String
impl From<AppError> for String {
    fn from(e: AppError) -> Self {
        e.to_string()
    }
}

/// Check if an I/O error is a short read, which in a save file means truncation
pub fn is_truncation(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::UnexpectedEof
}
