use serde::{Deserialize, Serialize};
use std::fmt;

/// One value that appears more than once inside a keyword slot column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateKeyword {
    /// Spreadsheet-style column letter (H, I, ..., AA)
    pub column_letter: String,
    pub header: String,
    pub value: String,
    pub count: usize,
}

/// Everything the integrity gate found, in column then first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub duplicates: Vec<DuplicateKeyword>,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty()
    }
}

impl fmt::Display for DuplicateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .duplicates
            .iter()
            .map(|d| {
                format!(
                    "'{}' x{} in column {} ({})",
                    d.value, d.count, d.column_letter, d.header
                )
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    UnreadableInput(String),
    MissingColumn(String),
    DuplicateKeywords(DuplicateReport),
    ValidationError(String),
    WriteError(String),
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::UnreadableInput(msg) => write!(f, "Unreadable input: {}", msg),
            AppError::MissingColumn(msg) => write!(f, "Missing required column: {}", msg),
            AppError::DuplicateKeywords(report) => write!(
                f,
                "Duplicate keywords detected, clean them up and retry: {}",
                report
            ),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::WriteError(msg) => write!(f, "Write error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
