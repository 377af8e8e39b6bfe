// ============================================================
// SURVEY INFRASTRUCTURE LAYER
// ============================================================
// Load a survey file (workbook or CSV) into a SurveyTable

mod csv_source;
mod workbook_source;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::survey::SurveyTable;

pub use csv_source::CsvSurveyParser;
pub use workbook_source::parse_workbook;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyFormat {
    Workbook,
    Csv,
}

impl SurveyFormat {
    /// Format implied by the file extension, if it is a known one
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SurveyFormat::Workbook),
            "csv" | "tsv" | "txt" => Some(SurveyFormat::Csv),
            _ => None,
        }
    }

    /// Guess from leading bytes: zip containers and OLE compound files are workbooks
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            SurveyFormat::Workbook
        } else {
            SurveyFormat::Csv
        }
    }
}

impl fmt::Display for SurveyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurveyFormat::Workbook => write!(f, "workbook"),
            SurveyFormat::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Default)]
pub struct SurveyReader {
    csv: CsvSurveyParser,
}

impl SurveyReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_csv_parser(mut self, csv: CsvSurveyParser) -> Self {
        self.csv = csv;
        self
    }

    /// Read a survey from disk; the extension decides the format, unknown
    /// extensions fall back to sniffing the content
    pub fn read_path(&self, path: &Path) -> Result<SurveyTable> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::UnreadableInput(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let format = SurveyFormat::from_path(path).unwrap_or_else(|| SurveyFormat::sniff(&bytes));

        info!(path = %path.display(), format = %format, bytes = bytes.len(), "Reading survey");
        self.read_bytes(&bytes, format)
    }

    pub fn read_bytes(&self, bytes: &[u8], format: SurveyFormat) -> Result<SurveyTable> {
        if bytes.is_empty() {
            return Err(AppError::UnreadableInput("Input is empty".to_string()));
        }

        match format {
            SurveyFormat::Workbook => parse_workbook(bytes),
            SurveyFormat::Csv => self.csv.parse_bytes(bytes),
        }
    }

    /// Read bytes of unknown origin, e.g. an HTTP upload
    pub fn read_sniffed(&self, bytes: &[u8]) -> Result<SurveyTable> {
        self.read_bytes(bytes, SurveyFormat::sniff(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SurveyFormat::from_path(Path::new("survey.XLSX")),
            Some(SurveyFormat::Workbook)
        );
        assert_eq!(
            SurveyFormat::from_path(Path::new("survey.ods")),
            Some(SurveyFormat::Workbook)
        );
        assert_eq!(
            SurveyFormat::from_path(Path::new("survey.csv")),
            Some(SurveyFormat::Csv)
        );
        assert_eq!(SurveyFormat::from_path(Path::new("survey")), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(SurveyFormat::sniff(b"PK\x03\x04rest"), SurveyFormat::Workbook);
        assert_eq!(SurveyFormat::sniff(OLE_MAGIC), SurveyFormat::Workbook);
        assert_eq!(SurveyFormat::sniff("广告活动名称,SKU".as_bytes()), SurveyFormat::Csv);
    }

    #[test]
    fn test_empty_input_is_unreadable() {
        assert!(matches!(
            SurveyReader::new().read_sniffed(&[]),
            Err(AppError::UnreadableInput(_))
        ));
    }

    #[test]
    fn test_read_sniffed_csv() {
        let table = SurveyReader::new()
            .read_sniffed("广告活动名称;SKU\nHost-Exact;SKU-1".as_bytes())
            .unwrap();
        assert_eq!(table.cell(0, 1), Some("SKU-1"));
    }

    #[test]
    fn test_read_missing_file() {
        let result = SurveyReader::new().read_path(Path::new("/nonexistent/survey.xlsx"));
        assert!(matches!(result, Err(AppError::UnreadableInput(_))));
    }
}
