// ============================================================
// BULK SHEET WRITER
// ============================================================
// Render a BulkSheet as an xlsx workbook or a CSV file

use std::fmt;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::survey::{BulkSheet, NUMERIC_COLUMNS};

const SHEET_NAME: &str = "Sheet1";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            OutputFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    /// Format implied by an output path; anything but `.csv` is xlsx
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => OutputFormat::Csv,
            _ => OutputFormat::Xlsx,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

fn xlsx_error(e: XlsxError) -> AppError {
    AppError::WriteError(format!("Failed to build workbook: {}", e))
}

pub struct BulkSheetWriter {
    format: OutputFormat,
}

impl BulkSheetWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn write_to_bytes(&self, sheet: &BulkSheet) -> Result<Vec<u8>> {
        match self.format {
            OutputFormat::Xlsx => write_xlsx(sheet),
            OutputFormat::Csv => write_csv(sheet),
        }
    }

    pub fn write_to_path(&self, sheet: &BulkSheet, path: &Path) -> Result<()> {
        let bytes = self.write_to_bytes(sheet)?;
        std::fs::write(path, &bytes).map_err(|e| {
            AppError::WriteError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!(
            path = %path.display(),
            format = %self.format,
            rows = sheet.rows.len(),
            bytes = bytes.len(),
            "Bulk sheet written"
        );
        Ok(())
    }
}

fn write_xlsx(sheet: &BulkSheet) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(xlsx_error)?;

    for (col, header) in sheet.headers().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_error)?;
    }

    for (index, row) in sheet.rows.iter().enumerate() {
        let row_number = u32::try_from(index + 1)
            .map_err(|_| AppError::WriteError("Too many rows for a worksheet".to_string()))?;

        for (col, value) in row.values().iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let number = NUMERIC_COLUMNS
                .contains(&col)
                .then(|| value.trim().parse::<f64>().ok())
                .flatten()
                .filter(|n| n.is_finite());

            let written = match number {
                Some(n) => worksheet.write_number(row_number, col as u16, n),
                None => worksheet.write_string(row_number, col as u16, *value),
            };
            written.map_err(xlsx_error)?;
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

/// UTF-8 with a BOM so spreadsheet apps detect the encoding of Chinese text
fn write_csv(sheet: &BulkSheet) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());

    writer
        .write_record(sheet.headers().iter())
        .map_err(|e| AppError::WriteError(format!("Failed to write CSV header: {}", e)))?;
    for row in &sheet.rows {
        writer
            .write_record(row.values())
            .map_err(|e| AppError::WriteError(format!("Failed to write CSV row: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::WriteError(format!("Failed to flush CSV: {}", e)))
}
