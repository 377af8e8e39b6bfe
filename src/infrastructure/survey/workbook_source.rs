// ============================================================
// WORKBOOK SURVEY PARSER
// ============================================================
// Read the first worksheet of an xlsx/xlsm/xlsb/xls/ods workbook

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Range, Reader};
use tracing::debug;

use crate::domain::error::AppError;
use crate::domain::survey::SurveyTable;

/// Parse workbook bytes into a survey table.
///
/// Cells keep their sheet-absolute column index: a sheet whose used range
/// starts at column C still reports its first value at index 2, so the
/// fixed keyword slot positions line up.
pub fn parse_workbook(bytes: &[u8]) -> Result<SurveyTable, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::UnreadableInput(format!("Failed to open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::UnreadableInput("No worksheet found".to_string()))?
        .map_err(|e| AppError::UnreadableInput(format!("Failed to read worksheet: {}", e)))?;

    table_from_range(&range)
}

fn table_from_range(range: &Range<Data>) -> Result<SurveyTable, AppError> {
    let (_, start_col) = range
        .start()
        .ok_or_else(|| AppError::UnreadableInput("Worksheet is empty".to_string()))?;
    let offset = start_col as usize;

    let mut rows = range.rows().map(|row| {
        let mut values = vec![String::new(); offset];
        values.extend(row.iter().map(cell_text));
        values
    });

    let headers = rows
        .next()
        .ok_or_else(|| AppError::UnreadableInput("Worksheet is empty".to_string()))?;

    let rows: Vec<Vec<String>> = rows
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .collect();

    debug!(
        first_column = offset,
        rows = rows.len(),
        columns = headers.len(),
        "Parsed workbook survey"
    );

    Ok(SurveyTable::new(headers, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other
            .as_string()
            .unwrap_or_else(|| format!("{}", other)),
    }
}
