// ============================================================
// CSV SURVEY PARSER
// ============================================================
// Parse CSV surveys with encoding and delimiter detection

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::domain::error::AppError;
use crate::domain::survey::SurveyTable;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV survey parser
pub struct CsvSurveyParser {
    /// Delimiter character, detected from the content when unset
    delimiter: Option<u8>,

    /// Whether to trim whitespace from values
    trim: bool,
}

impl Default for CsvSurveyParser {
    fn default() -> Self {
        Self {
            delimiter: None,
            trim: false,
        }
    }
}

impl CsvSurveyParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set whether to trim whitespace
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Decode raw bytes and parse them as a survey
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<SurveyTable, AppError> {
        let content = decode(bytes);
        self.parse_content(&content)
    }

    /// Parse CSV content from string
    pub fn parse_content(&self, content: &str) -> Result<SurveyTable, AppError> {
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true) // Allow rows with different lengths
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::UnreadableInput(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(AppError::UnreadableInput("CSV has no header row".to_string()));
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::UnreadableInput(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            let row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            rows.push(row);
        }

        debug!(
            delimiter = %(delimiter as char),
            rows = rows.len(),
            columns = headers.len(),
            "Parsed CSV survey"
        );

        Ok(SurveyTable::new(headers, rows))
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        let sample_lines: Vec<_> = content.lines().take(10).collect();
        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

/// UTF-8 (BOM stripped) when valid, otherwise GB18030 as written by Excel on Chinese systems
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(content) => content.to_string(),
        Err(_) => {
            let (content, _, had_errors) = encoding_rs::GB18030.decode(bytes);
            if had_errors {
                debug!("CSV is neither UTF-8 nor GB18030, replacement characters inserted");
            }
            content.into_owned()
        }
    }
}
