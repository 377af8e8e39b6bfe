// ============================================================
// KEYWORD INTEGRITY CHECK
// ============================================================
// All-or-nothing gate: a repeated value in any keyword slot column
// aborts generation before a single row is produced

use std::collections::HashMap;

use tracing::{info, warn};

use crate::domain::error::{DuplicateKeyword, DuplicateReport};
use crate::domain::survey::{column_letter, SlotRange, SurveyTable};

pub struct KeywordIntegrityChecker {
    slots: SlotRange,
}

impl KeywordIntegrityChecker {
    pub fn new(slots: SlotRange) -> Self {
        Self { slots }
    }

    /// Scan every keyword slot column; the report is empty when the survey is clean
    pub fn check(&self, table: &SurveyTable) -> DuplicateReport {
        let mut report = DuplicateReport::default();

        for col in self.slots.clamp_to(table.width()) {
            let values = table.non_blank_values(col);

            // Counts keyed by value, order kept by first occurrence
            let mut counts: HashMap<&str, usize> = HashMap::new();
            let mut order: Vec<&str> = Vec::new();
            for &value in &values {
                let count = counts.entry(value).or_insert(0);
                if *count == 0 {
                    order.push(value);
                }
                *count += 1;
            }

            if values.len() == order.len() {
                continue;
            }

            let letter = column_letter(col);
            let header = table.header(col).unwrap_or_default().to_string();
            warn!(column = %letter, header = %header, "Keyword slot column has duplicate keywords");

            for value in order {
                let count = counts[value];
                if count > 1 {
                    warn!(column = %letter, keyword = %value, count, "Duplicate keyword");
                    report.duplicates.push(DuplicateKeyword {
                        column_letter: letter.clone(),
                        header: header.clone(),
                        value: value.to_string(),
                        count,
                    });
                }
            }
        }

        if report.is_empty() {
            info!("Keyword slots contain no duplicates");
        }
        report
    }
}
