//! Campaign extraction
//!
//! Pulls the distinct campaign names out of a survey (first appearance
//! order) and resolves each campaign's attribute tuple from the first row
//! that names it.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::survey::{
    is_blank, Campaign, CampaignAttributes, CampaignDefaults, InputColumns, SurveyTable,
};

/// Column positions of the four attribute columns
struct AttributeColumns {
    unit_bid: usize,
    sku: usize,
    group_bid: usize,
    daily_budget: usize,
}

/// Output of the extractor: campaigns in first-seen order plus any warnings
#[derive(Debug, Clone)]
pub struct ExtractedCampaigns {
    pub campaigns: Vec<Campaign>,
    pub warnings: Vec<String>,
}

pub struct CampaignExtractor<'a> {
    columns: &'a InputColumns,
    defaults: &'a CampaignDefaults,
}

impl<'a> CampaignExtractor<'a> {
    pub fn new(columns: &'a InputColumns, defaults: &'a CampaignDefaults) -> Self {
        Self { columns, defaults }
    }

    /// Extract distinct, non-blank campaigns with their attributes
    pub fn extract(&self, table: &SurveyTable) -> Result<ExtractedCampaigns> {
        let name_col = table.find_column(&self.columns.campaign_name).ok_or_else(|| {
            AppError::MissingColumn(format!(
                "campaign name (looked for {})",
                self.columns.campaign_name.join(", ")
            ))
        })?;

        let mut warnings = Vec::new();
        let attribute_columns = match self.attribute_columns(table) {
            Ok(columns) => Some(columns),
            Err(missing) => {
                let message = format!(
                    "missing attribute columns [{}], using defaults for every campaign",
                    missing.join(", ")
                );
                warn!(missing = ?missing, "Attribute columns missing, falling back to defaults");
                warnings.push(message);
                None
            }
        };

        let mut seen = HashSet::new();
        let mut first_row: HashMap<String, usize> = HashMap::new();
        let mut names = Vec::new();

        for (row_idx, name) in table.column(name_col).enumerate() {
            if is_blank(name) {
                continue;
            }
            let name = name.trim().to_string();
            if seen.insert(name.clone()) {
                first_row.insert(name.clone(), row_idx);
                names.push(name);
            } else {
                debug!(campaign = %name, row = row_idx + 2, "Repeated campaign row ignored for attributes");
            }
        }

        let campaigns: Vec<Campaign> = names
            .into_iter()
            .map(|name| {
                let attributes = match (&attribute_columns, first_row.get(&name)) {
                    (Some(cols), Some(&row)) => self.attributes_from_row(table, row, cols),
                    _ => self.default_attributes(),
                };
                Campaign { name, attributes }
            })
            .collect();

        info!(
            count = campaigns.len(),
            campaigns = ?campaigns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "Extracted campaigns"
        );

        Ok(ExtractedCampaigns { campaigns, warnings })
    }

    /// Locate all four attribute columns, or report which are absent
    fn attribute_columns(
        &self,
        table: &SurveyTable,
    ) -> std::result::Result<AttributeColumns, Vec<String>> {
        let lookups = [
            &self.columns.unit_bid,
            &self.columns.sku,
            &self.columns.group_bid,
            &self.columns.daily_budget,
        ];

        let found: Vec<Option<usize>> = lookups.iter().map(|a| table.find_column(a)).collect();
        let missing: Vec<String> = lookups
            .iter()
            .zip(&found)
            .filter(|(_, idx)| idx.is_none())
            .map(|(aliases, _)| aliases.first().cloned().unwrap_or_default())
            .collect();

        match found.as_slice() {
            [Some(unit_bid), Some(sku), Some(group_bid), Some(daily_budget)] => {
                Ok(AttributeColumns {
                    unit_bid: *unit_bid,
                    sku: *sku,
                    group_bid: *group_bid,
                    daily_budget: *daily_budget,
                })
            }
            _ => Err(missing),
        }
    }

    fn attributes_from_row(
        &self,
        table: &SurveyTable,
        row: usize,
        cols: &AttributeColumns,
    ) -> CampaignAttributes {
        let defaults = self.default_attributes();
        let pick = |col: usize, fallback: String| -> String {
            match table.cell(row, col) {
                Some(value) if !is_blank(value) => value.trim().to_string(),
                _ => fallback,
            }
        };

        CampaignAttributes {
            unit_bid: pick(cols.unit_bid, defaults.unit_bid),
            sku: pick(cols.sku, defaults.sku),
            group_bid: pick(cols.group_bid, defaults.group_bid),
            daily_budget: pick(cols.daily_budget, defaults.daily_budget),
        }
    }

    pub fn default_attributes(&self) -> CampaignAttributes {
        CampaignAttributes {
            unit_bid: self.defaults.unit_bid.to_string(),
            sku: self.defaults.sku.clone(),
            group_bid: self.defaults.group_bid.to_string(),
            daily_budget: self.defaults.daily_budget.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: &[&str] = &["广告活动名称", "CPC", "SKU", "广告组默认竞价", "预算"];

    fn extract(table: &SurveyTable) -> ExtractedCampaigns {
        let columns = InputColumns::default();
        let defaults = CampaignDefaults::default();
        CampaignExtractor::new(&columns, &defaults)
            .extract(table)
            .unwrap()
    }

    #[test]
    fn test_blank_names_are_skipped_and_order_kept() {
        let table = SurveyTable::from_strs(
            HEADERS,
            &[
                &["Host-Exact-EU", "0.7", "SKU-A", "0.8", "20"],
                &["", "1", "x", "1", "1"],
                &["   ", "1", "x", "1", "1"],
                &["Case Broad US", "0.4", "SKU-B", "0.5", "10"],
            ],
        );
        let result = extract(&table);
        let names: Vec<&str> = result.campaigns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Host-Exact-EU", "Case Broad US"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_names_are_trimmed_before_comparison() {
        let table = SurveyTable::from_strs(
            HEADERS,
            &[
                &[" Tape-Broad ", "0.3", "SKU-T", "0.4", "8"],
                &["Tape-Broad", "9", "SKU-Z", "9", "99"],
            ],
        );
        let result = extract(&table);
        assert_eq!(result.campaigns.len(), 1);
        assert_eq!(result.campaigns[0].name, "Tape-Broad");
    }

    #[test]
    fn test_first_row_wins_for_attributes() {
        let table = SurveyTable::from_strs(
            HEADERS,
            &[
                &["Tape-Broad", "0.3", "SKU-T", "0.4", "8"],
                &["Tape-Broad", "9", "SKU-Z", "9", "99"],
            ],
        );
        let campaign = &extract(&table).campaigns[0];
        assert_eq!(
            campaign.attributes,
            CampaignAttributes {
                unit_bid: "0.3".into(),
                sku: "SKU-T".into(),
                group_bid: "0.4".into(),
                daily_budget: "8".into(),
            }
        );
    }

    #[test]
    fn test_missing_attribute_column_uses_defaults_for_all() {
        // No budget column: available CPC/SKU values must not be applied either
        let table = SurveyTable::from_strs(
            &["广告活动名称", "CPC", "SKU", "广告组默认竞价"],
            &[&["Host-Exact-EU", "0.9", "SKU-H", "1.1"]],
        );
        let result = extract(&table);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("预算"));
        assert_eq!(
            result.campaigns[0].attributes,
            CampaignAttributes {
                unit_bid: "0.5".into(),
                sku: "SKU-1".into(),
                group_bid: "0.6".into(),
                daily_budget: "12".into(),
            }
        );
    }

    #[test]
    fn test_blank_attribute_cell_falls_back_per_field() {
        let table = SurveyTable::from_strs(HEADERS, &[&["Case Broad US", "", "SKU-C", "0.9", ""]]);
        let attrs = &extract(&table).campaigns[0].attributes;
        assert_eq!(attrs.unit_bid, "0.5");
        assert_eq!(attrs.sku, "SKU-C");
        assert_eq!(attrs.daily_budget, "12");
    }

    #[test]
    fn test_english_headers_are_accepted() {
        let table = SurveyTable::from_strs(
            &["campaign-name", "unit-bid", "SKU", "ad-group-default-bid", "daily-budget"],
            &[&["Host-Exact-EU", "0.7", "SKU-A", "0.8", "20"]],
        );
        let result = extract(&table);
        assert!(result.warnings.is_empty());
        assert_eq!(result.campaigns[0].attributes.daily_budget, "20");
    }

    #[test]
    fn test_missing_campaign_column_is_an_error() {
        let table = SurveyTable::from_strs(&["CPC"], &[&["0.5"]]);
        let columns = InputColumns::default();
        let defaults = CampaignDefaults::default();
        let err = CampaignExtractor::new(&columns, &defaults)
            .extract(&table)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingColumn(_)));
    }
}
