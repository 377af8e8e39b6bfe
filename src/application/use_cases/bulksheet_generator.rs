// ============================================================
// BULK SHEET GENERATOR USE CASE
// ============================================================
// Orchestrate extraction, the duplicate gate, category resolution,
// classification and expansion for one survey

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::application::use_cases::campaign_classifier::CampaignClassifier;
use crate::application::use_cases::campaign_extractor::CampaignExtractor;
use crate::application::use_cases::category_resolver::CategoryResolver;
use crate::application::use_cases::keyword_integrity::KeywordIntegrityChecker;
use crate::application::use_cases::row_expander::RowExpander;
use crate::domain::error::{AppError, DuplicateReport, Result};
use crate::domain::survey::{
    BulkSheet, Campaign, Classification, GenerationConfig, GenerationSummary, SurveyTable,
};

/// A campaign with the classifier's verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedCampaign {
    pub campaign: Campaign,
    pub classification: Classification,
}

/// Everything decided before any row is emitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyPlan {
    pub campaigns: Vec<PlannedCampaign>,
    pub categories: Vec<String>,
    pub duplicates: DuplicateReport,
    pub warnings: Vec<String>,
}

/// Survey to bulk sheet use case.
///
/// Holds configuration only; every call builds fresh extractor, resolver
/// and classifier state, so runs never leak into each other.
pub struct BulkSheetGenerator {
    config: GenerationConfig,
}

impl BulkSheetGenerator {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        config.validate().map_err(|e| {
            AppError::ValidationError(format!("Invalid generation config: {}", e))
        })?;
        Ok(Self { config })
    }

    /// Extract, check and classify without emitting rows
    pub fn plan(&self, table: &SurveyTable) -> Result<SurveyPlan> {
        info!(
            rows = table.row_count(),
            columns = table.width(),
            headers = ?table.headers(),
            "Planning survey"
        );

        let extracted = CampaignExtractor::new(&self.config.columns, &self.config.defaults)
            .extract(table)?;

        let duplicates = KeywordIntegrityChecker::new(self.config.layout.keyword_slots).check(table);

        let categories = CategoryResolver::new(
            &self.config.seed_categories,
            self.config.min_category_len,
        )
        .resolve(table.headers());
        let classifier = CampaignClassifier::new(&categories);

        let campaigns = extracted
            .campaigns
            .into_iter()
            .map(|campaign| {
                let classification = classifier.classify(&campaign.name);
                PlannedCampaign {
                    campaign,
                    classification,
                }
            })
            .collect();

        Ok(SurveyPlan {
            campaigns,
            categories: categories.into_iter().collect(),
            duplicates,
            warnings: extracted.warnings,
        })
    }

    /// Generate the bulk sheet, or fail without producing any rows
    pub fn generate(&self, table: &SurveyTable) -> Result<BulkSheet> {
        let start = Instant::now();
        let plan = self.plan(table)?;

        if !plan.duplicates.is_empty() {
            warn!(
                duplicates = plan.duplicates.duplicates.len(),
                "Duplicate keywords found, nothing generated"
            );
            return Err(AppError::DuplicateKeywords(plan.duplicates));
        }

        let expander = RowExpander::new(table, &self.config);
        let mut rows = Vec::new();
        let mut plans = Vec::with_capacity(plan.campaigns.len());

        for planned in &plan.campaigns {
            let expansion = expander.expand(&planned.campaign, &planned.classification);
            rows.extend(expansion.rows);
            plans.push(expansion.plan);
        }

        let mut rows_per_entity = BTreeMap::new();
        for row in &rows {
            if let Some(entity) = row.entity {
                *rows_per_entity.entry(entity).or_insert(0) += 1;
            }
        }

        info!(
            campaigns = plans.len(),
            rows = rows.len(),
            per_entity = ?rows_per_entity,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Bulk sheet generated"
        );

        Ok(BulkSheet {
            locale: self.config.locale,
            rows,
            summary: GenerationSummary {
                campaign_count: plans.len(),
                categories: plan.categories,
                plans,
                rows_per_entity,
                warnings: plan.warnings,
            },
        })
    }
}
