//! Row expansion
//!
//! Turns one classified campaign into its bulk rows, always in this order:
//! bid adjustment, campaign, ad group, product ad, keywords, negative
//! keywords, product targets, negative product targets.

use std::collections::HashSet;

use tracing::debug;

use crate::application::use_cases::campaign_classifier::qualifier_tokens;
use crate::domain::survey::{
    BulkRow, Campaign, CampaignPlan, Classification, EntityLevel, GenerationConfig,
    MatchType, NegativeAsinScope, SurveyTable, Vocabulary,
};

/// Deduplicate values keeping the first occurrence of each
pub fn dedup_preserving_order<'v, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'v str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Rows for one campaign plus what was decided while building them
#[derive(Debug, Clone)]
pub struct Expansion {
    pub rows: Vec<BulkRow>,
    pub plan: CampaignPlan,
}

pub struct RowExpander<'a> {
    table: &'a SurveyTable,
    config: &'a GenerationConfig,
    vocab: &'static Vocabulary,
    negative_asin_column: Option<usize>,
}

impl<'a> RowExpander<'a> {
    pub fn new(table: &'a SurveyTable, config: &'a GenerationConfig) -> Self {
        Self {
            table,
            config,
            vocab: config.locale.vocabulary(),
            negative_asin_column: table.find_column(&config.columns.negative_asin),
        }
    }

    pub fn expand(&self, campaign: &Campaign, classification: &Classification) -> Expansion {
        let match_type = classification.match_type;
        let category = classification.category.as_deref();
        let mut rows = Vec::new();

        rows.push(self.bid_adjustment_row(campaign, match_type));
        rows.push(self.campaign_row(campaign));
        rows.push(self.ad_group_row(campaign));
        rows.push(self.product_ad_row(campaign));

        // Keywords
        let (keyword_columns, keywords) = match category {
            Some(category) if match_type.is_keyword() => {
                self.keywords_for(category, match_type)
            }
            _ => (Vec::new(), Vec::new()),
        };
        let keyword_match = match match_type {
            MatchType::Exact => self.vocab.match_exact,
            _ => self.vocab.match_broad,
        };
        for keyword in &keywords {
            let mut row = self.group_row(campaign, EntityLevel::Keyword);
            row.bid = campaign.attributes.unit_bid.clone();
            row.keyword_text = keyword.clone();
            row.match_type = keyword_match.to_string();
            rows.push(row);
        }

        // Negative keywords
        let (negative_exact, negative_phrase) = if match_type.is_keyword() {
            self.negative_keywords_for(match_type, category)
        } else {
            (Vec::new(), Vec::new())
        };
        for (terms, label) in [
            (&negative_exact, self.vocab.negative_exact),
            (&negative_phrase, self.vocab.negative_phrase),
        ] {
            for term in terms {
                let mut row = self.group_row(campaign, EntityLevel::NegativeKeyword);
                row.keyword_text = term.clone();
                row.match_type = label.to_string();
                rows.push(row);
            }
        }

        // Product targets
        let product_targets = if match_type == MatchType::ProductTarget {
            self.product_targets_for(&campaign.name)
        } else {
            Vec::new()
        };
        for asin in &product_targets {
            let mut row = self.group_row(campaign, EntityLevel::ProductTargeting);
            row.bid = campaign.attributes.unit_bid.clone();
            row.expanded_product_targeting_id = asin_expression(asin);
            rows.push(row);
        }

        let negative_targets = match self.config.negative_asin_scope {
            NegativeAsinScope::AllCampaigns => self.negative_product_targets(),
            NegativeAsinScope::ProductTarget if match_type == MatchType::ProductTarget => {
                self.negative_product_targets()
            }
            NegativeAsinScope::ProductTarget => Vec::new(),
        };
        for asin in &negative_targets {
            let mut row = self.group_row(campaign, EntityLevel::NegativeProductTargeting);
            row.expanded_product_targeting_id = asin_expression(asin);
            rows.push(row);
        }

        debug!(
            campaign = %campaign.name,
            keywords = keywords.len(),
            negative_exact = negative_exact.len(),
            negative_phrase = negative_phrase.len(),
            product_targets = product_targets.len(),
            negative_product_targets = negative_targets.len(),
            rows = rows.len(),
            "Expanded campaign"
        );

        Expansion {
            rows,
            plan: CampaignPlan {
                name: campaign.name.clone(),
                classification: classification.clone(),
                keyword_columns,
                keywords: keywords.len(),
                negative_exact: negative_exact.len(),
                negative_phrase: negative_phrase.len(),
                product_targets: product_targets.len(),
                negative_product_targets: negative_targets.len(),
            },
        }
    }

    /// Keyword slot headers holding both the category and the match-type qualifier,
    /// and their combined, deduplicated values
    pub fn keywords_for(&self, category: &str, match_type: MatchType) -> (Vec<String>, Vec<String>) {
        let qualifiers = qualifier_tokens(match_type);
        let mut headers = Vec::new();
        let mut values = Vec::new();

        for col in self.config.layout.keyword_slots.clamp_to(self.table.width()) {
            let header = self.table.header(col).unwrap_or_default();
            let lower = header.to_lowercase();
            if lower.contains(category) && qualifiers.iter().any(|q| lower.contains(q)) {
                headers.push(header.to_string());
                values.extend(self.table.non_blank_values(col));
            }
        }

        (headers, dedup_preserving_order(values))
    }

    /// Negative-exact and negative-phrase terms for a keyword campaign
    pub fn negative_keywords_for(
        &self,
        match_type: MatchType,
        category: Option<&str>,
    ) -> (Vec<String>, Vec<String>) {
        match self.config.layout.negative_columns(match_type, category) {
            Some(pair) => (
                dedup_preserving_order(self.table.non_blank_values(pair.exact)),
                dedup_preserving_order(self.table.non_blank_values(pair.phrase)),
            ),
            None => (Vec::new(), Vec::new()),
        }
    }

    /// Trimmed values of the column whose header is exactly the campaign name
    pub fn product_targets_for(&self, campaign_name: &str) -> Vec<String> {
        match self.table.column_index(campaign_name) {
            Some(col) => self.asins_in(col),
            None => {
                debug!(campaign = %campaign_name, "No column named after product-target campaign");
                Vec::new()
            }
        }
    }

    pub fn negative_product_targets(&self) -> Vec<String> {
        self.negative_asin_column
            .map(|col| self.asins_in(col))
            .unwrap_or_default()
    }

    /// ASINs never carry whitespace, so "B1" and "B1 " are the same target
    fn asins_in(&self, col: usize) -> Vec<String> {
        dedup_preserving_order(self.table.non_blank_values(col).into_iter().map(str::trim))
    }

    fn base_row(&self, campaign: &Campaign, entity: EntityLevel) -> BulkRow {
        BulkRow {
            entity: Some(entity),
            product: self.vocab.product.to_string(),
            entity_level: self.vocab.entity_level(entity).to_string(),
            operation: self.vocab.operation.to_string(),
            campaign_id: campaign.name.clone(),
            campaign_name: campaign.name.clone(),
            ..Default::default()
        }
    }

    /// Row scoped to the campaign's single ad group, enabled
    fn group_row(&self, campaign: &Campaign, entity: EntityLevel) -> BulkRow {
        BulkRow {
            ad_group_id: campaign.name.clone(),
            ad_group_name: campaign.name.clone(),
            status: self.vocab.status_enabled.to_string(),
            ..self.base_row(campaign, entity)
        }
    }

    fn bid_adjustment_row(&self, campaign: &Campaign, match_type: MatchType) -> BulkRow {
        let placement = if match_type == MatchType::ProductTarget {
            self.vocab.placement_product_page
        } else {
            self.vocab.placement_top_of_search
        };
        BulkRow {
            ad_group_name: campaign.name.clone(),
            targeting_type: self.vocab.targeting_manual.to_string(),
            bidding_strategy: self.vocab.bidding_strategy.to_string(),
            placement: placement.to_string(),
            percentage: self.config.bid_adjustment_percentage.clone(),
            ..self.base_row(campaign, EntityLevel::BidAdjustment)
        }
    }

    fn campaign_row(&self, campaign: &Campaign) -> BulkRow {
        BulkRow {
            targeting_type: self.vocab.targeting_manual.to_string(),
            status: self.vocab.status_enabled.to_string(),
            daily_budget: campaign.attributes.daily_budget.clone(),
            bidding_strategy: self.vocab.bidding_strategy.to_string(),
            ..self.base_row(campaign, EntityLevel::Campaign)
        }
    }

    fn ad_group_row(&self, campaign: &Campaign) -> BulkRow {
        BulkRow {
            ad_group_default_bid: campaign.attributes.group_bid.clone(),
            ..self.group_row(campaign, EntityLevel::AdGroup)
        }
    }

    fn product_ad_row(&self, campaign: &Campaign) -> BulkRow {
        BulkRow {
            sku: campaign.attributes.sku.clone(),
            ..self.group_row(campaign, EntityLevel::ProductAd)
        }
    }
}

fn asin_expression(asin: &str) -> String {
    format!("asin=\"{}\"", asin)
}
