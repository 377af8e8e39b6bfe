// ============================================================
// GENERATION CONFIGURATION
// ============================================================
// Everything the generator needs besides the survey itself

use serde::{Deserialize, Serialize};

use super::bulk_row::OutputLocale;
use super::column_layout::ColumnLayout;

/// Accepted header spellings for the named survey columns, first match wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputColumns {
    pub campaign_name: Vec<String>,
    pub unit_bid: Vec<String>,
    pub sku: Vec<String>,
    pub group_bid: Vec<String>,
    pub daily_budget: Vec<String>,
    pub negative_asin: Vec<String>,
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for InputColumns {
    fn default() -> Self {
        Self {
            campaign_name: names(&["广告活动名称", "campaign-name", "Campaign Name"]),
            unit_bid: names(&["CPC", "unit-bid"]),
            sku: names(&["SKU"]),
            group_bid: names(&["广告组默认竞价", "ad-group-default-bid"]),
            daily_budget: names(&["预算", "daily-budget", "budget"]),
            negative_asin: names(&["否定ASIN", "negative-ASIN"]),
        }
    }
}

/// Attribute values used when the survey does not provide them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDefaults {
    pub unit_bid: f64,
    pub sku: String,
    pub group_bid: f64,
    pub daily_budget: f64,
}

impl Default for CampaignDefaults {
    fn default() -> Self {
        Self {
            unit_bid: 0.5,
            sku: "SKU-1".to_string(),
            group_bid: 0.6,
            daily_budget: 12.0,
        }
    }
}

/// Which campaigns receive negative product-targeting rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NegativeAsinScope {
    #[default]
    ProductTarget,
    AllCampaigns,
}

/// Configuration for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub layout: ColumnLayout,
    pub columns: InputColumns,
    pub defaults: CampaignDefaults,

    /// Category tokens always known, besides those found in headers
    pub seed_categories: Vec<String>,

    /// Minimum length (in characters) of a category fragment taken from a header
    pub min_category_len: usize,

    pub negative_asin_scope: NegativeAsinScope,

    /// Percentage written on every bid-adjustment row
    pub bid_adjustment_percentage: String,

    pub locale: OutputLocale,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            layout: ColumnLayout::default(),
            columns: InputColumns::default(),
            defaults: CampaignDefaults::default(),
            seed_categories: names(&["suzhu", "host", "宿主", "case", "包", "tape"]),
            min_category_len: 2,
            negative_asin_scope: NegativeAsinScope::default(),
            bid_adjustment_percentage: "900".to_string(),
            locale: OutputLocale::default(),
        }
    }
}

impl GenerationConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        self.layout.validate()?;
        if self.min_category_len == 0 {
            return Err("min_category_len must be > 0".to_string());
        }
        if self.columns.campaign_name.is_empty() {
            return Err("columns.campaign_name needs at least one header name".to_string());
        }
        if self.defaults.sku.trim().is_empty() {
            return Err("defaults.sku must not be blank".to_string());
        }
        for (field, value) in [
            ("unit_bid", self.defaults.unit_bid),
            ("group_bid", self.defaults.group_bid),
            ("daily_budget", self.defaults.daily_budget),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("defaults.{} must be a non-negative number", field));
            }
        }
        Ok(())
    }
}
