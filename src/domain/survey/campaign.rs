// ============================================================
// CAMPAIGN TYPES
// ============================================================
// A campaign, its attribute tuple, and its classification

use serde::{Deserialize, Serialize};

/// How a campaign targets shoppers, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    Exact,
    Broad,
    ProductTarget,
    None,
}

impl MatchType {
    /// Keyword campaigns emit keyword and negative-keyword sections
    pub fn is_keyword(&self) -> bool {
        matches!(self, MatchType::Exact | MatchType::Broad)
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "exact"),
            MatchType::Broad => write!(f, "broad"),
            MatchType::ProductTarget => write!(f, "product-target"),
            MatchType::None => write!(f, "none"),
        }
    }
}

/// Per-campaign values read from the survey (or the configured defaults).
///
/// Values stay as text so they are emitted exactly as the survey wrote them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignAttributes {
    pub unit_bid: String,
    pub sku: String,
    pub group_bid: String,
    pub daily_budget: String,
}

/// Result of running the classifier over one campaign name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Option<String>,
    pub match_type: MatchType,
}

/// A campaign ready for expansion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Trimmed campaign name, unique within a run
    pub name: String,
    pub attributes: CampaignAttributes,
}
