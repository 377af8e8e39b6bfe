//! Campaign classification
//!
//! A campaign name decides two things: which keyword category it belongs to
//! and how it targets (exact, broad, product-target). Both are answered by
//! ordered rule lists evaluated top to bottom, first match wins.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::survey::{Classification, MatchType};

const EXACT_TOKENS: &[&str] = &["exact", "精准"];
const BROAD_TOKENS: &[&str] = &["broad", "广泛"];
const PRODUCT_TARGET_TOKENS: &[&str] = &["asin"];

/// Name tokens that identify a match type; also used to pick keyword slot headers
pub fn qualifier_tokens(match_type: MatchType) -> &'static [&'static str] {
    match match_type {
        MatchType::Exact => EXACT_TOKENS,
        MatchType::Broad => BROAD_TOKENS,
        MatchType::ProductTarget => PRODUCT_TARGET_TOKENS,
        MatchType::None => &[],
    }
}

/// Category rule: matches when the token occurs in the lower-cased name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub category: String,
}

impl CategoryRule {
    pub fn matches(&self, normalized_name: &str) -> bool {
        normalized_name.contains(self.category.as_str())
    }
}

/// Match-type rule: matches when any of its tokens occurs in the lower-cased name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchTypeRule {
    pub tokens: &'static [&'static str],
    pub match_type: MatchType,
}

impl MatchTypeRule {
    pub fn matches(&self, normalized_name: &str) -> bool {
        self.tokens.iter().any(|t| normalized_name.contains(t))
    }
}

pub struct CampaignClassifier {
    category_rules: Vec<CategoryRule>,
    match_type_rules: Vec<MatchTypeRule>,
}

impl CampaignClassifier {
    /// Build the rule lists. Categories are ordered shortest first, ties
    /// broken alphabetically, so evaluation order never depends on hashing.
    pub fn new(categories: &BTreeSet<String>) -> Self {
        let mut ordered: Vec<&String> = categories.iter().collect();
        ordered.sort_by(|a, b| {
            a.chars()
                .count()
                .cmp(&b.chars().count())
                .then_with(|| a.cmp(b))
        });

        let category_rules = ordered
            .into_iter()
            .map(|category| CategoryRule {
                category: category.clone(),
            })
            .collect();

        let match_type_rules = [MatchType::Exact, MatchType::Broad, MatchType::ProductTarget]
            .into_iter()
            .map(|match_type| MatchTypeRule {
                tokens: qualifier_tokens(match_type),
                match_type,
            })
            .collect();

        Self {
            category_rules,
            match_type_rules,
        }
    }

    /// Categories in the order they are tried
    pub fn category_rules(&self) -> &[CategoryRule] {
        &self.category_rules
    }

    pub fn match_type_rules(&self) -> &[MatchTypeRule] {
        &self.match_type_rules
    }

    pub fn classify(&self, campaign_name: &str) -> Classification {
        let normalized = campaign_name.to_lowercase();

        let category = self
            .category_rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.category.clone());

        let match_type = self
            .match_type_rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.match_type)
            .unwrap_or(MatchType::None);

        debug!(
            campaign = %campaign_name,
            category = ?category,
            match_type = %match_type,
            "Classified campaign"
        );

        Classification {
            category,
            match_type,
        }
    }
}
