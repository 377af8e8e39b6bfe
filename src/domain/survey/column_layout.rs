// ============================================================
// COLUMN LAYOUT
// ============================================================
// Positional contracts of the survey sheet, 0-indexed

use serde::{Deserialize, Serialize};

use super::campaign::MatchType;

/// Half-open range of column positions `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: usize,
    pub end: usize,
}

impl SlotRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Positions in the range that actually exist in a table of `width` columns
    pub fn clamp_to(&self, width: usize) -> std::ops::Range<usize> {
        self.start.min(width)..self.end.min(width)
    }
}

/// A pair of negative slot columns: negative-exact terms and negative-phrase terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativePair {
    pub exact: usize,
    pub phrase: usize,
}

/// Which negative slot pair applies to a campaign.
///
/// An empty `categories` list matches any category, including none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativeRule {
    pub match_type: MatchType,
    #[serde(default)]
    pub categories: Vec<String>,
    pub columns: NegativePair,
}

impl NegativeRule {
    pub fn applies_to(&self, match_type: MatchType, category: Option<&str>) -> bool {
        if self.match_type != match_type {
            return false;
        }
        if self.categories.is_empty() {
            return true;
        }
        match category {
            Some(category) => self
                .categories
                .iter()
                .any(|c| c.to_lowercase() == category),
            None => false,
        }
    }
}

/// Where keyword slots and negative slots live in the survey.
///
/// Position decides role; header text at these positions is only used to
/// pick which keyword slots belong to a category and match type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub keyword_slots: SlotRange,
    /// Evaluated in order, first applicable rule wins
    pub negative_rules: Vec<NegativeRule>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            // H..Q
            keyword_slots: SlotRange::new(7, 17),
            negative_rules: vec![
                // S / T
                NegativeRule {
                    match_type: MatchType::Broad,
                    categories: Vec::new(),
                    columns: NegativePair { exact: 18, phrase: 19 },
                },
                // U / V
                NegativeRule {
                    match_type: MatchType::Exact,
                    categories: vec!["suzhu".into(), "host".into(), "宿主".into()],
                    columns: NegativePair { exact: 20, phrase: 21 },
                },
                // W / X
                NegativeRule {
                    match_type: MatchType::Exact,
                    categories: vec!["case".into()],
                    columns: NegativePair { exact: 22, phrase: 23 },
                },
            ],
        }
    }
}

impl ColumnLayout {
    /// First negative rule that applies, if any
    pub fn negative_columns(
        &self,
        match_type: MatchType,
        category: Option<&str>,
    ) -> Option<NegativePair> {
        self.negative_rules
            .iter()
            .find(|rule| rule.applies_to(match_type, category))
            .map(|rule| rule.columns)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.keyword_slots.is_empty() {
            return Err(format!(
                "keyword_slots must be non-empty (got {}..{})",
                self.keyword_slots.start, self.keyword_slots.end
            ));
        }
        for rule in &self.negative_rules {
            if !rule.match_type.is_keyword() {
                return Err(format!(
                    "negative rules only apply to exact or broad campaigns (got {})",
                    rule.match_type
                ));
            }
            if rule.columns.exact == rule.columns.phrase {
                return Err(format!(
                    "negative rule for {} uses column {} for both exact and phrase",
                    rule.match_type, rule.columns.exact
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_matches_survey_template() {
        let layout = ColumnLayout::default();
        assert_eq!(layout.keyword_slots.clamp_to(30), 7..17);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_broad_negatives_ignore_category() {
        let layout = ColumnLayout::default();
        let expected = Some(NegativePair { exact: 18, phrase: 19 });
        assert_eq!(layout.negative_columns(MatchType::Broad, Some("case")), expected);
        assert_eq!(layout.negative_columns(MatchType::Broad, None), expected);
    }

    #[test]
    fn test_exact_negatives_depend_on_category() {
        let layout = ColumnLayout::default();
        assert_eq!(
            layout.negative_columns(MatchType::Exact, Some("宿主")),
            Some(NegativePair { exact: 20, phrase: 21 })
        );
        assert_eq!(
            layout.negative_columns(MatchType::Exact, Some("case")),
            Some(NegativePair { exact: 22, phrase: 23 })
        );
        assert_eq!(layout.negative_columns(MatchType::Exact, Some("tape")), None);
        assert_eq!(layout.negative_columns(MatchType::Exact, None), None);
        assert_eq!(layout.negative_columns(MatchType::ProductTarget, None), None);
    }

    #[test]
    fn test_clamp_to_short_table() {
        assert_eq!(SlotRange::new(7, 17).clamp_to(10), 7..10);
        assert!(SlotRange::new(7, 17).clamp_to(5).is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_slots() {
        let layout = ColumnLayout {
            keyword_slots: SlotRange::new(5, 5),
            ..Default::default()
        };
        assert!(layout.validate().is_err());
    }
}
