// ============================================================
// BULK ROW TYPES
// ============================================================
// Output rows of the bulk upload template and their vocabulary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::campaign::Classification;

/// Number of columns in the bulk upload template
pub const BULK_COLUMN_COUNT: usize = 25;

/// Kind of advertising entity a bulk row creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityLevel {
    BidAdjustment,
    Campaign,
    AdGroup,
    ProductAd,
    Keyword,
    NegativeKeyword,
    ProductTargeting,
    NegativeProductTargeting,
}

/// Language of the template headers and literal cell values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLocale {
    #[default]
    En,
    Zh,
}

/// Literal strings written into the template for one locale
#[derive(Debug)]
pub struct Vocabulary {
    pub headers: [&'static str; BULK_COLUMN_COUNT],
    pub product: &'static str,
    pub operation: &'static str,
    pub status_enabled: &'static str,
    pub targeting_manual: &'static str,
    pub bidding_strategy: &'static str,
    pub placement_top_of_search: &'static str,
    pub placement_product_page: &'static str,
    pub match_exact: &'static str,
    pub match_broad: &'static str,
    pub negative_exact: &'static str,
    pub negative_phrase: &'static str,
    pub bid_adjustment: &'static str,
    pub campaign: &'static str,
    pub ad_group: &'static str,
    pub product_ad: &'static str,
    pub keyword: &'static str,
    pub negative_keyword: &'static str,
    pub product_targeting: &'static str,
    pub negative_product_targeting: &'static str,
}

static EN: Vocabulary = Vocabulary {
    headers: [
        "product",
        "entity-level",
        "operation",
        "campaign-id",
        "ad-group-id",
        "portfolio-id",
        "ad-id",
        "keyword-id",
        "product-targeting-id",
        "campaign-name",
        "ad-group-name",
        "start-date",
        "end-date",
        "targeting-type",
        "status",
        "daily-budget",
        "SKU",
        "ad-group-default-bid",
        "bid",
        "keyword-text",
        "match-type",
        "bidding-strategy",
        "placement",
        "percentage",
        "expanded-product-targeting-id",
    ],
    product: "Sponsored Products",
    operation: "Create",
    status_enabled: "enabled",
    targeting_manual: "manual",
    bidding_strategy: "dynamic-bids-down-only",
    placement_top_of_search: "top-of-search",
    placement_product_page: "product detail page",
    match_exact: "exact",
    match_broad: "broad",
    negative_exact: "negative-exact-match",
    negative_phrase: "negative-phrase",
    bid_adjustment: "bid-adjustment",
    campaign: "campaign",
    ad_group: "ad-group",
    product_ad: "product-ad",
    keyword: "keyword",
    negative_keyword: "negative-keyword",
    product_targeting: "product-targeting",
    negative_product_targeting: "negative-product-targeting",
};

static ZH: Vocabulary = Vocabulary {
    headers: [
        "产品",
        "实体层级",
        "操作",
        "广告活动编号",
        "广告组编号",
        "广告组合编号",
        "广告编号",
        "关键词编号",
        "商品投放 ID",
        "广告活动名称",
        "广告组名称",
        "开始日期",
        "结束日期",
        "投放类型",
        "状态",
        "每日预算",
        "SKU",
        "广告组默认竞价",
        "竞价",
        "关键词文本",
        "匹配类型",
        "竞价方案",
        "广告位",
        "百分比",
        "拓展商品投放编号",
    ],
    product: "商品推广",
    operation: "Create",
    status_enabled: "已启用",
    targeting_manual: "手动",
    bidding_strategy: "动态竞价 - 仅降低",
    placement_top_of_search: "广告位：搜索结果首页首位",
    placement_product_page: "广告位：商品页面",
    match_exact: "精准",
    match_broad: "广泛",
    negative_exact: "否定精准匹配",
    negative_phrase: "否定词组",
    bid_adjustment: "竞价调整",
    campaign: "广告活动",
    ad_group: "广告组",
    product_ad: "商品广告",
    keyword: "关键词",
    negative_keyword: "否定关键词",
    product_targeting: "商品定向",
    negative_product_targeting: "否定商品定向",
};

impl OutputLocale {
    pub fn vocabulary(&self) -> &'static Vocabulary {
        match self {
            OutputLocale::En => &EN,
            OutputLocale::Zh => &ZH,
        }
    }
}

impl Vocabulary {
    pub fn entity_level(&self, level: EntityLevel) -> &'static str {
        match level {
            EntityLevel::BidAdjustment => self.bid_adjustment,
            EntityLevel::Campaign => self.campaign,
            EntityLevel::AdGroup => self.ad_group,
            EntityLevel::ProductAd => self.product_ad,
            EntityLevel::Keyword => self.keyword,
            EntityLevel::NegativeKeyword => self.negative_keyword,
            EntityLevel::ProductTargeting => self.product_targeting,
            EntityLevel::NegativeProductTargeting => self.negative_product_targeting,
        }
    }
}

/// One row of the bulk upload template. Unpopulated fields stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRow {
    pub entity: Option<EntityLevel>,
    pub product: String,
    pub entity_level: String,
    pub operation: String,
    pub campaign_id: String,
    pub ad_group_id: String,
    pub portfolio_id: String,
    pub ad_id: String,
    pub keyword_id: String,
    pub product_targeting_id: String,
    pub campaign_name: String,
    pub ad_group_name: String,
    pub start_date: String,
    pub end_date: String,
    pub targeting_type: String,
    pub status: String,
    pub daily_budget: String,
    pub sku: String,
    pub ad_group_default_bid: String,
    pub bid: String,
    pub keyword_text: String,
    pub match_type: String,
    pub bidding_strategy: String,
    pub placement: String,
    pub percentage: String,
    pub expanded_product_targeting_id: String,
}

/// Template positions whose values are numeric when the survey gave a number
pub const NUMERIC_COLUMNS: [usize; 3] = [15, 17, 18];

impl BulkRow {
    /// Field values in template column order
    pub fn values(&self) -> [&str; BULK_COLUMN_COUNT] {
        [
            self.product.as_str(),
            self.entity_level.as_str(),
            self.operation.as_str(),
            self.campaign_id.as_str(),
            self.ad_group_id.as_str(),
            self.portfolio_id.as_str(),
            self.ad_id.as_str(),
            self.keyword_id.as_str(),
            self.product_targeting_id.as_str(),
            self.campaign_name.as_str(),
            self.ad_group_name.as_str(),
            self.start_date.as_str(),
            self.end_date.as_str(),
            self.targeting_type.as_str(),
            self.status.as_str(),
            self.daily_budget.as_str(),
            self.sku.as_str(),
            self.ad_group_default_bid.as_str(),
            self.bid.as_str(),
            self.keyword_text.as_str(),
            self.match_type.as_str(),
            self.bidding_strategy.as_str(),
            self.placement.as_str(),
            self.percentage.as_str(),
            self.expanded_product_targeting_id.as_str(),
        ]
    }
}

/// What the generator decided for one campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignPlan {
    pub name: String,
    pub classification: Classification,
    pub keyword_columns: Vec<String>,
    pub keywords: usize,
    pub negative_exact: usize,
    pub negative_phrase: usize,
    pub product_targets: usize,
    pub negative_product_targets: usize,
}

/// Diagnostics for one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub campaign_count: usize,
    pub categories: Vec<String>,
    pub plans: Vec<CampaignPlan>,
    pub rows_per_entity: BTreeMap<EntityLevel, usize>,
    pub warnings: Vec<String>,
}

/// Successful output of a generation run: rows in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSheet {
    pub locale: OutputLocale,
    pub rows: Vec<BulkRow>,
    pub summary: GenerationSummary,
}

impl BulkSheet {
    pub fn headers(&self) -> &'static [&'static str; BULK_COLUMN_COUNT] {
        &self.locale.vocabulary().headers
    }

    pub fn rows_of(&self, level: EntityLevel) -> impl Iterator<Item = &BulkRow> {
        self.rows.iter().filter(move |r| r.entity == Some(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_follow_header_order() {
        let row = BulkRow {
            product: "p".into(),
            entity_level: "keyword".into(),
            keyword_text: "usb hub".into(),
            expanded_product_targeting_id: "asin=\"B0\"".into(),
            ..Default::default()
        };
        let values = row.values();
        let headers = OutputLocale::En.vocabulary().headers;

        let at = |name: &str| headers.iter().position(|h| *h == name).unwrap();
        assert_eq!(values[at("product")], "p");
        assert_eq!(values[at("entity-level")], "keyword");
        assert_eq!(values[at("keyword-text")], "usb hub");
        assert_eq!(values[at("expanded-product-targeting-id")], "asin=\"B0\"");
    }

    #[test]
    fn test_numeric_columns_point_at_money_fields() {
        let headers = OutputLocale::En.vocabulary().headers;
        let names: Vec<&str> = NUMERIC_COLUMNS.iter().map(|&i| headers[i]).collect();
        assert_eq!(names, vec!["daily-budget", "ad-group-default-bid", "bid"]);
    }

    #[test]
    fn test_locales_share_shape() {
        let en = OutputLocale::En.vocabulary();
        let zh = OutputLocale::Zh.vocabulary();
        assert_eq!(en.headers.len(), zh.headers.len());
        assert_eq!(zh.entity_level(EntityLevel::NegativeProductTargeting), "否定商品定向");
        assert_eq!(en.entity_level(EntityLevel::AdGroup), "ad-group");
    }
}
