pub mod bulksheet_generator;
pub mod campaign_classifier;
pub mod campaign_extractor;
pub mod category_resolver;
pub mod keyword_integrity;
pub mod row_expander;
