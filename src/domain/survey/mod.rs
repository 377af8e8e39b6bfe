// ============================================================
// SURVEY DOMAIN LAYER
// ============================================================
// Core types for turning a campaign survey into a bulk upload sheet
// No I/O, no async

mod bulk_row;
mod campaign;
mod column_layout;
mod generation_config;
mod survey_table;

pub use bulk_row::{
    BulkRow, BulkSheet, CampaignPlan, EntityLevel, GenerationSummary, OutputLocale, Vocabulary,
    BULK_COLUMN_COUNT, NUMERIC_COLUMNS,
};
pub use campaign::{Campaign, CampaignAttributes, Classification, MatchType};
pub use column_layout::{ColumnLayout, NegativePair, NegativeRule, SlotRange};
pub use generation_config::{CampaignDefaults, GenerationConfig, InputColumns, NegativeAsinScope};
pub use survey_table::{column_letter, is_blank, SurveyTable};
