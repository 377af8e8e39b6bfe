pub mod use_cases;

pub use use_cases::bulksheet_generator::{BulkSheetGenerator, PlannedCampaign, SurveyPlan};
