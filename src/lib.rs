mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use app::run;
pub use application::{BulkSheetGenerator, PlannedCampaign, SurveyPlan};
pub use domain::error::{AppError, DuplicateKeyword, DuplicateReport, Result};
pub use domain::survey::{BulkSheet, GenerationConfig, SurveyTable};
pub use infrastructure::bulksheet_writer::{BulkSheetWriter, OutputFormat};
pub use infrastructure::config::{ConfigService, Settings};
pub use infrastructure::survey::{SurveyFormat, SurveyReader};
