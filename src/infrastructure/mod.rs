pub mod bulksheet_writer;
pub mod config;
pub mod survey;
