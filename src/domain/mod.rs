pub mod error;

// Survey to bulk sheet conversion
pub mod survey;
