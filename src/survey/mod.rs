//! Survey table loading and deduplication.
//!
//! Reads the raw survey CSV, validates required and typed columns,
//! drops duplicate survey ids (first occurrence wins) and extracts the
//! point set handed to the resolvers.

mod loader;
mod table;

pub use loader::load_survey_table;
pub use table::{SurveyPoint, SurveyTable};
