//! Report pipeline: submitted values → flagged rows → laid-out PDF.
//!
//! `rows` turns a submission into an ordered list of headings and data rows,
//! `layout` places them on the page without touching the PDF library, and
//! `render` draws the plan with printpdf.

pub mod layout;
pub mod metrics;
pub mod render;
pub mod rows;
pub mod text;

pub use layout::{plan, LayoutPlan};
pub use render::render;
pub use rows::{assemble, ReportRow, CUSTOM_TESTS_HEADING};
pub use text::{content_disposition, report_file_name};

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No test values were entered")]
    EmptySubmission,

    #[error("Invalid patient details: {0}")]
    InvalidIdentity(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// Per-report values printed in the header besides patient identity.
#[derive(Debug, Clone)]
pub struct ReportMetadata {
    pub registration_number: String,
    pub test_type: String,
    pub report_date: NaiveDate,
}

impl ReportMetadata {
    /// Metadata stamped with today's local date.
    pub fn today(registration_number: impl Into<String>, test_type: impl Into<String>) -> Self {
        Self {
            registration_number: registration_number.into(),
            test_type: test_type.into(),
            report_date: chrono::Local::now().date_naive(),
        }
    }
}
