use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patient::PatientIdentity;
use super::test_result::{CustomTestEntry, TestData};

/// A front-desk submission: which panel, who, and the raw values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub test_type: String,
    pub patient: PatientIdentity,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default)]
    pub custom_tests: Vec<CustomTestEntry>,
    /// Reuse this patient instead of registering a new one.
    #[serde(default)]
    pub existing_patient_id: Option<Uuid>,
}

impl ReportSubmission {
    /// The blob stored alongside the test result.
    pub fn test_data(&self) -> TestData {
        TestData {
            values: self.values.clone(),
            custom_tests: self.custom_tests.clone(),
        }
    }
}
