use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patient::PatientRecord;

/// A user-authored test outside the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTestEntry {
    pub name: String,
    pub value: String,
    pub reference_range: String,
}

impl CustomTestEntry {
    /// Only entries with all three attributes filled in reach the report.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.value.trim().is_empty()
            && !self.reference_range.trim().is_empty()
    }
}

/// The opaque blob persisted with every test result: raw field values plus
/// custom tests, exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestData {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default)]
    pub custom_tests: Vec<CustomTestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub test_type: String,
    pub test_data: TestData,
    pub reported_on: DateTime<Utc>,
}

/// One row of the admin listing: a test result with its owning patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub patient: PatientRecord,
    pub test_result: TestResultRecord,
}
