use std::collections::BTreeMap;

use serde::Serialize;

use super::ReportError;
use crate::catalog;
use crate::flagging::{self, Flag};
use crate::models::CustomTestEntry;

/// Heading printed above user-defined tests.
pub const CUSTOM_TESTS_HEADING: &str = "CUSTOM TESTS";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportRow {
    GroupHeading {
        label: String,
    },
    DataRow {
        display_name: String,
        value: String,
        unit: String,
        reference_range: String,
        flag: Flag,
    },
}

impl ReportRow {
    pub fn is_heading(&self) -> bool {
        matches!(self, ReportRow::GroupHeading { .. })
    }

    pub fn flag(&self) -> Flag {
        match self {
            ReportRow::DataRow { flag, .. } => *flag,
            ReportRow::GroupHeading { .. } => Flag::Normal,
        }
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Build the ordered report rows for one submission.
///
/// Catalog groups come first in catalog order, each heading emitted only when
/// at least one of its fields has a value. Complete custom tests follow under
/// a single `CUSTOM TESTS` heading. Fails with `EmptySubmission` when nothing
/// would be printed.
pub fn assemble(
    test_type: &str,
    values: &BTreeMap<String, String>,
    custom_tests: &[CustomTestEntry],
) -> Result<Vec<ReportRow>, ReportError> {
    let panel = catalog::resolve(test_type).panel;
    let mut rows = Vec::new();

    for group in panel.groups {
        let mut heading_pending = true;
        for field in group.fields {
            let Some(value) = present(values.get(field.id)) else {
                continue;
            };
            if heading_pending {
                rows.push(ReportRow::GroupHeading {
                    label: group.label.to_string(),
                });
                heading_pending = false;
            }
            rows.push(ReportRow::DataRow {
                display_name: field.display_name.to_string(),
                value: value.to_string(),
                unit: field.unit.to_string(),
                reference_range: field.reference_range.to_string(),
                flag: flagging::classify(value, field.reference_range),
            });
        }
    }

    let complete: Vec<&CustomTestEntry> = custom_tests.iter().filter(|c| c.is_complete()).collect();
    if !complete.is_empty() {
        rows.push(ReportRow::GroupHeading {
            label: CUSTOM_TESTS_HEADING.to_string(),
        });
        for custom in complete {
            let value = custom.value.trim();
            let reference_range = custom.reference_range.trim();
            rows.push(ReportRow::DataRow {
                display_name: custom.name.trim().to_string(),
                value: value.to_string(),
                unit: String::new(),
                reference_range: reference_range.to_string(),
                flag: flagging::classify(value, reference_range),
            });
        }
    }

    if rows.iter().all(ReportRow::is_heading) {
        return Err(ReportError::EmptySubmission);
    }
    Ok(rows)
}
