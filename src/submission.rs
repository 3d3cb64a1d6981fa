//! Submission service: validate → assemble → persist → render.
//!
//! Rows are assembled before any write so an empty submission never
//! leaves a patient or test result behind. Patient and test result are
//! written in one transaction, and the PDF is rendered before commit so a
//! render failure rolls the writes back.

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog;
use crate::config::LabProfile;
use crate::db::{self, DatabaseError};
use crate::models::{PatientIdentity, PatientRecord, ReportSubmission, TestResultRecord};
use crate::report::{self, ReportError, ReportMetadata};

/// Registration number printed on previews, which are never stored.
pub const PREVIEW_REGISTRATION: &str = "PREVIEW";

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for SubmissionError {
    fn from(err: rusqlite::Error) -> Self {
        SubmissionError::Database(DatabaseError::Sqlite(err))
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub file_name: String,
    pub pdf: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub patient: PatientRecord,
    pub test_result: TestResultRecord,
    pub is_new_patient: bool,
    pub report: GeneratedReport,
}

/// Reject identities the store would refuse anyway.
pub fn validate_identity(identity: &PatientIdentity) -> Result<(), ReportError> {
    if identity.name.trim().is_empty() {
        return Err(ReportError::InvalidIdentity("name is required".into()));
    }
    if identity.age == 0 {
        return Err(ReportError::InvalidIdentity("age must be a positive number".into()));
    }
    Ok(())
}

/// Canonical code of the panel a test type is printed with.
fn canonical_test_type(test_type: &str) -> &'static str {
    catalog::resolve(test_type).panel.code
}

fn render_report(
    identity: &PatientIdentity,
    registration_number: &str,
    test_type: &'static str,
    rows: &[report::ReportRow],
    lab: &LabProfile,
) -> Result<GeneratedReport, ReportError> {
    let metadata = ReportMetadata::today(registration_number, test_type);
    let pdf = report::render(identity, &metadata, rows, lab)?;
    Ok(GeneratedReport {
        file_name: report::report_file_name(&lab.org_slug, test_type, &identity.name),
        pdf,
    })
}

/// Render a report without persisting anything.
pub fn generate_report(
    submission: &ReportSubmission,
    registration_number: &str,
    lab: &LabProfile,
) -> Result<GeneratedReport, SubmissionError> {
    validate_identity(&submission.patient)?;
    let test_type = canonical_test_type(&submission.test_type);
    let rows = report::assemble(test_type, &submission.values, &submission.custom_tests)?;
    Ok(render_report(&submission.patient, registration_number, test_type, &rows, lab)?)
}

/// Persist a submission and render its report with the stored registration number.
pub fn submit(
    conn: &Connection,
    submission: &ReportSubmission,
    lab: &LabProfile,
) -> Result<SubmissionOutcome, SubmissionError> {
    validate_identity(&submission.patient)?;
    let test_type = canonical_test_type(&submission.test_type);
    let rows = report::assemble(test_type, &submission.values, &submission.custom_tests)?;

    let tx = conn.unchecked_transaction()?;
    let (patient, is_new_patient) =
        db::find_or_create_patient(&tx, &submission.patient, submission.existing_patient_id.as_ref())?;
    let test_result = db::insert_test_result(&tx, &patient.id, test_type, &submission.test_data())?;
    let report = render_report(
        &patient.identity(),
        &patient.registration_number,
        test_type,
        &rows,
        lab,
    )?;
    tx.commit()?;

    tracing::info!(
        patient_id = %patient.id,
        registration_number = %patient.registration_number,
        test_result_id = %test_result.id,
        test_type,
        is_new_patient,
        "Report submitted"
    );

    Ok(SubmissionOutcome {
        patient,
        test_result,
        is_new_patient,
        report,
    })
}

/// Re-render a stored test result for download.
pub fn regenerate(
    conn: &Connection,
    test_result_id: &Uuid,
    lab: &LabProfile,
) -> Result<GeneratedReport, SubmissionError> {
    let test_result = db::get_test_result(conn, test_result_id)?;
    let patient = db::get_patient(conn, &test_result.patient_id)?;
    let test_type = canonical_test_type(&test_result.test_type);
    let rows = report::assemble(
        test_type,
        &test_result.test_data.values,
        &test_result.test_data.custom_tests,
    )?;
    Ok(render_report(
        &patient.identity(),
        &patient.registration_number,
        test_type,
        &rows,
        lab,
    )?)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::db::open_memory_database;
    use crate::models::{CustomTestEntry, Sex};

    fn submission(values: &[(&str, &str)]) -> ReportSubmission {
        ReportSubmission {
            test_type: "CBC".into(),
            patient: PatientIdentity {
                name: "Asha Rao".into(),
                age: 41,
                sex: Sex::Female,
                phone: None,
                referred_by: None,
            },
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            custom_tests: vec![],
            existing_patient_id: None,
        }
    }

    fn patient_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM patients", [], |r| r.get(0)).unwrap()
    }

    #[test]
    fn preview_renders_without_store() {
        let report = generate_report(
            &submission(&[("hemoglobin", "9.0")]),
            PREVIEW_REGISTRATION,
            &LabProfile::default(),
        )
        .unwrap();
        assert!(report.pdf.starts_with(b"%PDF"));
        assert_eq!(report.file_name, "sugar_diagnostic_cbc_report_Asha_Rao.pdf");
    }

    #[test]
    fn submit_persists_then_renders() {
        let conn = open_memory_database().unwrap();
        let outcome = submit(&conn, &submission(&[("hemoglobin", "9.0")]), &LabProfile::default()).unwrap();
        assert!(outcome.is_new_patient);
        assert_eq!(outcome.patient.registration_number, "REG000001");
        assert!(outcome.report.pdf.starts_with(b"%PDF"));

        let stored = db::get_test_result(&conn, &outcome.test_result.id).unwrap();
        assert_eq!(stored.test_data.values.get("hemoglobin").map(String::as_str), Some("9.0"));
    }

    #[test]
    fn empty_submission_writes_nothing() {
        let conn = open_memory_database().unwrap();
        let err = submit(&conn, &submission(&[]), &LabProfile::default()).unwrap_err();
        assert!(matches!(err, SubmissionError::Report(ReportError::EmptySubmission)));
        assert_eq!(patient_count(&conn), 0);
        // The serial counter was not advanced either
        assert_eq!(db::next_patient_serial(&conn).unwrap(), 1);
    }

    #[test]
    fn invalid_identity_is_rejected() {
        let conn = open_memory_database().unwrap();
        let mut sub = submission(&[("hemoglobin", "12")]);
        sub.patient.name = "   ".into();
        assert!(matches!(
            submit(&conn, &sub, &LabProfile::default()),
            Err(SubmissionError::Report(ReportError::InvalidIdentity(_)))
        ));
        sub.patient.name = "Asha".into();
        sub.patient.age = 0;
        assert!(matches!(
            submit(&conn, &sub, &LabProfile::default()),
            Err(SubmissionError::Report(ReportError::InvalidIdentity(_)))
        ));
        assert_eq!(patient_count(&conn), 0);
    }

    #[test]
    fn existing_patient_is_reused() {
        let conn = open_memory_database().unwrap();
        let lab = LabProfile::default();
        let first = submit(&conn, &submission(&[("hemoglobin", "12")]), &lab).unwrap();

        let mut second = submission(&[("hemoglobin", "13")]);
        second.existing_patient_id = Some(first.patient.id);
        let outcome = submit(&conn, &second, &lab).unwrap();
        assert!(!outcome.is_new_patient);
        assert_eq!(outcome.patient.registration_number, first.patient.registration_number);
        assert_eq!(patient_count(&conn), 1);
        assert_eq!(db::list_test_results_for_patient(&conn, &first.patient.id).unwrap().len(), 2);
    }

    #[test]
    fn unknown_existing_patient_is_not_found() {
        let conn = open_memory_database().unwrap();
        let mut sub = submission(&[("hemoglobin", "12")]);
        sub.existing_patient_id = Some(Uuid::new_v4());
        assert!(matches!(
            submit(&conn, &sub, &LabProfile::default()),
            Err(SubmissionError::Database(DatabaseError::NotFound { .. }))
        ));
    }

    #[test]
    fn unknown_test_type_is_stored_as_cbc() {
        let conn = open_memory_database().unwrap();
        let mut sub = submission(&[("hemoglobin", "12")]);
        sub.test_type = "Biopsy".into();
        let outcome = submit(&conn, &sub, &LabProfile::default()).unwrap();
        assert_eq!(outcome.test_result.test_type, "CBC");
        assert_eq!(outcome.report.file_name, "sugar_diagnostic_cbc_report_Asha_Rao.pdf");
    }

    #[test]
    fn regenerate_matches_stored_result() {
        let conn = open_memory_database().unwrap();
        let lab = LabProfile::default();
        let mut sub = submission(&[]);
        sub.custom_tests.push(CustomTestEntry {
            name: "Vitamin X".into(),
            value: "3".into(),
            reference_range: "1-2".into(),
        });
        let outcome = submit(&conn, &sub, &lab).unwrap();
        let again = regenerate(&conn, &outcome.test_result.id, &lab).unwrap();
        assert_eq!(again.file_name, outcome.report.file_name);
        assert!(again.pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn regenerate_unknown_id_is_not_found() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            regenerate(&conn, &Uuid::new_v4(), &LabProfile::default()),
            Err(SubmissionError::Database(DatabaseError::NotFound { .. }))
        ));
    }
}
