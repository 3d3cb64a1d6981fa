use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::patient::{
    like_contains, patient_from_row, patient_row_from_rusqlite, timestamp_from_sql, timestamp_to_sql,
    uuid_from_sql, PATIENT_COLUMNS,
};
use crate::catalog;
use crate::db::DatabaseError;
use crate::models::*;

const TEST_RESULT_COLUMNS: &str = "t.id, t.patient_id, t.test_type, t.test_data, t.reported_on";

/// Persist one test result; `test_data` is stored verbatim as JSON.
pub fn insert_test_result(
    conn: &Connection,
    patient_id: &Uuid,
    test_type: &str,
    test_data: &TestData,
) -> Result<TestResultRecord, DatabaseError> {
    let record = TestResultRecord {
        id: Uuid::new_v4(),
        patient_id: *patient_id,
        test_type: test_type.to_string(),
        test_data: test_data.clone(),
        reported_on: Utc::now(),
    };
    let data_json = serde_json::to_string(&record.test_data)?;

    conn.execute(
        "INSERT INTO test_results (id, patient_id, test_type, test_data, reported_on)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.id.to_string(),
            record.patient_id.to_string(),
            record.test_type,
            data_json,
            timestamp_to_sql(&record.reported_on),
        ],
    )?;
    Ok(record)
}

pub fn get_test_result(conn: &Connection, id: &Uuid) -> Result<TestResultRecord, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {TEST_RESULT_COLUMNS} FROM test_results t WHERE t.id = ?1"),
            params![id.to_string()],
            |row| test_result_row_from_rusqlite(row, 0),
        )
        .optional()?;
    match row {
        Some(row) => test_result_from_row(row),
        None => Err(DatabaseError::NotFound {
            entity_type: "TestResult".into(),
            id: id.to_string(),
        }),
    }
}

/// All results for one patient, newest first.
pub fn list_test_results_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<TestResultRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEST_RESULT_COLUMNS} FROM test_results t
         WHERE t.patient_id = ?1 ORDER BY t.reported_on DESC"
    ))?;

    let rows = stmt.query_map(params![patient_id.to_string()], |row| test_result_row_from_rusqlite(row, 0))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(test_result_from_row(row?)?);
    }
    Ok(results)
}

pub fn count_test_results(conn: &Connection) -> Result<i64, DatabaseError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM test_results", [], |row| row.get(0))?)
}

/// Admin listing: test results joined with their patient, newest first.
///
/// Name and registration number match as case-insensitive substrings. A known
/// test type is matched on its canonical code, so `cbc` finds `CBC` results. Dates are inclusive and compared on the UTC calendar
/// day of `reported_on`.
pub fn list_admin_records(conn: &Connection, filter: &AdminFilter) -> Result<Vec<AdminRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEST_RESULT_COLUMNS}, {PATIENT_COLUMNS}
         FROM test_results t JOIN patients p ON p.id = t.patient_id
         WHERE (?1 IS NULL OR p.name LIKE ?1 ESCAPE '\\')
           AND (?2 IS NULL OR p.registration_number LIKE ?2 ESCAPE '\\')
           AND (?3 IS NULL OR t.test_type = ?3)
           AND (?4 IS NULL OR substr(t.reported_on, 1, 10) >= ?4)
           AND (?5 IS NULL OR substr(t.reported_on, 1, 10) <= ?5)
         ORDER BY t.reported_on DESC"
    ))?;

    let rows = stmt.query_map(
        params![
            filter.name_term().map(like_contains),
            filter.reg_no_term().map(like_contains),
            filter
                .test_type_term()
                .map(|t| catalog::panel(t).map_or(t, |p| p.code)),
            filter.date_from.map(|d| d.to_string()),
            filter.date_to.map(|d| d.to_string()),
        ],
        |row| Ok((test_result_row_from_rusqlite(row, 0)?, patient_row_from_rusqlite(row, 5)?)),
    )?;

    let mut records = Vec::new();
    for row in rows {
        let (result_row, patient_row) = row?;
        records.push(AdminRecord {
            patient: patient_from_row(patient_row)?,
            test_result: test_result_from_row(result_row)?,
        });
    }
    Ok(records)
}

// Internal row type for TestResultRecord mapping
struct TestResultRow {
    id: String,
    patient_id: String,
    test_type: String,
    test_data: String,
    reported_on: String,
}

fn test_result_row_from_rusqlite(row: &rusqlite::Row<'_>, offset: usize) -> Result<TestResultRow, rusqlite::Error> {
    Ok(TestResultRow {
        id: row.get(offset)?,
        patient_id: row.get(offset + 1)?,
        test_type: row.get(offset + 2)?,
        test_data: row.get(offset + 3)?,
        reported_on: row.get(offset + 4)?,
    })
}

fn test_result_from_row(row: TestResultRow) -> Result<TestResultRecord, DatabaseError> {
    Ok(TestResultRecord {
        id: uuid_from_sql(&row.id)?,
        patient_id: uuid_from_sql(&row.patient_id)?,
        test_type: row.test_type,
        test_data: serde_json::from_str(&row.test_data)?,
        reported_on: timestamp_from_sql(&row.reported_on)?,
    })
}
