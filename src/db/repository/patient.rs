use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

pub const REGISTRATION_PREFIX: &str = "REG";
const PATIENT_SERIAL_COUNTER: &str = "patient_serial";

pub(crate) const PATIENT_COLUMNS: &str = "p.id, p.name, p.age, p.sex, p.phone, p.registration_number,
     p.serial_number, p.referred_by, p.created_at";

/// Registration number derived from a serial: `REG000042`.
pub fn registration_number_for(serial: i64) -> String {
    format!("{REGISTRATION_PREFIX}{serial:06}")
}

pub(crate) fn timestamp_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn timestamp_from_sql(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {raw}: {e}")))
}

pub(crate) fn uuid_from_sql(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_contains(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Claim the next patient serial. Atomic at the store: concurrent writers
/// are serialized on the counter row.
pub fn next_patient_serial(conn: &Connection) -> Result<i64, DatabaseError> {
    let serial = conn.query_row(
        "UPDATE counters SET value = value + 1 WHERE name = ?1 RETURNING value",
        params![PATIENT_SERIAL_COUNTER],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(serial)
}

/// Insert a new patient with a freshly claimed serial and registration number.
///
/// Run inside a transaction when the caller also writes a test result, so a
/// failed insert does not burn a serial.
pub fn create_patient(conn: &Connection, identity: &PatientIdentity) -> Result<PatientRecord, DatabaseError> {
    let serial = next_patient_serial(conn)?;
    let patient = PatientRecord {
        id: Uuid::new_v4(),
        name: identity.name.trim().to_string(),
        age: identity.age,
        sex: identity.sex,
        phone: identity.phone_trimmed().map(String::from),
        registration_number: registration_number_for(serial),
        serial_number: serial,
        referred_by: identity.referred_by_or_default().to_string(),
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO patients (id, name, age, sex, phone, registration_number,
         serial_number, referred_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            patient.id.to_string(),
            patient.name,
            patient.age,
            patient.sex.as_str(),
            patient.phone,
            patient.registration_number,
            patient.serial_number,
            patient.referred_by,
            timestamp_to_sql(&patient.created_at),
        ],
    )?;
    Ok(patient)
}

/// Reuse `existing_id` when given, otherwise register a new patient.
/// The flag is `true` when a patient was created.
pub fn find_or_create_patient(
    conn: &Connection,
    identity: &PatientIdentity,
    existing_id: Option<&Uuid>,
) -> Result<(PatientRecord, bool), DatabaseError> {
    match existing_id {
        Some(id) => Ok((get_patient(conn, id)?, false)),
        None => Ok((create_patient(conn, identity)?, true)),
    }
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<PatientRecord, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients p WHERE p.id = ?1"),
            params![id.to_string()],
            |row| patient_row_from_rusqlite(row, 0),
        )
        .optional()?;
    match row {
        Some(row) => patient_from_row(row),
        None => Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        }),
    }
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?)
}

/// Case-insensitive substring search on name or registration number, newest first.
pub fn search_patients(conn: &Connection, term: &str, limit: u32) -> Result<Vec<PatientRecord>, DatabaseError> {
    let pattern = like_contains(term.trim());
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients p
         WHERE p.name LIKE ?1 ESCAPE '\\' OR p.registration_number LIKE ?1 ESCAPE '\\'
         ORDER BY p.created_at DESC, p.serial_number DESC
         LIMIT ?2"
    ))?;

    let rows = stmt.query_map(params![pattern, limit], |row| patient_row_from_rusqlite(row, 0))?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

// Internal row type for PatientRecord mapping
pub(crate) struct PatientRow {
    id: String,
    name: String,
    age: u32,
    sex: String,
    phone: Option<String>,
    registration_number: String,
    serial_number: i64,
    referred_by: String,
    created_at: String,
}

/// Read the patient columns starting at `offset` (joins put them after other columns).
pub(crate) fn patient_row_from_rusqlite(row: &rusqlite::Row<'_>, offset: usize) -> Result<PatientRow, rusqlite::Error> {
    Ok(PatientRow {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        age: row.get(offset + 2)?,
        sex: row.get(offset + 3)?,
        phone: row.get(offset + 4)?,
        registration_number: row.get(offset + 5)?,
        serial_number: row.get(offset + 6)?,
        referred_by: row.get(offset + 7)?,
        created_at: row.get(offset + 8)?,
    })
}

pub(crate) fn patient_from_row(row: PatientRow) -> Result<PatientRecord, DatabaseError> {
    Ok(PatientRecord {
        id: uuid_from_sql(&row.id)?,
        name: row.name,
        age: row.age,
        sex: Sex::from_str(&row.sex)?,
        phone: row.phone,
        registration_number: row.registration_number,
        serial_number: row.serial_number,
        referred_by: row.referred_by,
        created_at: timestamp_from_sql(&row.created_at)?,
    })
}
