//! Repository layer — entity-scoped database operations.
//!
//! Free functions over a borrowed `rusqlite::Connection`; callers that need
//! several writes to land together pass a transaction.

mod admin_user;
mod patient;
mod test_result;

pub use admin_user::*;
pub use patient::{
    count_patients, create_patient, find_or_create_patient, get_patient, next_patient_serial, registration_number_for,
    search_patients, REGISTRATION_PREFIX,
};
pub use test_result::*;
