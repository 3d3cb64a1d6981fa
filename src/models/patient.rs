use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Sex;

/// Placeholder printed when no referring doctor is given.
pub const DEFAULT_REFERRED_BY: &str = "Self";

/// Demographics as entered at the front desk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientIdentity {
    pub name: String,
    pub age: u32,
    pub sex: Sex,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub referred_by: Option<String>,
}

impl PatientIdentity {
    /// Referring doctor, or the `Self` placeholder when blank.
    pub fn referred_by_or_default(&self) -> &str {
        self.referred_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_REFERRED_BY)
    }

    /// Phone with surrounding whitespace removed; `None` when blank.
    pub fn phone_trimmed(&self) -> Option<&str> {
        self.phone.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: Uuid,
    pub name: String,
    pub age: u32,
    pub sex: Sex,
    pub phone: Option<String>,
    pub registration_number: String,
    pub serial_number: i64,
    pub referred_by: String,
    pub created_at: DateTime<Utc>,
}

impl PatientRecord {
    /// Identity as printed on a report.
    pub fn identity(&self) -> PatientIdentity {
        PatientIdentity {
            name: self.name.clone(),
            age: self.age,
            sex: self.sex,
            phone: self.phone.clone(),
            referred_by: Some(self.referred_by.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(referred_by: Option<&str>, phone: Option<&str>) -> PatientIdentity {
        PatientIdentity {
            name: "Asha Rao".into(),
            age: 41,
            sex: Sex::Female,
            phone: phone.map(String::from),
            referred_by: referred_by.map(String::from),
        }
    }

    #[test]
    fn referred_by_defaults_to_self() {
        assert_eq!(identity(None, None).referred_by_or_default(), "Self");
        assert_eq!(identity(Some("   "), None).referred_by_or_default(), "Self");
        assert_eq!(
            identity(Some(" Dr. Mehta "), None).referred_by_or_default(),
            "Dr. Mehta"
        );
    }

    #[test]
    fn blank_phone_is_none() {
        assert_eq!(identity(None, Some("  ")).phone_trimmed(), None);
        assert_eq!(
            identity(None, Some(" 98765 43210 ")).phone_trimmed(),
            Some("98765 43210")
        );
    }

    #[test]
    fn identity_deserializes_without_optionals() {
        let parsed: PatientIdentity =
            serde_json::from_str(r#"{"name":"Ravi","age":30,"sex":"M"}"#).unwrap();
        assert_eq!(parsed.sex, Sex::Male);
        assert!(parsed.phone.is_none());
        assert!(parsed.referred_by.is_none());
    }
}
