use chrono::NaiveDate;
use serde::Deserialize;

/// Admin listing filter. Every field is optional; blank strings count as unset.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AdminFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reg_no: Option<String>,
    #[serde(default)]
    pub test_type: Option<String>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

impl AdminFilter {
    pub fn name_term(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    pub fn reg_no_term(&self) -> Option<&str> {
        non_blank(self.reg_no.as_deref())
    }

    /// `"all"` is what the admin screen sends for "no test type filter".
    pub fn test_type_term(&self) -> Option<&str> {
        non_blank(self.test_type.as_deref()).filter(|t| !t.eq_ignore_ascii_case("all"))
    }

    /// Number of filters actually in effect.
    pub fn active_count(&self) -> usize {
        [
            self.name_term().is_some(),
            self.reg_no_term().is_some(),
            self.test_type_term().is_some(),
            self.date_from.is_some(),
            self.date_to.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
