//! Flagging engine — low / normal / high against a textual reference range.
//!
//! Only ranges of the shape `<min> - <max>` are understood. Anything else
//! (`< 200`, `>5`, `Negative`, `Non Reactive`) never flags.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*-\s*(\d+(?:\.\d+)?)").expect("valid range regex")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    #[default]
    Normal,
    Low,
    High,
}

impl Flag {
    pub fn is_abnormal(self) -> bool {
        self != Flag::Normal
    }

    /// Suffix appended to a flagged value on the report.
    pub fn suffix(self) -> &'static str {
        match self {
            Flag::Normal => "",
            Flag::Low => "(L)",
            Flag::High => "(H)",
        }
    }
}

/// Numeric bounds extracted from a reference range, if it has any.
pub fn parse_bounds(reference_range: &str) -> Option<(f64, f64)> {
    let caps = RANGE_PATTERN.captures(reference_range)?;
    let min = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let max = caps.get(2)?.as_str().parse::<f64>().ok()?;
    Some((min, max))
}

/// Parse a submitted value as a finite decimal.
pub fn parse_value(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Classify `value` against `reference_range`. Unparseable input is `Normal`.
pub fn classify(value: &str, reference_range: &str) -> Flag {
    let Some(v) = parse_value(value) else {
        return Flag::Normal;
    };
    let Some((min, max)) = parse_bounds(reference_range) else {
        return Flag::Normal;
    };
    if v < min {
        Flag::Low
    } else if v > max {
        Flag::High
    } else {
        Flag::Normal
    }
}
