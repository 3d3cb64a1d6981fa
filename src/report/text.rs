//! Display-text helpers for the printed report.

use std::sync::LazyLock;

use regex::Regex;

/// Names longer than this are abbreviated before printing.
pub const MAX_NAME_CHARS: usize = 32;

static ABBREVIATIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"(?i)\bCONCENTRATION\b").unwrap(), "Conc."),
        (Regex::new(r"(?i)\bCORPUSCULAR\b").unwrap(), "Corp."),
        (Regex::new(r"(?i)\bDISTRIBUTION\b").unwrap(), "Dist."),
        (Regex::new(r"(?i)\bHA?EMOGLOBIN\b").unwrap(), "Hb"),
        (Regex::new(r"(?i)\bPHOSPHATASE\b").unwrap(), "Phos."),
    ]
});

/// Tokens kept upper-case when title-casing.
const ACRONYMS: &[&str] = &[
    "ABO", "ALT", "APTT", "ASO", "AST", "BT", "BUN", "CK", "CPK", "CRP", "CT", "CV", "EAG", "ESR",
    "FBS", "GGT", "HBSAG", "HCT", "HCV", "HDL", "HIV", "HS", "II", "INR", "LDH", "LDL", "MB",
    "MCH", "MCHC", "MCV", "MPV", "PH", "PP", "PPBS", "PT", "RA", "RBC", "RBS", "RDW", "RH",
    "SGOT", "SGPT", "TIBC", "TSH", "VDRL", "VLDL", "WBC",
];

/// Shorten well-known long words when `name` would not fit the name column.
pub fn abbreviate(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_CHARS {
        return name.to_string();
    }
    ABBREVIATIONS
        .iter()
        .fold(name.to_string(), |acc, (pattern, short)| {
            pattern.replace_all(&acc, *short).into_owned()
        })
}

fn case_word(word: &str) -> String {
    let upper = word.to_uppercase();
    if ACRONYMS.contains(&upper.as_str()) || word.chars().any(|c| c.is_ascii_digit()) {
        return upper;
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Title-case every alphanumeric run, keeping lab acronyms upper-case.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut word = String::new();
    for c in name.chars() {
        if c.is_alphanumeric() {
            word.push(c);
        } else {
            if !word.is_empty() {
                out.push_str(&case_word(&word));
                word.clear();
            }
            out.push(c);
        }
    }
    if !word.is_empty() {
        out.push_str(&case_word(&word));
    }
    out
}

/// Name-column text for a data row.
pub fn display_label(name: &str) -> String {
    title_case(&abbreviate(name.trim()))
}

/// Value-column text: the value with its flag suffix when abnormal.
pub fn value_cell(value: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        value.to_string()
    } else {
        format!("{value} {suffix}")
    }
}

/// Reference-column text. The unit is appended unless the range already names it.
pub fn reference_cell(reference_range: &str, unit: &str) -> String {
    let unit = unit.trim();
    if unit.is_empty() || reference_range.to_lowercase().contains(&unit.to_lowercase()) {
        reference_range.to_string()
    } else {
        format!("{reference_range} {unit}")
    }
}

/// Download file name: `<org>_<test-type>_report_<patient_name>.pdf`.
pub fn report_file_name(org_slug: &str, test_type: &str, patient_name: &str) -> String {
    let name = patient_name
        .split_whitespace()
        .map(|part| {
            part.chars()
                .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '.'))
                .collect::<String>()
        })
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let name = if name.is_empty() { "patient".to_string() } else { name };
    format!("{org_slug}_{}_report_{name}.pdf", test_type.trim().to_lowercase())
}

/// `Content-Disposition` value for a report download.
///
/// `filename` carries an ASCII-only fallback; `filename*` carries the exact
/// name as percent-encoded UTF-8 (RFC 6266 / RFC 5987).
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() && !matches!(c, '"' | '\\') { c } else { '_' })
        .collect();
    let mut encoded = String::with_capacity(file_name.len());
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
