//! Record validation
//!
//! Pure checks; `validate` never panics and always returns a report.

use crate::record::BusinessRecord;
use crate::text::is_valid_url;
use serde::{Deserialize, Serialize};

/// Inclusive character-length bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRule {
    /// Minimum length in characters
    pub min: usize,
    /// Maximum length in characters
    pub max: usize,
}

impl LengthRule {
    /// Create new rule
    #[inline]
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Check a character count against the bounds
    #[inline]
    #[must_use]
    pub fn accepts(&self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}

/// Field rules applied to every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Title length bounds
    pub title: LengthRule,
    /// Description length bounds
    pub description: LengthRule,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            title: LengthRule::new(3, 100),
            description: LengthRule::new(10, 500),
        }
    }
}

/// Outcome of validating one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// True when `errors` is empty
    pub valid: bool,
    /// One message per failed rule
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate with the default rules
#[must_use]
pub fn validate(record: &BusinessRecord) -> ValidationReport {
    validate_with(record, &ValidationRules::default())
}

/// Validate with explicit rules
#[must_use]
pub fn validate_with(record: &BusinessRecord, rules: &ValidationRules) -> ValidationReport {
    let mut errors = Vec::new();

    check_length("title", &record.title, rules.title, &mut errors);
    check_length("description", &record.description, rules.description, &mut errors);

    if !is_valid_url(&record.url) {
        errors.push("url is required and must be a valid http(s) URL".to_string());
    }
    if record.image.trim().is_empty() {
        errors.push("image is required".to_string());
    }
    if record.category.trim().is_empty() {
        errors.push("category is required".to_string());
    }

    ValidationReport::from_errors(errors)
}

fn check_length(field: &str, value: &str, rule: LengthRule, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
        return;
    }
    if !rule.accepts(value.chars().count()) {
        errors.push(format!(
            "{field} must be between {} and {} characters",
            rule.min, rule.max
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_title(title: &str) -> BusinessRecord {
        BusinessRecord::new(
            title,
            "Servicios profesionales de peluquería",
            "https://spoo.me/aly_salon",
            "https://via.placeholder.com/300x160",
            "Servicio",
        )
    }

    #[test]
    fn title_boundary_at_three() {
        assert!(!validate(&record_with_title("Al")).valid);
        assert!(validate(&record_with_title("Aly")).valid);
    }

    #[test]
    fn title_upper_boundary() {
        assert!(validate(&record_with_title(&"a".repeat(100))).valid);
        assert!(!validate(&record_with_title(&"a".repeat(101))).valid);
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // three characters, six bytes
        assert!(validate(&record_with_title("ñáé")).valid);
    }

    #[test]
    fn description_bounds() {
        let mut record = record_with_title("Aly Salon");
        record.description = "corta".to_string();
        let report = validate(&record);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("description"));
    }

    #[test]
    fn every_failure_is_reported() {
        let report = validate(&BusinessRecord::default());
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 5);
    }

    #[test]
    fn placeholder_url_is_invalid() {
        let mut record = record_with_title("Proximamente");
        record.url = "#".to_string();
        assert!(!validate(&record).valid);
    }

    #[test]
    fn custom_rules_apply() {
        let rules = ValidationRules {
            title: LengthRule::new(1, 5),
            ..ValidationRules::default()
        };
        assert!(validate_with(&record_with_title("A"), &rules).valid);
        assert!(!validate_with(&record_with_title("Aly Salon"), &rules).valid);
    }
}
