use regex::Regex;
use serde::{Deserialize, Serialize};

/// Missing-field penalty weight class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Critical,
    Important,
    Other,
}

/// Data-driven format check attached to a field by name. Validators are
/// configuration, not code: a new form ships new data, not a new build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatValidator {
    /// Full-match regular expression over the trimmed value.
    Pattern { pattern: String },
    /// Integer within an inclusive range.
    IntRange { min: i64, max: i64 },
    /// DD/MM/YYYY or YYYY-MM-DD.
    Date,
}

impl FormatValidator {
    pub fn accepts(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            FormatValidator::Pattern { pattern } => match Regex::new(&anchored(pattern)) {
                Ok(re) => re.is_match(value),
                Err(_) => false,
            },
            FormatValidator::IntRange { min, max } => value
                .parse::<i64>()
                .map(|n| n >= *min && n <= *max)
                .unwrap_or(false),
            FormatValidator::Date => is_date(value),
        }
    }

    /// Compile eagerly so a bad pattern is a load-time error, not a
    /// per-document false negative.
    pub fn check_well_formed(&self) -> Result<(), regex::Error> {
        if let FormatValidator::Pattern { pattern } = self {
            Regex::new(&anchored(pattern))?;
        }
        Ok(())
    }
}

fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

fn is_date(value: &str) -> bool {
    let slash = value.split('/').collect::<Vec<_>>();
    if let [day, month, year] = slash.as_slice() {
        return is_digits(day, 2) && is_digits(month, 2) && is_digits(year, 4);
    }
    let dash = value.split('-').collect::<Vec<_>>();
    if let [year, month, day] = dash.as_slice() {
        return is_digits(year, 4) && is_digits(month, 2) && is_digits(day, 2);
    }
    false
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_matches_whole_value() {
        let validator = FormatValidator::Pattern {
            pattern: r"[A-Z]\d{8}".into(),
        };
        assert!(validator.accepts("B12345678"));
        assert!(validator.accepts("  B12345678  "));
        assert!(!validator.accepts("B12345678X"));
        assert!(!validator.accepts("12345678"));
    }

    #[test]
    fn int_range_is_inclusive() {
        let validator = FormatValidator::IntRange { min: 16, max: 67 };
        assert!(validator.accepts("16"));
        assert!(validator.accepts("67"));
        assert!(!validator.accepts("68"));
        assert!(!validator.accepts("old"));
    }

    #[test]
    fn date_accepts_both_layouts() {
        let validator = FormatValidator::Date;
        assert!(validator.accepts("31/12/2024"));
        assert!(validator.accepts("2024-12-31"));
        assert!(!validator.accepts("31-12-2024"));
        assert!(!validator.accepts("2024/12/31"));
    }

    #[test]
    fn malformed_pattern_is_a_load_error() {
        let validator = FormatValidator::Pattern {
            pattern: r"[unclosed".into(),
        };
        assert!(validator.check_well_formed().is_err());
    }
}
