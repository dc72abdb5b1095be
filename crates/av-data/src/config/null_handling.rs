//! Missing value handling for data loading

use serde::{Serialize, Deserialize};

/// Null value configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NullConfig {
    /// Patterns to treat as missing
    pub patterns: Vec<String>,

    /// Whether to trim whitespace before checking
    pub trim_whitespace: bool,

    /// Case sensitive matching
    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                String::new(),      // Empty string
                "-".to_string(),
                "N/A".to_string(),
                "NA".to_string(),
                "NaN".to_string(),
                "null".to_string(),
                "None".to_string(),
            ],
            trim_whitespace: true,
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    /// Check if a value should be treated as missing
    pub fn is_null(&self, value: &str) -> bool {
        let test_value = self.normalize(value);

        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                test_value == pattern
            } else {
                test_value.eq_ignore_ascii_case(pattern)
            }
        })
    }

    /// The usable form of a field, or `None` when it counts as missing
    pub fn present<'a>(&self, value: &'a str) -> Option<&'a str> {
        if self.is_null(value) {
            None
        } else {
            Some(self.normalize(value))
        }
    }

    fn normalize<'a>(&self, value: &'a str) -> &'a str {
        if self.trim_whitespace {
            value.trim()
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let config = NullConfig::default();
        assert!(config.is_null(""));
        assert!(config.is_null("  n/a "));
        assert!(config.is_null("nan"));
        assert!(!config.is_null("In Service"));
    }

    #[test]
    fn test_present_trims() {
        let config = NullConfig::default();
        assert_eq!(config.present("  0.75 "), Some("0.75"));
        assert_eq!(config.present("None"), None);
    }

    #[test]
    fn test_case_sensitive() {
        let config = NullConfig {
            patterns: vec!["NULL".to_string()],
            trim_whitespace: false,
            case_sensitive: true,
        };
        assert!(config.is_null("NULL"));
        assert!(!config.is_null("null"));
        assert_eq!(config.present(" x "), Some(" x "));
    }
}
