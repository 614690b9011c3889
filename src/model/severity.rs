use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Bottleneck severity.
///
/// Input is case-insensitive. Anything outside the four canonical levels is
/// kept as `Other` and renders in the neutral "Info" category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Other(String),
}

impl Severity {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Other(raw.to_string()),
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, Severity::Other(_))
    }

    /// Canonical display label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Other(_) => "Info",
        }
    }

    /// Lower-case badge category for styling hooks.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Other(_) => "info",
        }
    }

    /// Badge background used by the standalone HTML report.
    pub fn badge_color(&self) -> &'static str {
        match self {
            Severity::Critical => "#dc2626",
            Severity::High => "#ea580c",
            Severity::Medium => "#ca8a04",
            Severity::Low => "#2563eb",
            Severity::Other(_) => "#6b7280",
        }
    }

    /// Sort key, most severe first.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Other(_) => 4,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Other(String::new())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Severity::Other(raw) => serializer.serialize_str(raw),
            canonical => serializer.serialize_str(canonical.label()),
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => Severity::parse(&raw),
            _ => Severity::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Severity::parse("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::parse(" high "), Severity::High);
        assert_eq!(Severity::parse("Medium"), Severity::Medium);
        assert_eq!(Severity::parse("low"), Severity::Low);
    }

    #[test]
    fn test_unknown_severity_is_neutral() {
        let sev = Severity::parse("Catastrophic");
        assert!(!sev.is_canonical());
        assert_eq!(sev.label(), "Info");
        assert_eq!(sev.badge_class(), "info");
        assert_eq!(sev.to_string(), "Info");
    }

    #[test]
    fn test_serializes_canonical_form() {
        let json = serde_json::to_string(&Severity::parse("hIgH")).unwrap();
        assert_eq!(json, "\"High\"");

        let other: Severity = serde_json::from_str("\"blocker\"").unwrap();
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"blocker\"");

        let non_string: Severity = serde_json::from_str("3").unwrap();
        assert_eq!(non_string, Severity::default());
    }

    #[test]
    fn test_rank_orders_most_severe_first() {
        let mut all = vec![
            Severity::Low,
            Severity::Other("x".into()),
            Severity::Critical,
            Severity::Medium,
            Severity::High,
        ];
        all.sort_by_key(Severity::rank);
        assert_eq!(all[0], Severity::Critical);
        assert_eq!(all[4].label(), "Info");
    }
}
