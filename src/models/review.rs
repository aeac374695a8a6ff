//! Review findings as produced by the language model.
//!
//! The model answers with a severity-bucketed JSON object. Line numbers are
//! kept as raw JSON values here; coercion to an integer happens in the
//! delivery pipeline so an unparseable line marks that one finding failed
//! instead of rejecting the whole report.

use crate::error::AppError;
use serde::Deserialize;

/// Finding severity, in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Fixed order findings are delivered and rendered in.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Critical => "🔴",
            Self::High => "🟡",
            Self::Medium => "🔵",
            Self::Low => "🟢",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One finding from the review, as the model emitted it.
#[derive(Debug, Clone, Deserialize)]
pub struct Finding {
    #[serde(default = "unknown_file")]
    pub file: String,

    /// New-file line number. Kept raw; see [`Finding::line_number`].
    #[serde(default)]
    pub line: serde_json::Value,

    #[serde(default = "no_description")]
    pub issue: String,
}

fn unknown_file() -> String {
    "unknown".to_string()
}

fn no_description() -> String {
    "No description".to_string()
}

impl Finding {
    /// Coerce the raw line value to a positive integer.
    ///
    /// The model is told to emit numbers but sometimes emits `"42"` or
    /// ranges like `"10-15"`; plain numeric strings are accepted, anything
    /// else is an invalid record.
    pub fn line_number(&self) -> Result<i64, AppError> {
        match &self.line {
            serde_json::Value::Number(n) => n
                .as_i64()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::invalid_input(format!("bad line number: {}", n))),
            serde_json::Value::String(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::invalid_input(format!("bad line number: {:?}", s))),
            other => Err(AppError::invalid_input(format!(
                "bad line number: {}",
                other
            ))),
        }
    }

    /// `file:line` as shown in listings and bundle comments.
    pub fn location(&self) -> String {
        let line = match &self.line {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s.clone(),
            _ => "?".to_string(),
        };
        format!("{}:{}", self.file, line)
    }
}

/// Severity-bucketed review report plus optional summary line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewReport {
    #[serde(default)]
    pub critical: Vec<Finding>,
    #[serde(default)]
    pub high: Vec<Finding>,
    #[serde(default)]
    pub medium: Vec<Finding>,
    #[serde(default)]
    pub low: Vec<Finding>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl ReviewReport {
    /// Findings for one severity bucket.
    pub fn bucket(&self, severity: Severity) -> &[Finding] {
        match severity {
            Severity::Critical => &self.critical,
            Severity::High => &self.high,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
        }
    }

    /// Total number of findings across all severities.
    pub fn total(&self) -> usize {
        Severity::ALL.iter().map(|s| self.bucket(*s).len()).sum()
    }

    /// Iterate all findings in fixed severity order.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, &Finding)> {
        Severity::ALL
            .into_iter()
            .flat_map(move |s| self.bucket(s).iter().map(move |f| (s, f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn finding(line: serde_json::Value) -> Finding {
        Finding {
            file: "src/main.rs".into(),
            line,
            issue: "something".into(),
        }
    }

    #[test]
    fn test_line_number_from_number() {
        assert_eq!(finding(json!(42)).line_number().unwrap(), 42);
    }

    #[test]
    fn test_line_number_from_numeric_string() {
        assert_eq!(finding(json!("42")).line_number().unwrap(), 42);
    }

    #[test]
    fn test_line_number_rejects_ranges_and_missing() {
        assert!(finding(json!("10-15")).line_number().is_err());
        assert!(finding(json!(null)).line_number().is_err());
        assert!(finding(json!("approx 20")).line_number().is_err());
        assert!(finding(json!(0)).line_number().is_err());
    }

    #[test]
    fn test_report_total_and_order() {
        let report: ReviewReport = serde_json::from_value(json!({
            "critical": [{"file": "a.rs", "line": 1, "issue": "x"}],
            "low": [{"file": "b.rs", "line": 2, "issue": "y"}],
            "summary": "ok"
        }))
        .unwrap();
        assert_eq!(report.total(), 2);
        let severities: Vec<Severity> = report.iter().map(|(s, _)| s).collect();
        assert_eq!(severities, vec![Severity::Critical, Severity::Low]);
    }

    #[test]
    fn test_report_tolerates_missing_buckets() {
        let report: ReviewReport = serde_json::from_str("{}").unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.summary.is_none());
    }

    #[test]
    fn test_location_rendering() {
        assert_eq!(finding(json!(7)).location(), "src/main.rs:7");
        assert_eq!(finding(json!("?")).location(), "src/main.rs:?");
    }
}
