//! Structured validation diagnostics
//!
//! Schema validation never raises: integrity problems are collected as tagged
//! diagnostics so the schema stays usable and exportable even when imperfect.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Structural corruption (duplicate keys)
    Error,
    /// Best-effort issues that leave the schema usable
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Warning => f.write_str("WARNING"),
        }
    }
}

/// Machine-checkable tag for a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    DuplicateHubKey,
    DuplicateLinkKey,
    DuplicateSatelliteKey,
    DanglingLinkSource,
    DanglingLinkTarget,
    DanglingSatelliteHub,
    ConfidenceOutOfRange,
    NoHubs,
    LinkWithoutEndpoints,
    DuplicateLinkPair,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_severity() {
        let d = Diagnostic::warning(DiagnosticCode::NoHubs, "no hubs detected");
        assert_eq!(d.to_string(), "WARNING: no hubs detected");
        assert!(!d.is_error());
    }

    #[test]
    fn test_serializes_with_tagged_code() {
        let d = Diagnostic::error(DiagnosticCode::DuplicateHubKey, "dup");
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"duplicate_hub_key\""));
        assert!(json.contains("\"error\""));
    }
}
