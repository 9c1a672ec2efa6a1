//! Turning probe outcomes into the lines printed on stdout.

use serde::Serialize;
use std::fmt;

use crate::probe::{Method, ProbeOutcome};
use crate::suite::{ReportStyle, Suite, SuccessRule};

/// Width of the case-name column in table output.
pub const NAME_WIDTH: usize = 40;

/// Width of the `=` rule printed around a suite.
pub const RULE_WIDTH: usize = 80;

/// Result of one probe after applying the suite's success rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Ok(u32),
    Fail(u32),
    Error(String),
}

impl Verdict {
    /// `limit` caps the error message in characters.
    pub fn from_outcome(outcome: &ProbeOutcome, rule: SuccessRule, limit: usize) -> Self {
        match outcome {
            ProbeOutcome::Response(r) if rule.is_ok(r.status) => Verdict::Ok(r.status),
            ProbeOutcome::Response(r) => Verdict::Fail(r.status),
            ProbeOutcome::Error { message } => Verdict::Error(truncate(message, limit)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Ok(_) => "ok",
            Verdict::Fail(_) => "fail",
            Verdict::Error(_) => "error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok(code) => write!(f, "OK {}", code),
            Verdict::Fail(code) => write!(f, "FAIL {}", code),
            Verdict::Error(msg) => write!(f, "ERROR: {}", msg),
        }
    }
}

/// One finished probe.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Position in the suite, starting at 1.
    pub index: usize,
    pub case: String,
    pub outcome: ProbeOutcome,
    pub verdict: Verdict,
}

/// Cuts `s` to at most `limit` characters on a char boundary.
pub fn truncate(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Heading printed before a suite's rule.
pub fn suite_heading(suite: &Suite, url: &str) -> String {
    format!("{} ({} {})", suite.title, suite.method, url)
}

/// Lines printed for one report. Table style yields one line, plus a CORS
/// annotation for HEAD probes that got `Access-Control-Allow-Origin`.
pub fn format_report(suite: &Suite, report: &ProbeReport) -> Vec<String> {
    match suite.style {
        ReportStyle::Table => {
            let mut out = vec![format!(
                "{:<width$} | {}",
                report.case,
                report.verdict,
                width = NAME_WIDTH
            )];
            if suite.method == Method::Head {
                if let ProbeOutcome::Response(r) = &report.outcome {
                    if let Some(origin) = &r.cors_origin {
                        out.push(format!("{:<width$} | CORS: {}", "", origin, width = NAME_WIDTH));
                    }
                }
            }
            out
        }
        ReportStyle::Verbose => {
            let mut out = vec![format!("Test {}: {}", report.index, report.case)];
            match &report.outcome {
                ProbeOutcome::Response(r) => {
                    out.push(format!("  Status: {}", r.status));
                    out.push(format!(
                        "  Content-Type: {}",
                        r.content_type.as_deref().unwrap_or("None")
                    ));
                    if suite.method == Method::Get {
                        out.push(format!("  Data received: {} bytes", r.bytes_received));
                    }
                }
                ProbeOutcome::Error { message } => {
                    out.push(format!("  ERROR: {}", truncate(message, suite.error_limit)));
                }
            }
            out.push(String::new());
            out
        }
    }
}

/// Machine-readable form of a report (`--json`, one object per line).
#[derive(Debug, Serialize)]
pub struct JsonRecord<'a> {
    pub suite: &'a str,
    pub case: &'a str,
    pub method: Method,
    pub status: Option<u32>,
    pub content_type: Option<&'a str>,
    pub cors_origin: Option<&'a str>,
    pub bytes_received: Option<u64>,
    pub error: Option<&'a str>,
    pub verdict: &'static str,
}

impl<'a> JsonRecord<'a> {
    pub fn new(suite: &'a Suite, report: &'a ProbeReport) -> Self {
        let (status, content_type, cors_origin, bytes_received) = match &report.outcome {
            ProbeOutcome::Response(r) => (
                Some(r.status),
                r.content_type.as_deref(),
                r.cors_origin.as_deref(),
                Some(r.bytes_received),
            ),
            ProbeOutcome::Error { .. } => (None, None, None, None),
        };
        // Same cut as the text report.
        let error = match &report.verdict {
            Verdict::Error(m) => Some(m.as_str()),
            _ => None,
        };
        Self {
            suite: &suite.key,
            case: &report.case,
            method: suite.method,
            status,
            content_type,
            cors_origin,
            bytes_received,
            error,
            verdict: report.verdict.label(),
        }
    }
}

pub fn format_json(suite: &Suite, report: &ProbeReport) -> serde_json::Result<String> {
    serde_json::to_string(&JsonRecord::new(suite, report))
}
