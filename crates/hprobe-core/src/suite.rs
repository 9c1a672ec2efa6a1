//! Named header probes grouped into suites: the built-in diagnostics and
//! user-defined suites loaded from TOML.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::header_set::HeaderSet;
use crate::probe::Method;

/// Endpoint the built-in suites were written against.
pub const DEFAULT_TARGET_URL: &str = "https://ice3.somafm.com/groovesalad-128-mp3";

const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36";
const SHORT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const LOCAL_REFERER: &str = "http://localhost:5173/";

/// One header probe: a label and the exact headers to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeCase {
    pub name: String,
    #[serde(default)]
    pub headers: HeaderSet,
}

impl ProbeCase {
    pub fn new(name: impl Into<String>, headers: HeaderSet) -> Self {
        Self {
            name: name.into(),
            headers,
        }
    }
}

/// Which statuses count as OK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuccessRule {
    /// Anything below 400 (redirects included).
    #[default]
    Below400,
    /// Only 200; a 206 or 302 from a stream endpoint is reported as FAIL.
    Exactly200,
}

impl SuccessRule {
    pub fn is_ok(self, status: u32) -> bool {
        match self {
            SuccessRule::Below400 => status < 400,
            SuccessRule::Exactly200 => status == 200,
        }
    }
}

/// How results are laid out on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    /// One `name | verdict` line per case.
    #[default]
    Table,
    /// A block per case with status, content type, and bytes received.
    Verbose,
}

/// Ordered cases sharing method, timeout, and success rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    pub key: String,
    pub title: String,
    pub method: Method,
    pub timeout: Duration,
    pub success: SuccessRule,
    pub style: ReportStyle,
    /// Error messages are cut to this many characters when printed.
    pub error_limit: usize,
    /// Overrides the configured target when set (suite files only).
    pub url: Option<String>,
    /// Printed after the closing rule.
    pub footer: Vec<String>,
    pub cases: Vec<ProbeCase>,
}

/// Full Chrome request for an `<audio>` element, the set the upstream rejected.
pub fn chrome_audio_headers() -> HeaderSet {
    HeaderSet::from_pairs([
        ("Accept", "*/*"),
        ("Accept-Encoding", "identity;q=1, *;q=0"),
        ("Range", "bytes=0-"),
        ("Referer", LOCAL_REFERER),
        ("User-Agent", CHROME_UA),
        ("sec-ch-ua", r#""Chromium";v="141", "Not?A_Brand";v="8""#),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", r#""Windows""#),
        ("sec-fetch-dest", "audio"),
        ("sec-fetch-mode", "no-cors"),
        ("sec-fetch-site", "cross-site"),
    ])
}

fn browser_like_headers() -> HeaderSet {
    HeaderSet::from_pairs([
        ("Accept", "*/*"),
        ("Accept-Encoding", "identity;q=1, *;q=0"),
        ("Range", "bytes=0-"),
        ("Referer", LOCAL_REFERER),
        ("User-Agent", CHROME_UA),
    ])
}

/// HEAD requests over hand-picked header combinations.
pub fn combinations() -> Suite {
    let range = HeaderSet::from_pairs([("Range", "bytes=0-")]);
    let cases = vec![
        ProbeCase::new("No headers", HeaderSet::new()),
        ProbeCase::new("Just Range", range.clone()),
        ProbeCase::new("Range + Accept", range.with("Accept", "*/*")),
        ProbeCase::new("Range + User-Agent", range.with("User-Agent", SHORT_UA)),
        ProbeCase::new(
            "Range + Referer (localhost)",
            range.with("Referer", LOCAL_REFERER),
        ),
        ProbeCase::new(
            "Range + Referer (somafm)",
            range.with("Referer", "https://somafm.com/"),
        ),
        ProbeCase::new("Browser-like headers (no GPC)", browser_like_headers()),
        ProbeCase::new("Browser-like + GPC", gpc_browser_headers()),
        ProbeCase::new("Chrome without GPC", chrome_audio_headers()),
    ];
    Suite {
        key: "combos".to_string(),
        title: "Header combinations (HEAD)".to_string(),
        method: Method::Head,
        timeout: Duration::from_secs(5),
        success: SuccessRule::Below400,
        style: ReportStyle::Table,
        error_limit: 40,
        url: None,
        footer: vec![
            "Key Findings:".to_string(),
            "   - Compare which headers cause failures".to_string(),
            "   - If 'No headers' works but browser headers fail, we found the issue".to_string(),
        ],
        cases,
    }
}

// Sec-GPC sits between Referer and User-Agent, where Firefox sends it.
fn gpc_browser_headers() -> HeaderSet {
    let base = browser_like_headers();
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (n, v) in base.iter() {
        if n.eq_ignore_ascii_case("User-Agent") {
            pairs.push(("Sec-GPC".to_string(), "1".to_string()));
        }
        pairs.push((n.to_string(), v.to_string()));
    }
    HeaderSet::from_pairs(pairs)
}

/// Leave-one-out then keep-one-only over `base`: `2 * base.len()` cases.
pub fn elimination_cases(base: &HeaderSet) -> Vec<ProbeCase> {
    let without = base
        .names()
        .map(|n| ProbeCase::new(format!("Without {}", n), base.without(n)));
    let only = base
        .names()
        .map(|n| ProbeCase::new(format!("Only {}", n), base.only(n)));
    without.chain(only).collect()
}

/// Streaming GETs that remove (then isolate) one header of `base` at a time.
pub fn elimination(base: &HeaderSet) -> Suite {
    Suite {
        key: "eliminate".to_string(),
        title: "Which specific headers cause 403 on GET requests".to_string(),
        method: Method::Get,
        timeout: Duration::from_secs(2),
        success: SuccessRule::Exactly200,
        style: ReportStyle::Table,
        error_limit: 30,
        url: None,
        footer: Vec::new(),
        cases: elimination_cases(base),
    }
}

/// Three verbose streaming GETs: bare, full Chrome, and UA + Range.
pub fn get_requests() -> Suite {
    Suite {
        key: "get".to_string(),
        title: "GET requests".to_string(),
        method: Method::Get,
        timeout: Duration::from_secs(3),
        success: SuccessRule::Exactly200,
        style: ReportStyle::Verbose,
        error_limit: 200,
        url: None,
        footer: Vec::new(),
        cases: vec![
            ProbeCase::new("Minimal GET request (no special headers)", HeaderSet::new()),
            ProbeCase::new("Full browser-like headers (Chrome)", chrome_audio_headers()),
            ProbeCase::new(
                "Only User-Agent + Range",
                HeaderSet::from_pairs([("Range", "bytes=0-"), ("User-Agent", SHORT_UA)]),
            ),
        ],
    }
}

/// Built-in suites in the order a bare `hprobe` runs them.
pub fn builtin() -> Vec<Suite> {
    vec![
        combinations(),
        elimination(&chrome_audio_headers()),
        get_requests(),
    ]
}

/// Looks up a built-in suite by key (`combos`, `eliminate`, `get`).
pub fn builtin_by_key(key: &str) -> Option<Suite> {
    builtin().into_iter().find(|s| s.key == key)
}

/// On-disk suite definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteFile {
    pub title: String,
    pub method: Method,
    pub timeout_secs: u64,
    #[serde(default)]
    pub success: SuccessRule,
    #[serde(default)]
    pub style: ReportStyle,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_error_limit")]
    pub error_limit: usize,
    #[serde(default)]
    pub cases: Vec<ProbeCase>,
}

fn default_error_limit() -> usize {
    40
}

impl SuiteFile {
    pub fn into_suite(self, key: &str) -> Result<Suite> {
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        if self.cases.is_empty() {
            bail!("suite {:?} has no cases", self.title);
        }
        Ok(Suite {
            key: key.to_string(),
            title: self.title,
            method: self.method,
            timeout: Duration::from_secs(self.timeout_secs),
            success: self.success,
            style: self.style,
            error_limit: self.error_limit,
            url: self.url,
            footer: Vec::new(),
            cases: self.cases,
        })
    }
}

/// Parses a suite from TOML text.
pub fn parse_suite(toml_text: &str, key: &str) -> Result<Suite> {
    let file: SuiteFile = toml::from_str(toml_text).context("invalid suite file")?;
    file.into_suite(key)
}

/// Loads a suite file; the key is the file stem.
pub fn load_suite(path: &Path) -> Result<Suite> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read suite file: {}", path.display()))?;
    let key = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("suite");
    parse_suite(&data, key).with_context(|| format!("load suite: {}", path.display()))
}
