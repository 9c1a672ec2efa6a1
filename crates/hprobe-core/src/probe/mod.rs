//! One HTTP request per header set.
//!
//! Uses the curl crate (libcurl) for HEAD and streaming GET. A GET keeps
//! only the first body chunk and then aborts the transfer, so an endless
//! audio stream costs one read. Transport failures become
//! [`ProbeOutcome::Error`] instead of propagating.

mod error;
mod parse;

pub use error::ProbeError;

use crate::header_set::HeaderSet;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::str;
use std::time::Duration;

/// Default size of the body read for streaming GET probes.
pub const DEFAULT_FIRST_CHUNK_BYTES: usize = 1024;

/// Request method of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Head,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Head => f.write_str("HEAD"),
        }
    }
}

/// Per-request parameters shared by every case of a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    pub method: Method,
    /// Bounds connect and the whole transfer.
    pub timeout: Duration,
    /// Upper bound on the body bytes read by a GET.
    pub first_chunk_bytes: usize,
}

impl ProbeOptions {
    pub fn new(method: Method, timeout: Duration) -> Self {
        Self {
            method,
            timeout,
            first_chunk_bytes: DEFAULT_FIRST_CHUNK_BYTES,
        }
    }
}

/// Attributes captured from a response that arrived within the timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResponse {
    pub status: u32,
    pub content_type: Option<String>,
    pub cors_origin: Option<String>,
    /// Size of the first body chunk (0 for HEAD or an empty body).
    pub bytes_received: u64,
}

/// Either a status code (with attributes) or an error description, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Response(ProbeResponse),
    Error { message: String },
}

impl ProbeOutcome {
    pub fn status(&self) -> Option<u32> {
        match self {
            ProbeOutcome::Response(r) => Some(r.status),
            ProbeOutcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Response(_) => None,
            ProbeOutcome::Error { message } => Some(message),
        }
    }
}

impl From<Result<ProbeResponse, ProbeError>> for ProbeOutcome {
    fn from(res: Result<ProbeResponse, ProbeError>) -> Self {
        match res {
            Ok(r) => ProbeOutcome::Response(r),
            Err(e) => ProbeOutcome::Error {
                message: e.to_string(),
            },
        }
    }
}

/// Issues exactly one request per call.
pub trait Prober {
    fn probe(&mut self, url: &str, headers: &HeaderSet, opts: &ProbeOptions) -> ProbeOutcome;
}

/// libcurl-backed prober. Each call builds and drops its own easy handle,
/// so no connection outlives the probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlProber;

impl Prober for CurlProber {
    fn probe(&mut self, url: &str, headers: &HeaderSet, opts: &ProbeOptions) -> ProbeOutcome {
        tracing::debug!(
            "{} {} with {} header(s), timeout {:?}",
            opts.method,
            url,
            headers.len(),
            opts.timeout
        );
        let res = perform(url, headers, opts);
        match &res {
            Ok(r) => tracing::info!(
                status = r.status,
                bytes = r.bytes_received,
                "{} {} completed",
                opts.method,
                url
            ),
            Err(e) => tracing::info!(timeout = e.is_timeout(), "{} {} failed: {}", opts.method, url, e),
        }
        res.into()
    }
}

/// Checks that `url` is an absolute http(s) URL before handing it to curl.
pub fn validate_url(url: &str) -> Result<(), ProbeError> {
    let parsed = url::Url::parse(url).map_err(|source| ProbeError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ProbeError::UnsupportedScheme(other.to_string())),
    }
}

/// Performs the request and collects the response attributes.
pub fn perform(
    url: &str,
    headers: &HeaderSet,
    opts: &ProbeOptions,
) -> Result<ProbeResponse, ProbeError> {
    validate_url(url)?;

    let mut lines: Vec<String> = Vec::new();
    let received = Cell::new(0u64);
    let aborted = Cell::new(false);
    let cap = (opts.first_chunk_bytes as u64).max(1);

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    match opts.method {
        Method::Head => {
            easy.nobody(true)?;
            easy.follow_location(false)?;
        }
        Method::Get => {
            easy.get(true)?;
            easy.follow_location(true)?;
            easy.max_redirections(10)?;
        }
    }
    easy.connect_timeout(opts.timeout)?;
    easy.timeout(opts.timeout)?;

    let mut list = curl::easy::List::new();
    for line in headers.to_lines() {
        list.append(&line)?;
    }
    // libcurl adds `Accept: */*` on its own; an empty value suppresses it so
    // the set on the wire is exactly the one defined.
    if !headers.contains("Accept") {
        list.append("Accept:")?;
    }
    easy.http_headers(list)?;

    let result = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            let total = received.get().saturating_add(data.len() as u64);
            if total < cap {
                received.set(total);
                return Ok(data.len());
            }
            received.set(cap);
            aborted.set(true);
            // Returning short makes libcurl stop with a write error.
            Ok(0)
        })?;
        transfer.perform()
    };

    match result {
        Ok(()) => {}
        Err(e) if e.is_write_error() && aborted.get() => {}
        // Status and headers arrived; only the body stalled.
        Err(e) if e.is_operation_timedout() && headers_complete(&lines) => {
            tracing::debug!("{} {}: body stalled after headers: {}", opts.method, url, e);
        }
        Err(e) => return Err(e.into()),
    }

    let parsed = parse::parse_headers(&lines);
    let status = match easy.response_code()? {
        0 => parsed.status.ok_or(ProbeError::NoStatus)?,
        code => code,
    };

    Ok(ProbeResponse {
        status,
        content_type: parsed.content_type,
        cors_origin: parsed.cors_origin,
        bytes_received: received.get(),
    })
}

/// True when the last header block seen was terminated by its blank line.
fn headers_complete(lines: &[String]) -> bool {
    lines.last().is_some_and(|l| l.is_empty()) && parse::parse_headers(lines).status.is_some()
}
