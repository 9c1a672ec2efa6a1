//! Sequential header probe runner.
//!
//! Issues exactly one request per case, in suite order, and hands each
//! report to the caller as soon as it is ready. Probe failures are part of
//! the report; nothing here returns an error. The caller may stop the run
//! early (e.g. stdout went away), in which case no further requests go out.

use std::ops::ControlFlow;
use std::time::Duration;

use crate::probe::{ProbeOptions, Prober, DEFAULT_FIRST_CHUNK_BYTES};
use crate::report::{ProbeReport, Verdict};
use crate::suite::Suite;

/// Overrides applied on top of a suite's literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub timeout: Option<Duration>,
    pub first_chunk_bytes: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            timeout: None,
            first_chunk_bytes: DEFAULT_FIRST_CHUNK_BYTES,
        }
    }
}

/// Runs every case of `suite` against `url`, calling `on_report` after each.
/// Returns the reports in input order; `ControlFlow::Break` from
/// `on_report` ends the run after the current case.
pub fn run_suite<P, F>(
    prober: &mut P,
    suite: &Suite,
    url: &str,
    settings: &RunSettings,
    mut on_report: F,
) -> Vec<ProbeReport>
where
    P: Prober + ?Sized,
    F: FnMut(&ProbeReport) -> ControlFlow<()>,
{
    let opts = ProbeOptions {
        method: suite.method,
        timeout: settings.timeout.unwrap_or(suite.timeout),
        first_chunk_bytes: settings.first_chunk_bytes,
    };
    tracing::info!(
        "running suite {} ({} cases, {} {}, timeout {:?})",
        suite.key,
        suite.cases.len(),
        opts.method,
        url,
        opts.timeout
    );

    let mut reports = Vec::with_capacity(suite.cases.len());
    for (i, case) in suite.cases.iter().enumerate() {
        let outcome = prober.probe(url, &case.headers, &opts);
        let verdict = Verdict::from_outcome(&outcome, suite.success, suite.error_limit);
        tracing::debug!("case {:?}: {}", case.name, verdict);
        let report = ProbeReport {
            index: i + 1,
            case: case.name.clone(),
            outcome,
            verdict,
        };
        let flow = on_report(&report);
        reports.push(report);
        if flow.is_break() {
            tracing::debug!("suite {} stopped after {} case(s)", suite.key, i + 1);
            break;
        }
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header_set::HeaderSet;
    use crate::probe::{ProbeOutcome, ProbeResponse};
    use crate::suite;

    /// Rejects any request carrying `reject`, records every call.
    struct FakeProber {
        reject: &'static str,
        calls: Vec<(String, HeaderSet, ProbeOptions)>,
    }

    impl FakeProber {
        fn new(reject: &'static str) -> Self {
            Self {
                reject,
                calls: Vec::new(),
            }
        }
    }

    impl Prober for FakeProber {
        fn probe(&mut self, url: &str, headers: &HeaderSet, opts: &ProbeOptions) -> ProbeOutcome {
            self.calls.push((url.to_string(), headers.clone(), *opts));
            if headers.get("X-Timeout").is_some() {
                return ProbeOutcome::Error {
                    message: "[28] Timeout was reached".to_string(),
                };
            }
            let status = if headers.contains(self.reject) { 403 } else { 200 };
            ProbeOutcome::Response(ProbeResponse {
                status,
                content_type: Some("audio/mpeg".to_string()),
                cors_origin: None,
                bytes_received: 0,
            })
        }
    }

    #[test]
    fn one_request_per_case_in_order() {
        let s = suite::combinations();
        let mut p = FakeProber::new("sec-fetch-site");
        let mut seen = Vec::new();
        let reports = run_suite(&mut p, &s, "https://example.test/s", &RunSettings::default(), |r| {
            seen.push(r.case.clone());
            ControlFlow::Continue(())
        });
        assert_eq!(p.calls.len(), s.cases.len());
        assert_eq!(reports.len(), s.cases.len());
        let expected: Vec<_> = s.cases.iter().map(|c| c.name.clone()).collect();
        assert_eq!(seen, expected);
        for (call, case) in p.calls.iter().zip(&s.cases) {
            assert_eq!(call.0, "https://example.test/s");
            assert_eq!(call.1, case.headers);
        }
    }

    #[test]
    fn elimination_isolates_rejected_header() {
        let s = suite::elimination(&suite::chrome_audio_headers());
        let mut p = FakeProber::new("Referer");
        let reports = run_suite(&mut p, &s, "https://example.test/s", &RunSettings::default(), |_| ControlFlow::Continue(()));
        let ok: Vec<_> = reports
            .iter()
            .filter(|r| r.case.starts_with("Without") && r.verdict == Verdict::Ok(200))
            .map(|r| r.case.as_str())
            .collect();
        assert_eq!(ok, ["Without Referer"]);
        let failing_only: Vec<_> = reports
            .iter()
            .filter(|r| r.case.starts_with("Only") && r.verdict == Verdict::Fail(403))
            .map(|r| r.case.as_str())
            .collect();
        assert_eq!(failing_only, ["Only Referer"]);
    }

    #[test]
    fn timeout_override_and_chunk_size_reach_prober() {
        let s = suite::get_requests();
        let mut p = FakeProber::new("none");
        let settings = RunSettings {
            timeout: Some(Duration::from_secs(9)),
            first_chunk_bytes: 16,
        };
        run_suite(&mut p, &s, "http://h/", &settings, |_| ControlFlow::Continue(()));
        for (_, _, opts) in &p.calls {
            assert_eq!(opts.timeout, Duration::from_secs(9));
            assert_eq!(opts.first_chunk_bytes, 16);
            assert_eq!(opts.method, s.method);
        }
    }

    #[test]
    fn break_stops_further_requests() {
        let s = suite::elimination(&suite::chrome_audio_headers());
        let mut p = FakeProber::new("none");
        let reports = run_suite(&mut p, &s, "http://h/", &RunSettings::default(), |r| {
            if r.index == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(p.calls.len(), 3);
        assert_eq!(reports.len(), 3);
    }

    #[test]
    fn error_outcome_has_no_status() {
        let mut s = suite::combinations();
        s.cases = vec![suite::ProbeCase::new(
            "slow",
            HeaderSet::from_pairs([("X-Timeout", "1")]),
        )];
        let mut p = FakeProber::new("none");
        let reports = run_suite(&mut p, &s, "http://h/", &RunSettings::default(), |_| ControlFlow::Continue(()));
        assert!(reports[0].outcome.status().is_none());
        assert!(matches!(reports[0].verdict, Verdict::Error(_)));
    }
}
