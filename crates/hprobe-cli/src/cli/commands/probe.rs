//! Running suites and printing their reports as each probe finishes.

use anyhow::{Context, Result};
use hprobe_core::probe::{CurlProber, Prober};
use hprobe_core::report;
use hprobe_core::runner::{run_suite, RunSettings};
use hprobe_core::suite::Suite;
use std::io::{self, Write};
use std::ops::ControlFlow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

/// Runs `suites` in order against `url` with libcurl, writing to stdout.
pub fn run_suites(suites: &[Suite], url: &str, settings: &RunSettings, mode: OutputMode) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut prober = CurlProber;
    for suite in suites {
        let url = suite.url.as_deref().unwrap_or(url);
        write_suite(&mut out, &mut prober, suite, url, settings, mode)?;
    }
    Ok(())
}

/// Writes one suite's report. Probe failures are part of the output; only
/// write errors are returned, and the first one stops the remaining probes.
pub(crate) fn write_suite<W, P>(
    out: &mut W,
    prober: &mut P,
    suite: &Suite,
    url: &str,
    settings: &RunSettings,
    mode: OutputMode,
) -> Result<()>
where
    W: Write,
    P: Prober + ?Sized,
{
    if mode == OutputMode::Text {
        writeln!(out, "{}", report::suite_heading(suite, url))?;
        writeln!(out, "{}", report::rule())?;
        out.flush()?;
    }

    let mut write_err: Option<io::Error> = None;
    run_suite(prober, suite, url, settings, |r| {
        let res = match mode {
            OutputMode::Text => report::format_report(suite, r)
                .iter()
                .try_for_each(|line| writeln!(out, "{}", line)),
            OutputMode::Json => match report::format_json(suite, r) {
                Ok(line) => writeln!(out, "{}", line),
                Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            },
        };
        match res.and_then(|()| out.flush()) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                write_err = Some(e);
                ControlFlow::Break(())
            }
        }
    });
    if let Some(e) = write_err {
        return Err(e).context("write report");
    }

    if mode == OutputMode::Text {
        writeln!(out, "{}", report::rule())?;
        for line in &suite.footer {
            writeln!(out, "{}", line)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
