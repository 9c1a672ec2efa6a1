//! Tests for argument parsing.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_no_args_runs_everything() {
    let cli = parse(&["hprobe"]);
    assert!(cli.command.is_none());
    assert!(cli.url.is_none());
    assert!(cli.timeout.is_none());
    assert!(!cli.json);
}

#[test]
fn cli_parse_combos() {
    match parse(&["hprobe", "combos"]).command {
        Some(CliCommand::Combos) => {}
        other => panic!("expected Combos, got {:?}", other),
    }
}

#[test]
fn cli_parse_eliminate_headers() {
    match parse(&[
        "hprobe",
        "eliminate",
        "-H",
        "Range: bytes=0-",
        "--header",
        "Referer: http://localhost:5173/",
    ])
    .command
    {
        Some(CliCommand::Eliminate { headers }) => {
            assert_eq!(headers, ["Range: bytes=0-", "Referer: http://localhost:5173/"]);
        }
        other => panic!("expected Eliminate, got {:?}", other),
    }
}

#[test]
fn cli_parse_eliminate_default_base() {
    match parse(&["hprobe", "eliminate"]).command {
        Some(CliCommand::Eliminate { headers }) => assert!(headers.is_empty()),
        other => panic!("expected Eliminate, got {:?}", other),
    }
}

#[test]
fn cli_parse_run_suite_file() {
    match parse(&["hprobe", "run", "probes/referer.toml"]).command {
        Some(CliCommand::Run { path }) => assert_eq!(path, Path::new("probes/referer.toml")),
        other => panic!("expected Run, got {:?}", other),
    }
}

#[test]
fn cli_parse_global_flags_after_subcommand() {
    let cli = parse(&[
        "hprobe",
        "get",
        "--url",
        "https://ice6.somafm.com/groovesalad-128-mp3",
        "--timeout",
        "10",
        "--json",
    ]);
    assert!(matches!(cli.command, Some(CliCommand::Get)));
    assert_eq!(
        cli.url.as_deref(),
        Some("https://ice6.somafm.com/groovesalad-128-mp3")
    );
    assert_eq!(cli.timeout, Some(10));
    assert!(cli.json);
}

#[test]
fn cli_parse_list() {
    assert!(matches!(parse(&["hprobe", "list"]).command, Some(CliCommand::List)));
}

#[test]
fn cli_rejects_bad_timeout_and_unknown_command() {
    assert!(Cli::try_parse_from(["hprobe", "--timeout", "soon"]).is_err());
    assert!(Cli::try_parse_from(["hprobe", "download"]).is_err());
}
