//! `hprobe list` – show built-in suites.

use anyhow::Result;
use hprobe_core::suite;

pub fn run_list() -> Result<()> {
    println!("{:<10} {:<6} {:<6} {}", "SUITE", "METHOD", "CASES", "TITLE");
    for s in suite::builtin() {
        println!(
            "{:<10} {:<6} {:<6} {}",
            s.key,
            s.method.to_string(),
            s.cases.len(),
            s.title
        );
    }
    Ok(())
}
