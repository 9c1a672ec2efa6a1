//! CLI command handlers.

mod list;
mod probe;

pub use list::run_list;
pub use probe::{run_suites, OutputMode};

#[cfg(test)]
pub(crate) use probe::write_suite;
