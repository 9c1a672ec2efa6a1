pub mod config;
pub mod logging;

pub mod header_set;
pub mod probe;
pub mod report;
pub mod runner;
pub mod suite;
