pub mod cli;
pub mod config;
pub mod outcome;
pub mod probe;
pub mod progress;
pub mod report;
pub mod runner;
pub mod store;
