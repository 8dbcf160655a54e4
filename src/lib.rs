pub mod cli;
pub mod config;
pub mod coverage;
pub mod gh;
pub mod logging;
pub mod output;
pub mod workflow;
