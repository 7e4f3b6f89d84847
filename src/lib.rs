pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::process::ProcessRunner;
pub use config::{toml_config::DevstartConfig, CliConfig};
pub use core::{
    plan::{build_steps, StepFilter},
    report::BootstrapReport,
    sequence::BootstrapSequence,
};
pub use utils::error::{DevstartError, Result};
