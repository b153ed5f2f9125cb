//! Common functionality for the LCOE evaluation tool.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod commodity;
pub mod evaluate;
pub mod finance;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod process;
pub mod settings;
pub mod site;
pub mod units;

#[cfg(test)]
mod fixture;

/// The location in which program configuration files are stored
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .expect("Could not determine user config directory")
        .join("lcoe_eval")
}
