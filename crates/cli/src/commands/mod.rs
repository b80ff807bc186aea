//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_server;
pub use validate::run_validate;

use std::path::Path;

use contracts::ServerConfig;

use crate::error::{CliError, Result};

/// Load a configuration file, failing early when it does not exist
fn load_config(path: &Path) -> Result<ServerConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    Ok(config_loader::ConfigLoader::load_from_path(path)?)
}
