//! Parameter file loading
//!
//! Parameter structs are plain `serde::Deserialize` types loaded from TOML
//! files kept under `<COURIER_SW_ROOT>/params`, so a vehicle can be retuned
//! without rebuilding the software.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (COURIER_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parameter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter struct from a TOML file.
///
/// `param_file_path` is relative to the `<COURIER_SW_ROOT>/params` directory.
pub fn load<P: DeserializeOwned>(param_file_path: &str) -> Result<P, LoadError> {
    let mut path = crate::host::get_courier_sw_root().map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    let params_str = fs::read_to_string(path).map_err(LoadError::FileLoadError)?;

    toml::from_str(&params_str).map_err(LoadError::DeserialiseError)
}
