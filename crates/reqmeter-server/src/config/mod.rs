//! Server config loader.
//!
//! Layers, lowest first: built-in defaults, an optional strict YAML file named
//! by `REQMETER_CONFIG`, then the `PORT` environment variable.

pub mod schema;

use std::collections::HashMap;
use std::fs;

use reqmeter_core::error::{Error, Result};

pub use schema::{Config, MetricsSection, ServerSection};

/// Env var naming an optional YAML config file.
pub const CONFIG_PATH_VAR: &str = "REQMETER_CONFIG";
/// Env var overriding `server.port`.
pub const PORT_VAR: &str = "PORT";

pub fn load_from_file(path: &str) -> Result<Config> {
    let s = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<Config> {
    let cfg: Config =
        serde_yaml::from_str(s).map_err(|e| Error::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve config from an explicit variable map.
pub fn from_vars(vars: &HashMap<String, String>) -> Result<Config> {
    let mut cfg = match vars.get(CONFIG_PATH_VAR) {
        Some(path) => load_from_file(path)?,
        None => Config::default(),
    };

    // An empty PORT (e.g. `PORT=` in an env file) leaves the port unset.
    if let Some(raw) = vars.get(PORT_VAR).filter(|raw| !raw.trim().is_empty()) {
        cfg.server.port = raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{PORT_VAR}={raw:?} is not a valid port: {e}")))?;
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Resolve config from the process environment.
pub fn from_env() -> Result<Config> {
    let vars: HashMap<String, String> = std::env::vars().collect();
    from_vars(&vars)
}
