//! Device descriptions stored as TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use logicvc_core::DeviceConfig;

/// Read and check a device description.
pub fn load(path: &Path) -> Result<DeviceConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read device description {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid device description {}", path.display()))
}

/// Parse a device description and reject what bring-up would reject.
pub fn parse(text: &str) -> Result<DeviceConfig> {
    let config: DeviceConfig = toml::from_str(text).context("malformed TOML")?;
    config.normalize()?;
    Ok(config)
}
