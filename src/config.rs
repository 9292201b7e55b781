use std::path::{Path, PathBuf};

use color_eyre::eyre::{self, WrapErr};
use roidnav::routing::RouteConfig;
use serde::{Deserialize, Serialize};

/// Settings read from `roidnav.toml`. Command-line flags take priority.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON-lines body catalog.
    pub catalog: Option<PathBuf>,
    /// Day to route on. Defaults to the current day.
    pub day: Option<f64>,
    pub route: RouteConfig,
}

impl Config {
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).wrap_err_with(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.route.validate()?;
        Ok(config)
    }
}
