use std::{fs, path::Path};

use anyhow::{Context, Result};
use codecraft_system_execution::Pacing;
use serde::Deserialize;

/// Settings read from the optional `--config` file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Delays used to pace runs.
    pub(crate) pacing: Pacing,
}

impl Config {
    /// Reads and parses a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("parsing config {}", path.display()))
    }

    fn parse(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Config;

    #[test]
    fn empty_config_keeps_default_pacing() {
        let config = Config::parse("").expect("empty config parses");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn pacing_table_overrides_selected_delays() {
        let config = Config::parse("[pacing]\ncommand_interval_ms = 250\nsettle_delay_ms = 0\n")
            .expect("config parses");

        assert_eq!(config.pacing.command_interval(), Duration::from_millis(250));
        assert_eq!(config.pacing.settle_delay(), Duration::ZERO);
        assert_eq!(config.pacing.first_step_delay(), Duration::from_millis(100));
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(Config::parse("[graphics]\nfullscreen = true\n").is_err());
    }
}
