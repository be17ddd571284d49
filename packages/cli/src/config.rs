//! Settings loaded from an optional TOML file and overridden by CLI flags.
//!
//! ```toml
//! title = "Crude rate of hospitalizations with diabetes, 2011"
//!
//! [sweep]
//! start = 100
//! end = 16000000
//! resolution = 500
//! ```

use std::path::Path;

use funnel_plot_limits_models::SweepConfig;
use serde::Deserialize;

/// Run settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Chart title.
    #[serde(default = "default_title")]
    pub title: String,
    /// Limit curve sweep.
    #[serde(default)]
    pub sweep: SweepConfig,
}

fn default_title() -> String {
    "Funnel plot".to_owned()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: default_title(),
            sweep: SweepConfig::default(),
        }
    }
}

/// Values given on the command line, which take precedence over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Smallest population in the limit curve sweep.
    pub sweep_start: Option<u64>,
    /// Largest population in the limit curve sweep.
    pub sweep_end: Option<u64>,
    /// Number of steps the observed population range is divided into.
    pub resolution: Option<u64>,
    /// Chart title.
    pub title: Option<String>,
}

impl Settings {
    /// Replaces every setting for which a flag was given.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(start) = overrides.sweep_start {
            self.sweep.start = start;
        }
        if let Some(end) = overrides.sweep_end {
            self.sweep.end = end;
        }
        if let Some(resolution) = overrides.resolution {
            self.sweep.resolution = resolution;
        }
        if let Some(title) = overrides.title {
            self.title = title;
        }
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid settings TOML.
pub fn load(path: &Path) -> Result<Settings, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    parse(&text).map_err(|e| format!("Failed to parse {}: {e}", path.display()).into())
}

fn parse(text: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(parse("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_sweep_table() {
        let settings = parse("title = \"Diabetes\"\n[sweep]\nend = 2000000\n").unwrap();
        assert_eq!(settings.title, "Diabetes");
        assert_eq!(settings.sweep.start, 100);
        assert_eq!(settings.sweep.end, 2_000_000);
        assert_eq!(settings.sweep.resolution, 500);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(parse("colour = \"red\"\n").is_err());
    }

    #[test]
    fn flags_override_file() {
        let mut settings = parse("[sweep]\nstart = 50\nresolution = 100\n").unwrap();
        settings.apply_overrides(Overrides {
            resolution: Some(250),
            title: Some("Override".to_owned()),
            ..Overrides::default()
        });
        assert_eq!(settings.sweep.start, 50);
        assert_eq!(settings.sweep.resolution, 250);
        assert_eq!(settings.title, "Override");
    }
}
