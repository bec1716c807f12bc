/// Output configuration
use crate::error::{OutputError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Arguments every native instance is created with
const BASE_ARGS: &[&str] = &["--ignore-config", "--extraintf=logger"];

/// Video is never rendered by an audio output
const NO_VIDEO_ARGS: &[&str] = &["--no-video", "--no-xlib"];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_backend")]
    pub backend: BackendSettings,

    /// Remaining time, in milliseconds, at which about-to-finish fires
    #[serde(default = "default_about_to_finish_ms")]
    pub about_to_finish_ms: i64,

    /// Volume applied when the output is created, 0.0..=1.0
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl OutputConfig {
    /// Load configuration from `cadence.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from("cadence.toml");
        Self::build(config_path.exists().then_some(config_path.as_path()))
    }

    /// Load configuration from an explicit file, then environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OutputError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Self::build(Some(path))
    }

    fn build(file: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = file {
            settings = settings.add_source(config::File::from(path));
        }

        // Override with environment variables, e.g. CADENCE_BACKEND__VERBOSE
        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.about_to_finish_ms < 0 {
            return Err(OutputError::Config(format!(
                "about_to_finish_ms must not be negative (got {})",
                self.about_to_finish_ms
            )));
        }

        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(OutputError::Config(format!(
                "initial_volume must be within 0.0..=1.0 (got {})",
                self.initial_volume
            )));
        }

        Ok(())
    }

    /// Arguments for creating the native library instance
    pub fn backend_args(&self) -> Vec<String> {
        let mut args: Vec<String> = BASE_ARGS.iter().map(ToString::to_string).collect();
        if self.backend.verbose {
            args.push("--verbose=3".to_string());
        }
        args.extend(NO_VIDEO_ARGS.iter().map(ToString::to_string));
        args.extend(self.backend.extra_args.iter().cloned());
        args
    }
}

// Default values
fn default_backend() -> BackendSettings {
    BackendSettings {
        verbose: false,
        extra_args: Vec::new(),
    }
}

fn default_about_to_finish_ms() -> i64 {
    2000
}

fn default_initial_volume() -> f64 {
    1.0
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            about_to_finish_ms: default_about_to_finish_ms(),
            initial_volume: default_initial_volume(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_args_disable_video() {
        let args = OutputConfig::default().backend_args();
        assert_eq!(
            args,
            vec!["--ignore-config", "--extraintf=logger", "--no-video", "--no-xlib"]
        );
    }

    #[test]
    fn verbose_and_extra_args_are_appended() {
        let mut config = OutputConfig::default();
        config.backend.verbose = true;
        config.backend.extra_args = vec!["--aout=alsa".to_string()];

        let args = config.backend_args();
        assert_eq!(args[2], "--verbose=3");
        assert_eq!(args.last().map(String::as_str), Some("--aout=alsa"));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = OutputConfig::default();
        assert!(config.validate().is_ok());

        config.initial_volume = 1.5;
        assert!(matches!(config.validate(), Err(OutputError::Config(_))));

        config.initial_volume = 0.5;
        config.about_to_finish_ms = -1;
        assert!(matches!(config.validate(), Err(OutputError::Config(_))));
    }

    #[test]
    fn load_from_file_fills_missing_fields() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "about_to_finish_ms = 3500").unwrap();
        writeln!(file, "[backend]").unwrap();
        writeln!(file, "verbose = true").unwrap();

        let config = OutputConfig::load_from(file.path()).unwrap();
        assert_eq!(config.about_to_finish_ms, 3500);
        assert!(config.backend.verbose);
        assert!(config.backend.extra_args.is_empty());
        assert_eq!(config.initial_volume, 1.0);
    }

    #[test]
    fn load_from_missing_file_fails() {
        let result = OutputConfig::load_from("/nonexistent/cadence.toml");
        assert!(matches!(result, Err(OutputError::Config(_))));
    }

    #[test]
    fn load_from_rejects_invalid_volume() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "initial_volume = 4.0").unwrap();

        assert!(OutputConfig::load_from(file.path()).is_err());
    }
}
