use std::{env, path::PathBuf};

use super::schema::{BpmPolicy, DurationPolicy, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `TRACKDECK__`),
/// then an optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TRACKDECK")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let has_extension = self
            .library
            .extensions
            .iter()
            .any(|e| !e.trim().trim_start_matches('.').is_empty());
        if !has_extension {
            return Err("library.extensions must name at least one extension".to_string());
        }
        if self.analysis.tempo_window_secs == 0 {
            return Err("analysis.tempo_window_secs must be >= 1".to_string());
        }
        if self.analysis.key_window_secs == 0 {
            return Err("analysis.key_window_secs must be >= 1".to_string());
        }
        if let BpmPolicy::Fixed(0) = self.analysis.bpm {
            return Err("analysis.bpm fixed value must be >= 1".to_string());
        }
        if let DurationPolicy::Fallback(0) = self.analysis.duration {
            return Err("analysis.duration fallback must be >= 1 second".to_string());
        }
        if self.output.filename.trim().is_empty() {
            return Err("output.filename must not be empty".to_string());
        }
        Ok(())
    }
}

/// Load settings, falling back to defaults when the config is absent or invalid.
///
/// Config is optional; failures should not prevent a run from starting.
pub fn load_settings() -> Settings {
    match Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("trackdeck: invalid config, using defaults: {msg}");
                Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            eprintln!("trackdeck: failed to load config, using defaults: {e}");
            Settings::default()
        }
    }
}

/// Resolve the config path from `TRACKDECK_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TRACKDECK_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/trackdeck/config.toml`
/// or `~/.config/trackdeck/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("trackdeck").join("config.toml"))
}
