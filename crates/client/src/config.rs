use shared_types::AppConfig;
use std::path::Path;

/// Path to the config file, relative to the working directory.
pub const CONFIG_PATH: &str = "config.toml";

pub const ENV_BASE_URL: &str = "SCHOOL_API_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "SCHOOL_API_TIMEOUT_SECS";
pub const ENV_REALTIME_PATH: &str = "SCHOOL_REALTIME_PATH";

/// Load `config.toml` from the working directory and apply environment
/// overrides (a `.env` file is read first when present).
pub fn load_config() -> AppConfig {
    let _ = dotenvy::dotenv();
    let mut config = load_config_from(Path::new(CONFIG_PATH));
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Read and parse a config file. A missing or unparseable file yields the
/// defaults.
pub fn load_config_from(path: &Path) -> AppConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents).unwrap_or_else(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to parse config, using defaults"
            );
            AppConfig::default()
        }),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Config file not found, using defaults"
            );
            AppConfig::default()
        }
    }
}

pub fn parse_config(contents: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Overlay values from the environment. `lookup` is `std::env::var` in
/// production; tests pass a map.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.api.base_url = base_url.trim().trim_end_matches('/').to_string();
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => config.api.timeout_secs = secs,
            _ => tracing::warn!(value = %raw, "Ignoring invalid {ENV_TIMEOUT_SECS}"),
        }
    }
    if let Some(path) = lookup(ENV_REALTIME_PATH).filter(|v| !v.trim().is_empty()) {
        config.realtime.path = path.trim().to_string();
    }
}
