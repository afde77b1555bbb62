use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the platform HTTP API, e.g. `http://localhost:5555/api/v1`.
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventSettings {
    /// WebSocket endpoint of the realtime event channel.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory holding the persisted credential file and other
    /// client-local records.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub events: EventSettings,
    pub storage: StorageSettings,
}

impl Settings {
    /// Layered load: built-in defaults, then an optional `visapath.toml`,
    /// then `VISAPATH_`-prefixed environment variables
    /// (e.g. `VISAPATH_API__BASE_URL`).
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("api.base_url", "http://localhost:5555/api/v1")?
            .set_default("api.timeout_secs", 30i64)?
            .set_default("api.connect_timeout_secs", 5i64)?
            .set_default("events.url", "ws://localhost:5555/events")?
            .set_default("storage.dir", default_storage_dir())?
            .add_source(File::with_name("visapath").required(false))
            .add_source(Environment::with_prefix("VISAPATH").separator("__"))
            .build()?
            .try_deserialize()
    }
}

fn default_storage_dir() -> String {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home)
            .join(".visapath")
            .to_string_lossy()
            .into_owned(),
        Err(_) => ".visapath".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::load().expect("default settings load");
        assert_eq!(settings.api.base_url, "http://localhost:5555/api/v1");
        assert_eq!(settings.events.url, "ws://localhost:5555/events");
        assert_eq!(settings.api.timeout_secs, 30);
        assert!(settings.storage.dir.ends_with(".visapath"));
    }
}
