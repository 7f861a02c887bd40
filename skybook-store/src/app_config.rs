use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub simulation: SimulationConfig,
    pub catalog: CatalogConfig,
    pub flows: FlowConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    File,
    Redis,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    /// Name of the single slot holding the signed-in user
    pub key: String,
    #[serde(default = "default_session_dir")]
    pub dir: String,
    pub redis_url: Option<String>,
    pub ttl_seconds: Option<u64>,
}

fn default_session_dir() -> String {
    ".skybook".to_string()
}

/// Artificial latency for the stubbed remote calls
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    pub login_delay_ms: u64,
    pub signup_delay_ms: u64,
    pub search_delay_ms: u64,
    pub booking_delay_ms: u64,
}

impl SimulationConfig {
    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    pub fn signup_delay(&self) -> Duration {
        Duration::from_millis(self.signup_delay_ms)
    }

    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    pub fn booking_delay(&self) -> Duration {
        Duration::from_millis(self.booking_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Entries shown when a search matches nothing; 0 shows an empty page.
    pub fallback_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FlowConfig {
    pub max_idle_minutes: i64,
    pub cleanup_interval_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Layered load: `<dir>/default`, `<dir>/<RUN_MODE>`, `<dir>/local`,
    /// then `SKYBOOK__SECTION__KEY` environment overrides.
    pub fn load_from(dir: &str) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&format!("{}/default", dir)))
            .add_source(config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // not checked in
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            .add_source(config::Environment::with_prefix("SKYBOOK").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.flows.validate()?;
        Ok(config)
    }
}

impl FlowConfig {
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.cleanup_interval_seconds == 0 {
            return Err(config::ConfigError::Message(
                "flows.cleanup_interval_seconds must be at least 1".to_string(),
            ));
        }
        if self.max_idle_minutes <= 0 {
            return Err(config::ConfigError::Message(format!(
                "flows.max_idle_minutes must be positive, got {}",
                self.max_idle_minutes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_TOML: &str = r#"
[server]
port = 8080

[session]
backend = "file"
key = "flight_booking_user"

[simulation]
login_delay_ms = 1000
signup_delay_ms = 1000
search_delay_ms = 1000
booking_delay_ms = 2000

[catalog]
fallback_size = 2

[flows]
max_idle_minutes = 30
cleanup_interval_seconds = 60
"#;

    #[test]
    fn test_load_from_directory() {
        let dir = env::temp_dir().join(format!("skybook-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("default.toml"), DEFAULT_TOML).unwrap();
        std::fs::write(dir.join("local.toml"), "[server]\nport = 9090\n").unwrap();

        let config = Config::load_from(dir.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.session.backend, SessionBackend::File);
        assert_eq!(config.session.dir, ".skybook");
        assert_eq!(config.simulation.booking_delay(), Duration::from_secs(2));
        assert_eq!(config.catalog.fallback_size, 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    fn load_with_local(local: &str) -> Result<Config, config::ConfigError> {
        let dir = env::temp_dir().join(format!("skybook-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("default.toml"), DEFAULT_TOML).unwrap();
        std::fs::write(dir.join("local.toml"), local).unwrap();

        let result = Config::load_from(dir.to_str().unwrap());
        std::fs::remove_dir_all(&dir).unwrap();
        result
    }

    #[test]
    fn test_zero_cleanup_interval_rejected() {
        let err = load_with_local("[flows]\nmax_idle_minutes = 30\ncleanup_interval_seconds = 0\n").unwrap_err();
        assert!(err.to_string().contains("cleanup_interval_seconds"));
    }

    #[test]
    fn test_negative_idle_limit_rejected() {
        let err = load_with_local("[flows]\nmax_idle_minutes = -5\ncleanup_interval_seconds = 60\n").unwrap_err();
        assert!(err.to_string().contains("max_idle_minutes"));
    }

    #[test]
    fn test_missing_default_file_fails() {
        let dir = env::temp_dir().join(format!("skybook-missing-{}", uuid::Uuid::new_v4()));
        assert!(Config::load_from(dir.to_str().unwrap()).is_err());
    }
}
