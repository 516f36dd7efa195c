use std::str::FromStr;

use vitals_ingest::client::MqttConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for a single gateway device. Override
/// via environment variables (or a `.env` file).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Reading Store location (default: `sqlite://health_data.db`).
    pub database_url: String,
    /// Reading Store pool size (default: `5`).
    pub db_max_connections: u32,
    /// Broker and topic for the ingestion listener.
    pub mqtt: MqttConfig,
}

/// A configuration variable held a value that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("{var} must be a valid {expected}, got '{value}'")]
pub struct ConfigError {
    pub var: &'static str,
    pub expected: &'static str,
    pub value: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                      |
    /// |------------------------|------------------------------|
    /// | `HOST`                 | `0.0.0.0`                    |
    /// | `PORT`                 | `5000`                       |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`      |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                         |
    /// | `DATABASE_URL`         | `sqlite://health_data.db`    |
    /// | `DB_MAX_CONNECTIONS`   | `5`                          |
    /// | `MQTT_BROKER`          | `localhost`                  |
    /// | `MQTT_PORT`            | `1883`                       |
    /// | `MQTT_TOPIC`           | `health/data`                |
    /// | `MQTT_CLIENT_ID`       | `vitals-ingest-<uuid>`       |
    /// | `MQTT_KEEP_ALIVE_SECS` | `60`                         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let cors_origins: Vec<String> = string("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let mqtt = MqttConfig {
            broker: string("MQTT_BROKER", "localhost"),
            port: parse(&lookup, "MQTT_PORT", 1883, "u16")?,
            topic: string("MQTT_TOPIC", "health/data"),
            client_id: lookup("MQTT_CLIENT_ID")
                .unwrap_or_else(|| format!("vitals-ingest-{}", uuid::Uuid::new_v4())),
            keep_alive_secs: parse(&lookup, "MQTT_KEEP_ALIVE_SECS", 60, "u64")?,
        };

        Ok(Self {
            host: string("HOST", "0.0.0.0"),
            port: parse(&lookup, "PORT", 5000, "u16")?,
            cors_origins,
            request_timeout_secs: parse(&lookup, "REQUEST_TIMEOUT_SECS", 30, "u64")?,
            database_url: string("DATABASE_URL", "sqlite://health_data.db"),
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", 5, "u32")?,
            mqtt,
        })
    }
}

fn parse<F, T>(lookup: &F, var: &'static str, default: T, expected: &'static str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError {
            var,
            expected,
            value,
        }),
    }
}
