//! Process configuration from environment variables (a `.env` file is honored).

use crate::error::ConfigError;
use crate::rules::Defaults;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Volatile in-process store; data is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    /// PostgreSQL schema holding the entity tables.
    pub schema: String,
    pub max_connections: u32,
    pub bind_addr: String,
    pub backend: StoreBackend,
    pub enrich_concurrency: usize,
    pub body_limit_bytes: usize,
    pub defaults: Defaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: "postgres://localhost/tutor".into(),
            schema: "tutor".into(),
            max_connections: 5,
            bind_addr: "0.0.0.0:3000".into(),
            backend: StoreBackend::Postgres,
            enrich_concurrency: 8,
            body_limit_bytes: 1024 * 1024,
            defaults: Defaults::default(),
        }
    }
}

fn parsed<T: FromStr>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let d = AppConfig::default();
        let backend = match get("STORE_BACKEND") {
            Some(s) => s.parse()?,
            None => d.backend,
        };
        Ok(AppConfig {
            database_url: get("DATABASE_URL").unwrap_or(d.database_url),
            schema: get("TUTOR_SCHEMA").unwrap_or(d.schema),
            max_connections: parsed("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), d.max_connections)?,
            bind_addr: get("BIND_ADDR").unwrap_or(d.bind_addr),
            backend,
            enrich_concurrency: parsed("ENRICH_CONCURRENCY", get("ENRICH_CONCURRENCY"), d.enrich_concurrency)?,
            body_limit_bytes: parsed("BODY_LIMIT_BYTES", get("BODY_LIMIT_BYTES"), d.body_limit_bytes)?,
            defaults: Defaults {
                student_icon: get("DEFAULT_STUDENT_ICON").unwrap_or(d.defaults.student_icon),
                teacher_icon: get("DEFAULT_TEACHER_ICON").unwrap_or(d.defaults.teacher_icon),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn unset_keys_use_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.schema, "tutor");
        assert_eq!(cfg.backend, StoreBackend::Postgres);
        assert_eq!(cfg.enrich_concurrency, 8);
        assert_eq!(cfg.defaults.student_icon, "default_boy.png");
    }

    #[test]
    fn values_are_read_and_parsed() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("ENRICH_CONCURRENCY", "2"),
            ("DEFAULT_TEACHER_ICON", "t.png"),
        ]))
        .unwrap();
        assert_eq!(cfg.backend, StoreBackend::Memory);
        assert_eq!(cfg.enrich_concurrency, 2);
        assert_eq!(cfg.defaults.teacher_icon, "t.png");
    }

    #[test]
    fn bad_number_is_reported_with_its_variable() {
        let err = AppConfig::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "DB_MAX_CONNECTIONS", .. }));
        assert!(AppConfig::from_lookup(lookup(&[("STORE_BACKEND", "redis")])).is_err());
    }
}
