//! Service configuration from the environment (optionally seeded from `.env`).

use crate::error::ConfigError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/students";
pub const DEFAULT_LISTEN_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
    /// Run `ensure_database_exists` before connecting the pool.
    pub create_database: bool,
}

impl ServiceConfig {
    /// Read `DATABASE_URL`, `LISTEN_ADDR`, `DB_MAX_CONNECTIONS`, `BODY_LIMIT_BYTES`, `CREATE_DATABASE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| match dotenvy::var(name) {
            Ok(v) => Ok(Some(v)),
            Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(None),
            Err(source) => Err(ConfigError::Env { name, source }),
        })
    }

    /// Build from an arbitrary lookup; `None` means unset and falls back to the default.
    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&'static str) -> Result<Option<String>, ConfigError>,
    {
        let database_url = lookup("DATABASE_URL")?
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let listen_addr = parse_or("LISTEN_ADDR", lookup("LISTEN_ADDR")?, || DEFAULT_LISTEN_ADDR)?;
        let max_connections = parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS")?, || {
            DEFAULT_MAX_CONNECTIONS
        })?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: "0".into(),
            });
        }
        let body_limit_bytes = parse_or("BODY_LIMIT_BYTES", lookup("BODY_LIMIT_BYTES")?, || {
            DEFAULT_BODY_LIMIT_BYTES
        })?;
        let create_database = match lookup("CREATE_DATABASE")? {
            None => true,
            Some(v) => parse_bool("CREATE_DATABASE", &v)?,
        };
        Ok(ServiceConfig {
            database_url,
            listen_addr,
            max_connections,
            body_limit_bytes,
            create_database,
        })
    }
}

fn parse_or<T, D>(name: &'static str, raw: Option<String>, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    D: FnOnce() -> T,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default()),
        Some(s) => s.parse().map_err(|_| ConfigError::Invalid {
            name,
            value: s.to_string(),
        }),
    }
}

fn parse_bool(name: &'static str, s: &str) -> Result<bool, ConfigError> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: s.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&'static str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let map: HashMap<&str, String> = vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        ServiceConfig::from_lookup(|name| Ok(map.get(name).cloned()))
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = from_map(&[]).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(cfg.listen_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(cfg.body_limit_bytes, DEFAULT_BODY_LIMIT_BYTES);
        assert!(cfg.create_database);
    }

    #[test]
    fn reads_overrides() {
        let cfg = from_map(&[
            ("DATABASE_URL", "postgres://db:5432/uni"),
            ("LISTEN_ADDR", "127.0.0.1:3000"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("BODY_LIMIT_BYTES", "1024"),
            ("CREATE_DATABASE", "off"),
        ])
        .unwrap();
        assert_eq!(cfg.database_url, "postgres://db:5432/uni");
        assert_eq!(cfg.listen_addr.port(), 3000);
        assert_eq!(cfg.max_connections, 12);
        assert_eq!(cfg.body_limit_bytes, 1024);
        assert!(!cfg.create_database);
    }

    #[test]
    fn rejects_garbage() {
        let err = from_map(&[("DB_MAX_CONNECTIONS", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DB_MAX_CONNECTIONS", .. }));
        let err = from_map(&[("DB_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DB_MAX_CONNECTIONS", .. }));
        let err = from_map(&[("CREATE_DATABASE", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CREATE_DATABASE", .. }));
        let err = from_map(&[("LISTEN_ADDR", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "LISTEN_ADDR", .. }));
    }
}
