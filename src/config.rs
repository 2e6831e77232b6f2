use std::env;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    pub max_connections: u32,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `load` reads the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: try_load(&lookup, "ATTENDANCE_HOST", "127.0.0.1")?,
            port: try_load(&lookup, "PORT", "3000")?,
            database_path: try_load(&lookup, "ATTENDANCE_DB", "attendance.db")?,
            max_connections: try_load(&lookup, "ATTENDANCE_DB_MAX_CONNECTIONS", "5")?,
        })
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| {
        log::info!("{} not set, using default: {}", key, default);
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("Invalid {} value `{}`", key, raw))
}
