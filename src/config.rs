//! Runtime configuration from the environment (`.env` is loaded by `main`).

use crate::auth::{account_store::DEV_ADMIN_PASSWORD, token::DEFAULT_TTL_SECS};
use anyhow::{bail, Context, Result};
use std::net::{IpAddr, SocketAddr};

/// Development-only signing secret, used when JWT_SECRET is unset
pub const DEV_JWT_SECRET: &str = "croxy-exim-dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub admin_password: String,
    /// Allowed CORS origin; permissive CORS when unset
    pub frontend_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr: IpAddr = get("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()
            .context("BIND_ADDR is not a valid IP address")?;

        let port: u16 = match get("PORT") {
            Some(v) => v.parse().with_context(|| format!("PORT is not a valid port: {}", v))?,
            None => 3001,
        };

        let token_ttl_secs: i64 = match get("TOKEN_TTL_SECS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("TOKEN_TTL_SECS is not an integer: {}", v))?,
            None => DEFAULT_TTL_SECS,
        };
        if token_ttl_secs <= 0 {
            bail!("TOKEN_TTL_SECS must be positive, got {}", token_ttl_secs);
        }

        Ok(Self {
            bind_addr,
            port,
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "croxy_exim.db".to_string()),
            jwt_secret: get("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            token_ttl_secs,
            admin_password: get("ADMIN_PASSWORD").unwrap_or_else(|| DEV_ADMIN_PASSWORD.to_string()),
            frontend_url: get("FRONTEND_URL"),
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
