//! Server configuration from the environment

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use axum::http::HeaderValue;
use platform::kv::StoreConfig;
use redemption::RedemptionConfig;

#[derive(Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<HeaderValue>,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub redemption: RedemptionConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = parse(&var, "BIND_ADDR")?.unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000)));

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173,http://127.0.0.1:5173".to_string())
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        let mut store = StoreConfig::default();
        if let Some(url) = var("REDIS_URL") {
            store.url = url;
        }
        if let Some(ms) = parse::<u64>(&var, "STORE_TIMEOUT_MS")? {
            store.timeout = Duration::from_millis(ms);
        }
        if let Some(size) = parse(&var, "STORE_POOL_SIZE")? {
            store.pool_size = size;
        }

        let mut auth = if cfg!(debug_assertions) {
            AuthConfig::development()
        } else {
            AuthConfig::default()
        };
        if let Some(secs) = parse::<u64>(&var, "SESSION_TTL_SECS")? {
            auth = auth.with_session_ttl(Duration::from_secs(secs));
        }

        let mut redemption = match var("TOKEN_SECRET") {
            Some(encoded) => RedemptionConfig::default().with_token_secret(decode_secret(&encoded)?),
            None if cfg!(debug_assertions) => {
                tracing::warn!("TOKEN_SECRET not set; using a random secret, tokens will not survive a restart");
                RedemptionConfig::development()
            }
            None => bail!("TOKEN_SECRET must be set in production"),
        };
        if let Some(secs) = parse::<u64>(&var, "BENEFICIARY_TTL_SECS")? {
            redemption = redemption.with_beneficiary_ttl(Duration::from_secs(secs));
        }
        if let Some(url) = var("PUBLIC_BASE_URL").filter(|url| !url.trim().is_empty()) {
            redemption = redemption.with_public_base_url(url);
        }

        Ok(Self {
            bind_addr,
            frontend_origins,
            store,
            auth,
            redemption,
        })
    }
}

fn parse<T>(var: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(name)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("{name} is invalid")))
        .transpose()
}

fn decode_secret(encoded: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = platform::crypto::from_base64(encoded.trim()).context("TOKEN_SECRET is not base64")?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| anyhow::anyhow!("TOKEN_SECRET must decode to 32 bytes, got {}", bytes.len()))
}
