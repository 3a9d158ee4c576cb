use axum::http::HeaderValue;
use std::env;
use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// HTTP-side settings read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Allowed cross-origin callers. Empty disables the CORS layer.
    pub cors_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr = env::var("FYYUR_BIND_ADDR").unwrap_or_default();
        let cors_origins = env::var("CORS_ORIGINS").unwrap_or_default();
        Self {
            bind_addr: parse_bind_addr(&bind_addr),
            cors_origins: parse_origins(&cors_origins),
        }
    }
}

fn parse_bind_addr(raw: &str) -> SocketAddr {
    match raw.trim().parse() {
        Ok(addr) => addr,
        Err(_) => {
            if !raw.trim().is_empty() {
                tracing::warn!(
                    value = raw,
                    "invalid FYYUR_BIND_ADDR, using {DEFAULT_BIND_ADDR}"
                );
            }
            SocketAddr::from(([0, 0, 0, 0], 8080))
        }
    }
}

fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect()
}
