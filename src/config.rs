use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Which `ListingBackend` implementation the server talks to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Supabase,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Base URL of the hosted service, without trailing slash
    pub url: String,
    pub anon_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed to call the API. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let kind = match env::var("LISTING_BACKEND").as_deref() {
            Ok("memory") => BackendKind::Memory,
            Ok("supabase") | Err(_) => BackendKind::Supabase,
            Ok(other) => anyhow::bail!("Unknown LISTING_BACKEND: {}", other),
        };

        let url = env::var("SUPABASE_URL").unwrap_or_else(|_| {
            warn!("SUPABASE_URL not set, using local default");
            "http://localhost:54321".to_string()
        });

        let anon_key = env::var("SUPABASE_ANON_KEY").unwrap_or_else(|_| {
            if kind == BackendKind::Supabase {
                warn!("SUPABASE_ANON_KEY not set, requests will be anonymous");
            }
            String::new()
        });

        Ok(Self {
            backend: BackendConfig {
                kind,
                url: url.trim_end_matches('/').to_string(),
                anon_key,
                timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 30),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_or("SERVER_PORT", 3000),
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|raw| split_origins(&raw))
                    .unwrap_or_default(),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Comma-separated origin list, trailing slashes dropped
fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid {} value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
