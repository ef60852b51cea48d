use anyhow::Result;
use dotenvy::dotenv;
use std::env;

/// Browser identity presented to the portal. The portal blocks clients that
/// do not look like a browser.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub portal: PortalConfig,
    pub session: SessionConfig,
    pub service_name: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct PortalConfig {
    /// Base URL of the examination portal, without a trailing slash.
    pub base_url: String,
    pub user_agent: String,
    /// Per-call timeout for every upstream request.
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Lifetime of a cached portal session.
    pub ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("IPU_BRIDGE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("IPU_BRIDGE_PORT")
            .unwrap_or_else(|_| "3007".to_string())
            .parse()?;

        let base_url = env::var("IPU_PORTAL_BASE_URL")
            .unwrap_or_else(|_| "https://examweb.ggsipu.ac.in/web".to_string());
        let user_agent =
            env::var("IPU_PORTAL_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        let request_timeout_secs = env::var("IPU_PORTAL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()?;

        let ttl_minutes = env::var("IPU_SESSION_TTL_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?;

        Ok(Self {
            server: ServerConfig { host, port },
            portal: PortalConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                user_agent,
                request_timeout_secs,
            },
            session: SessionConfig { ttl_minutes },
            service_name: "ipu-bridge".to_string(),
        })
    }
}
