use std::collections::HashMap;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Meeting provider limits.
    pub meetings: MeetingsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `MEETINGS_MAX_PARTICIPANTS` | unset                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();
        let meetings = MeetingsConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            meetings,
        }
    }
}

/// Per-provider meeting limits used by event capacity validation.
#[derive(Debug, Clone, Default)]
pub struct MeetingsConfig {
    /// Maximum participants keyed by meeting provider id (e.g. `zoom`).
    pub max_participants: HashMap<String, i32>,
}

impl MeetingsConfig {
    /// Load from `MEETINGS_MAX_PARTICIPANTS` (`provider=max` pairs, comma-separated).
    ///
    /// # Panics
    ///
    /// Panics if the variable is set but malformed.
    pub fn from_env() -> Self {
        match std::env::var("MEETINGS_MAX_PARTICIPANTS") {
            Ok(raw) => Self::parse(&raw)
                .unwrap_or_else(|e| panic!("Invalid MEETINGS_MAX_PARTICIPANTS: {e}")),
            Err(_) => Self::default(),
        }
    }

    /// Parse `zoom=300,other=100` into a provider limit map.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut max_participants = HashMap::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (provider, max) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected provider=max, got '{pair}'"))?;
            let provider = provider.trim();
            if provider.is_empty() {
                return Err(format!("missing provider in '{pair}'"));
            }
            let max: i32 = max
                .trim()
                .parse()
                .map_err(|_| format!("invalid maximum in '{pair}'"))?;
            if max <= 0 {
                return Err(format!("maximum must be positive in '{pair}'"));
            }
            max_participants.insert(provider.to_string(), max);
        }
        Ok(Self { max_participants })
    }
}
