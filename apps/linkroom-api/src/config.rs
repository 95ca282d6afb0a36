/// Service configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string, or `memory:` for an in-process store.
    pub database_url: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Lifetime of a login session in seconds.
    pub session_ttl_secs: u64,
    /// Allowed CORS origin. Any origin when unset.
    pub cors_origin: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: usize,
}

pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 3600;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_var("DATABASE_URL"),
            port: parsed_var("PORT").unwrap_or(3000),
            session_ttl_secs: parsed_var("SESSION_TTL_SECS").unwrap_or(DEFAULT_SESSION_TTL_SECS),
            cors_origin: std::env::var("CORS_ORIGIN").ok().filter(|s| !s.is_empty()),
            db_max_connections: parsed_var("DB_MAX_CONNECTIONS").unwrap_or(10),
        }
    }

    /// In-memory configuration for tests and local experiments.
    pub fn in_memory() -> Self {
        Self {
            database_url: "memory:".to_string(),
            port: 0,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            cors_origin: None,
            db_max_connections: 1,
        }
    }
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
