/// Configuration for the Postgres audit store.
pub struct PostgresAuditConfig {
    /// Postgres connection URL.
    pub url: String,
    /// Table name prefix (e.g. `"amg_"`).
    pub prefix: String,
    /// Background cleanup interval in seconds. Unused for now: audit records
    /// are append-only and have no TTL, but the field is kept for parity
    /// with `amg-storage-postgres`'s config shape.
    pub cleanup_interval_seconds: u64,
    /// SSL mode (`disable`, `prefer`, `require`, `verify-ca`, `verify-full`).
    pub ssl_mode: Option<String>,
}

impl PostgresAuditConfig {
    /// Create a new configuration with the given URL and defaults.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prefix: "amg_".to_owned(),
            cleanup_interval_seconds: 3600,
            ssl_mode: None,
        }
    }

    /// Set the table prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the cleanup interval in seconds.
    #[must_use]
    pub fn with_cleanup_interval(mut self, seconds: u64) -> Self {
        self.cleanup_interval_seconds = seconds;
        self
    }

    /// Set the SSL mode.
    #[must_use]
    pub fn with_ssl_mode(mut self, mode: impl Into<String>) -> Self {
        self.ssl_mode = Some(mode.into());
        self
    }
}
