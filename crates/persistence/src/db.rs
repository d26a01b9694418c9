//! PostgreSQL pool construction.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Pool settings, already resolved from the application configuration.
/// Timeouts arrive as [`Duration`]s so callers decide the unit once.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl PoolSettings {
    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
    }

    /// Open a pool against the configured database. The first connection is
    /// established eagerly, so a bad URL fails at startup rather than on the
    /// first request.
    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        self.options().connect(&self.url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_carry_settings() {
        let settings = PoolSettings {
            url: "postgres://localhost/fh".into(),
            max_connections: 7,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(90),
        };

        let options = settings.options();
        assert_eq!(options.get_max_connections(), 7);
        assert_eq!(options.get_min_connections(), 2);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(3));
    }
}
