use crate::config::{get_config, Config};
use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub async fn create_pool() -> Result<PgPool> {
    let config = get_config();
    let pool = pool_options(config).connect(&config.database_url).await?;
    Ok(pool)
}

/// Pool sizing comes from configuration so deployments can tune it without a
/// rebuild; the defaults suit this service's small request volume.
fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_connections: u32, acquire_timeout_secs: u64) -> Config {
        Config {
            server_address: "127.0.0.1:0".to_string(),
            database_url: "postgres://localhost/test".to_string(),
            database_max_connections: max_connections,
            database_acquire_timeout_secs: acquire_timeout_secs,
            jwt_secret: "secret".to_string(),
            jwt_expires_hours: 1,
            cors_origin: None,
        }
    }

    #[test]
    fn pool_options_follow_config() {
        let options = pool_options(&config(8, 3));
        assert_eq!(options.get_max_connections(), 8);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(3));
    }
}
