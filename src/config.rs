use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub concurrency_limit: usize,
    pub body_limit_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_parse("APP_PORT").unwrap_or(3000);
        let concurrency_limit = env_parse("APP_CONCURRENCY_LIMIT").unwrap_or(100);
        let body_limit_bytes = env_parse("APP_BODY_LIMIT_BYTES").unwrap_or(1024 * 1024);
        Ok(Self {
            port,
            database_url,
            host,
            concurrency_limit,
            body_limit_bytes,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
