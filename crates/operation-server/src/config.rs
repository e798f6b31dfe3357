use anyhow::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_address: SocketAddr,

    /// Path to RocksDB database
    pub database_path: PathBuf,

    /// Base URL of the remote forms service; the forms proxy is disabled
    /// when unset
    pub forms_url: Option<Url>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bind_address = std::env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()?;

        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "./data/operations.db".to_string())
            .into();

        let forms_url = match std::env::var("FORMS_URL") {
            Ok(raw) => Some(Url::parse(&raw)?),
            Err(_) => None,
        };

        Ok(Config {
            bind_address,
            database_path,
            forms_url,
        })
    }
}
