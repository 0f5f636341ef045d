// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use config::{Config as ConfigFile, File, Environment};

/// Central configuration for the web server and the reconciliation pipeline
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub web_server_addr: String,
    pub jwt_secret: String,  // HS256 secret used to sign login tokens

    pub database: DatabaseConfig,
    pub ledger: LedgerConfig,
    pub pinning: PinningConfig,
    pub exclusion: ExclusionConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file holding the users table. ":memory:" forces a single worker.
    pub path: String,
    pub workers: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the ledger node
    pub rpc_url: String,
    pub contract_address: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PinningConfig {
    pub api_url: String,
    pub gateway_url: String,
    /// Bearer credential for the pinning service. Probes fail closed without it.
    #[serde(default)]
    pub jwt: Option<String>,
    pub timeout_secs: u64,
    pub max_concurrent_probes: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExclusionConfig {
    /// Positions removed from the liveness-filtered list
    pub positions: Vec<usize>,
    /// Content identifiers dropped before probing
    #[serde(default)]
    pub content_ids: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub paths: Vec<String>,
    pub max_requests: usize,
    pub window_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:5000".to_string(),
            jwt_secret: "dev_secret".to_string(),

            database: DatabaseConfig {
                path: "./certificates.db".to_string(),
                workers: 2,
            },
            ledger: LedgerConfig {
                rpc_url: "http://127.0.0.1:8545".to_string(),
                contract_address: "0x0000000000000000000000000000000000000000".to_string(),
                timeout_secs: 15,
            },
            pinning: PinningConfig {
                api_url: "https://api.pinata.cloud".to_string(),
                gateway_url: "https://ipfs.io".to_string(),
                jwt: None,
                timeout_secs: 10,
                max_concurrent_probes: 8,
            },
            exclusion: ExclusionConfig {
                positions: vec![1, 2, 3, 4, 7],
                content_ids: Vec::new(),
            },
            rate_limit: RateLimitConfig {
                paths: vec!["/api/auth".to_string()],
                max_requests: 10,
                window_secs: 60,
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        let config = ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Environment variables with prefix "APP", e.g. APP__PINNING__JWT
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from files, falling back to plain environment variables
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            },
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");
                Self::from_plain_env()
            }
        }
    }

    fn from_plain_env() -> Self {
        let defaults = Self::default();

        let web_server_addr = env::var("WEB_SERVER_ADDR")
            .unwrap_or(defaults.web_server_addr);

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or(defaults.jwt_secret);

        let database_path = env::var("DATABASE_PATH")
            .unwrap_or(defaults.database.path);

        let database_workers = parse_var("DATABASE_WORKERS")
            .unwrap_or(defaults.database.workers);

        let rpc_url = env::var("LEDGER_RPC_URL")
            .unwrap_or(defaults.ledger.rpc_url);

        let contract_address = env::var("CONTRACT_ADDRESS")
            .unwrap_or(defaults.ledger.contract_address);

        let ledger_timeout = parse_var("LEDGER_TIMEOUT_SECS")
            .unwrap_or(defaults.ledger.timeout_secs);

        let api_url = env::var("PINATA_API_URL")
            .unwrap_or(defaults.pinning.api_url);

        let gateway_url = env::var("IPFS_GATEWAY_URL")
            .unwrap_or(defaults.pinning.gateway_url);

        let pinning_jwt = env::var("PINATA_JWT")
            .ok()
            .filter(|v| !v.is_empty());

        let pinning_timeout = parse_var("PINATA_TIMEOUT_SECS")
            .unwrap_or(defaults.pinning.timeout_secs);

        let max_concurrent_probes = parse_var("MAX_CONCURRENT_PROBES")
            .unwrap_or(defaults.pinning.max_concurrent_probes);

        // Comma separated, e.g. EXCLUDED_POSITIONS=1,2,3,4,7
        let positions = env::var("EXCLUDED_POSITIONS")
            .map(|v| split_list(&v).filter_map(|p| p.parse().ok()).collect())
            .unwrap_or(defaults.exclusion.positions);

        let content_ids = env::var("EXCLUDED_CONTENT_IDS")
            .map(|v| split_list(&v).map(str::to_string).collect())
            .unwrap_or(defaults.exclusion.content_ids);

        Self {
            web_server_addr,
            jwt_secret,
            database: DatabaseConfig {
                path: database_path,
                workers: database_workers,
            },
            ledger: LedgerConfig {
                rpc_url,
                contract_address,
                timeout_secs: ledger_timeout,
            },
            pinning: PinningConfig {
                api_url,
                gateway_url,
                jwt: pinning_jwt,
                timeout_secs: pinning_timeout,
                max_concurrent_probes,
            },
            exclusion: ExclusionConfig {
                positions,
                content_ids,
            },
            rate_limit: defaults.rate_limit,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse::<T>().ok())
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusion_matches_legacy_positions() {
        let config = Config::default();
        assert_eq!(config.exclusion.positions, vec![1, 2, 3, 4, 7]);
        assert!(config.exclusion.content_ids.is_empty());
        assert!(config.pinning.jwt.is_none());
    }

    #[test]
    fn test_split_list_skips_blanks() {
        let items: Vec<&str> = split_list(" 1, 2,,7 ").collect();
        assert_eq!(items, vec!["1", "2", "7"]);
    }
}
