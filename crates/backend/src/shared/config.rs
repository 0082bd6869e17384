use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub midtrans: MidtransConfig,
    pub frontend: FrontendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MidtransConfig {
    #[serde(default)]
    pub server_key: String,
    #[serde(default)]
    pub client_key: String,
    #[serde(default)]
    pub is_production: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FrontendConfig {
    /// Base URL the gateway redirects to after checkout
    pub url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// When absent a secret is generated once and kept in sys_settings
    pub jwt_secret: Option<String>,
    /// Seeded as super admin on first start
    pub super_admin_email: Option<String>,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[database]
path = "target/db/anak_hebat.db"

[midtrans]
server_key = ""
client_key = ""
is_production = false

[frontend]
url = "http://localhost:5173"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Environment variables are applied on top in both cases.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = read_config_file()?;
    config.apply_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

fn read_config_file() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

impl Config {
    /// MIDTRANS_SERVER_KEY, MIDTRANS_CLIENT_KEY, MIDTRANS_IS_PRODUCTION,
    /// FRONTEND_URL, JWT_SECRET, SUPER_ADMIN_EMAIL
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("MIDTRANS_SERVER_KEY") {
            self.midtrans.server_key = v;
        }
        if let Some(v) = lookup("MIDTRANS_CLIENT_KEY") {
            self.midtrans.client_key = v;
        }
        if let Some(v) = lookup("MIDTRANS_IS_PRODUCTION") {
            self.midtrans.is_production = v == "true";
        }
        if let Some(v) = lookup("FRONTEND_URL").filter(|v| !v.trim().is_empty()) {
            self.frontend.url = v;
        }
        if let Some(v) = lookup("JWT_SECRET").filter(|v| !v.trim().is_empty()) {
            self.auth.jwt_secret = Some(v);
        }
        if let Some(v) = lookup("SUPER_ADMIN_EMAIL").filter(|v| !v.trim().is_empty()) {
            self.auth.super_admin_email = Some(v);
        }
    }
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
pub fn default_config() -> Config {
    toml::from_str(DEFAULT_CONFIG).expect("embedded config is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_loads() {
        let config = default_config();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "target/db/anak_hebat.db");
        assert_eq!(config.frontend.url, "http://localhost:5173");
        assert!(!config.midtrans.is_production);
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MIDTRANS_SERVER_KEY", "SB-Mid-server-xyz"),
            ("MIDTRANS_IS_PRODUCTION", "true"),
            ("FRONTEND_URL", "https://anakhebat.id"),
        ]
        .into_iter()
        .collect();

        let mut config = default_config();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.midtrans.server_key, "SB-Mid-server-xyz");
        assert!(config.midtrans.is_production);
        assert_eq!(config.frontend.url, "https://anakhebat.id");
        assert_eq!(config.midtrans.client_key, "");
    }

    #[test]
    fn test_production_flag_requires_literal_true() {
        let mut config = default_config();
        config.apply_overrides(|k| (k == "MIDTRANS_IS_PRODUCTION").then(|| "1".to_string()));
        assert!(!config.midtrans.is_production);
    }
}
