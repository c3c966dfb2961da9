use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;
use url::Url;

/// Signing secret used when none is configured. Only suitable for local development.
pub const DEV_JWT_SECRET: &str = "dev-secret-please-change";

/// Storage keys inside the client-local store.
pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const HISTORY_KEY: &str = "search_history";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub loglevel: String,
    pub listen_addr: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Base URL of the geolens API as seen by the client (must end with `/`).
    pub api_url: Url,
    /// Base URL of the geolocation provider (must end with `/`).
    pub geo_base_url: Url,
    /// Directory holding the client-local storage file.
    pub data_dir: PathBuf,
    pub proxy: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            listen_addr: "0.0.0.0".to_string(),
            port: 8000,
            database_url: "sqlite:data.sqlite".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: 8,
            api_url: Url::parse("http://localhost:8000/api/").expect("static url"),
            geo_base_url: Url::parse("https://ipinfo.io/").expect("static url"),
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("geolens"),
            proxy: None,
        }
    }
}

impl Config {
    /// Layer defaults, `GEOLENS_*` variables and a bare `PORT` override.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("GEOLENS_"))
            .merge(Env::raw().only(&["port"]))
            .extract()
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("FATAL: invalid geolens configuration"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.token_ttl_hours, 8);
        assert!(cfg.uses_dev_secret());
        assert_eq!(cfg.geo_base_url.as_str(), "https://ipinfo.io/");
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn environment_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GEOLENS_JWT_SECRET", "from-env");
            jail.set_env("PORT", "9100");
            let cfg = Config::load()?;
            assert_eq!(cfg.jwt_secret, "from-env");
            assert_eq!(cfg.port, 9100);
            assert!(!cfg.uses_dev_secret());
            Ok(())
        });
    }
}
