use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const ENV_PREFIX: &str = "APERTURE_";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub cms: CmsSettings,
    pub session: SessionSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CmsSettings {
    pub url: String,
    pub api_token: Option<String>,
    // 开发环境 10 秒，生产环境 1 小时
    pub revalidate_secs: u64,
    pub cache_capacity: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SessionSettings {
    pub secure_cookie: bool,
}

impl CmsSettings {
    pub fn to_config(&self) -> cms::CmsConfig {
        cms::CmsConfig {
            url: self.url.clone(),
            api_token: self.api_token.clone(),
            revalidate: Duration::from_secs(self.revalidate_secs),
            cache_capacity: self.cache_capacity,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::load(&run_mode, collect_env_vars())
    }

    pub fn load(run_mode: &str, env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let production = run_mode == "production";

        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("cms.url", "http://localhost:1337")?
            .set_default("cms.revalidate_secs", if production { 3600 } else { 10 })?
            .set_default("cms.cache_capacity", cms::DEFAULT_CAPACITY as i64)?
            .set_default("session.secure_cookie", production)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false));

        for (key, value) in env_map {
            builder = builder.set_override(key, value)?;
        }

        builder.build()?.try_deserialize()
    }
}

/// `APERTURE_CMS__API_TOKEN=x` → `cms.api_token = x`
fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_defaults() {
        let s = Settings::load("development", HashMap::new()).unwrap();
        assert_eq!(s.server.port, 3000);
        assert_eq!(s.cms.revalidate_secs, 10);
        assert!(!s.session.secure_cookie);
        assert!(s.cms.api_token.is_none());
        assert_eq!(s.cms.cache_capacity, cms::DEFAULT_CAPACITY);
    }

    #[test]
    fn test_production_and_overrides() {
        let env = HashMap::from([
            ("cms.url".to_string(), "https://cms.example.org".to_string()),
            ("cms.api_token".to_string(), "secret".to_string()),
            ("server.port".to_string(), "8080".to_string()),
        ]);
        let s = Settings::load("production", env).unwrap();
        assert_eq!(s.cms.revalidate_secs, 3600);
        assert!(s.session.secure_cookie);
        assert_eq!(s.server.port, 8080);
        assert_eq!(s.cms.api_token.as_deref(), Some("secret"));

        let cfg = s.cms.to_config();
        assert_eq!(cfg.revalidate, Duration::from_secs(3600));
        assert_eq!(cfg.url, "https://cms.example.org");
    }
}
