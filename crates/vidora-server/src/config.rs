use std::path::PathBuf;

use anyhow::{Context, bail};

use vidora_core::CoreConfig;
use vidora_db::DEFAULT_READER_POOL_SIZE;

const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub reader_pool_size: usize,
    pub core: CoreConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup so parsing can be tested without touching
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("VIDORA_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("VIDORA_JWT_SECRET is unset or still a placeholder");
        }

        let defaults = CoreConfig::default();
        let core = CoreConfig {
            allow_self_subscription: parse_or(
                &lookup,
                "VIDORA_ALLOW_SELF_SUBSCRIBE",
                defaults.allow_self_subscription,
            )?,
            default_page_limit: parse_or(
                &lookup,
                "VIDORA_DEFAULT_PAGE_LIMIT",
                defaults.default_page_limit,
            )?,
            max_page_limit: parse_or(&lookup, "VIDORA_MAX_PAGE_LIMIT", defaults.max_page_limit)?,
        };
        if core.default_page_limit == 0 || core.default_page_limit > core.max_page_limit {
            bail!(
                "VIDORA_DEFAULT_PAGE_LIMIT must be between 1 and VIDORA_MAX_PAGE_LIMIT ({})",
                core.max_page_limit
            );
        }

        Ok(Self {
            host: lookup("VIDORA_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "VIDORA_PORT", 3000)?,
            db_path: lookup("VIDORA_DB_PATH")
                .unwrap_or_else(|| "vidora.db".into())
                .into(),
            jwt_secret,
            reader_pool_size: parse_or(
                &lookup,
                "VIDORA_READER_POOL_SIZE",
                DEFAULT_READER_POOL_SIZE,
            )?,
            core,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::from_lookup(lookup_from(&[("VIDORA_JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("vidora.db"));
        assert_eq!(config.reader_pool_size, DEFAULT_READER_POOL_SIZE);
        assert!(!config.core.allow_self_subscription);
        assert_eq!(config.core.default_page_limit, 10);
        assert_eq!(config.core.max_page_limit, 100);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("VIDORA_JWT_SECRET", "s3cret"),
            ("VIDORA_PORT", "8080"),
            ("VIDORA_ALLOW_SELF_SUBSCRIBE", "true"),
            ("VIDORA_DEFAULT_PAGE_LIMIT", "25"),
            ("VIDORA_READER_POOL_SIZE", "2"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.core.allow_self_subscription);
        assert_eq!(config.core.default_page_limit, 25);
        assert_eq!(config.reader_pool_size, 2);
    }

    #[test]
    fn test_rejects_placeholder_secret() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
        assert!(
            Config::from_lookup(lookup_from(&[("VIDORA_JWT_SECRET", "dev-secret-change-me")]))
                .is_err()
        );
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(
            Config::from_lookup(lookup_from(&[
                ("VIDORA_JWT_SECRET", "s3cret"),
                ("VIDORA_PORT", "eighty"),
            ]))
            .is_err()
        );
        assert!(
            Config::from_lookup(lookup_from(&[
                ("VIDORA_JWT_SECRET", "s3cret"),
                ("VIDORA_DEFAULT_PAGE_LIMIT", "500"),
            ]))
            .is_err()
        );
    }
}
