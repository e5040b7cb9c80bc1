use crate::models::{Settings, DEFAULT_TARGET_REVENUE};
use std::{env, path::PathBuf, time::Duration};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BLOB_NAME: &str = "rev-tracker-data.json";
const TOKEN_PREFIX: &str = "vercel_blob_rw_";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub blob_base_url: Option<String>,
    pub blob_token: Option<String>,
    pub blob_name: String,
    pub blob_timeout: Option<Duration>,
    pub default_target_revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreMode {
    Remote {
        base_url: String,
        token: Option<String>,
        name: String,
    },
    Local {
        dir: PathBuf,
    },
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = parse_or(read("PORT"), "PORT", DEFAULT_PORT);
        let default_target_revenue = parse_or(
            read("DEFAULT_TARGET_REVENUE"),
            "DEFAULT_TARGET_REVENUE",
            DEFAULT_TARGET_REVENUE,
        );
        let blob_timeout = read("BLOB_TIMEOUT_SECS")
            .and_then(|value| match value.parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(err) => {
                    warn!("ignoring BLOB_TIMEOUT_SECS={value}: {err}");
                    None
                }
            })
            .map(Duration::from_secs);

        let blob_token = read("BLOB_READ_WRITE_TOKEN");
        let blob_base_url = read("BLOB_BASE_URL")
            .or_else(|| blob_token.as_deref().and_then(base_url_from_token))
            .map(|url| url.trim_end_matches('/').to_string());

        Self {
            port,
            data_dir: read("APP_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            blob_base_url,
            blob_token,
            blob_name: read("BLOB_NAME").unwrap_or_else(|| DEFAULT_BLOB_NAME.to_string()),
            blob_timeout,
            default_target_revenue,
        }
    }

    pub fn store_mode(&self) -> StoreMode {
        match &self.blob_base_url {
            Some(base_url) => StoreMode::Remote {
                base_url: base_url.clone(),
                token: self.blob_token.clone(),
                name: self.blob_name.clone(),
            },
            None => StoreMode::Local {
                dir: self.data_dir.clone(),
            },
        }
    }

    pub fn default_settings(&self) -> Settings {
        Settings::with_target(self.default_target_revenue)
    }
}

/// Tokens look like `vercel_blob_rw_<storeId>_<secret>`.
pub fn base_url_from_token(token: &str) -> Option<String> {
    let rest = token.strip_prefix(TOKEN_PREFIX)?;
    let (store_id, _) = rest.split_once('_')?;
    if store_id.is_empty() {
        return None;
    }
    Some(format!(
        "https://{}.public.blob.vercel-storage.com",
        store_id.to_lowercase()
    ))
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, fallback: T) -> T
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|err| {
            warn!("ignoring {key}={raw}: {err}");
            fallback
        }),
        None => fallback,
    }
}
