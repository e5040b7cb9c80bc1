use crate::config::StoreMode;
use crate::models::{AppData, RevenueEntry, Settings};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

pub const ENTRIES_KEY: &str = "rev-tracker-entries";
pub const SETTINGS_KEY: &str = "rev-tracker-settings";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document store unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("document store answered {0}")]
    Status(StatusCode),
    #[error("stored document is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("local store i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Whole-document storage. There are no partial writes: `put` replaces
/// whatever was stored, and `fetch` returns `None` until the first `put`.
pub trait DocumentStore: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<Option<AppData>, StoreError>> + Send;

    fn put(&self, data: &AppData) -> impl Future<Output = Result<(), StoreError>> + Send;
}

pub enum Backend {
    Remote(RemoteStore),
    Local(LocalStore),
}

impl Backend {
    pub fn from_mode(
        mode: StoreMode,
        timeout: Option<Duration>,
        default_settings: Settings,
    ) -> Result<Self, StoreError> {
        Ok(match mode {
            StoreMode::Remote {
                base_url,
                token,
                name,
            } => Self::Remote(RemoteStore::new(base_url, name, token, timeout)?),
            StoreMode::Local { dir } => Self::Local(LocalStore::new(dir, default_settings)),
        })
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Remote(store) => format!("remote document {}", store.document_url()),
            Self::Local(store) => format!("local keys under {}", store.dir.display()),
        }
    }
}

impl DocumentStore for Backend {
    async fn fetch(&self) -> Result<Option<AppData>, StoreError> {
        match self {
            Self::Remote(store) => store.fetch().await,
            Self::Local(store) => store.fetch().await,
        }
    }

    async fn put(&self, data: &AppData) -> Result<(), StoreError> {
        match self {
            Self::Remote(store) => store.put(data).await,
            Self::Local(store) => store.put(data).await,
        }
    }
}

/// A single named JSON object behind plain HTTP GET/PUT.
pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
    name: String,
    token: Option<String>,
}

impl RemoteStore {
    pub fn new(
        base_url: impl Into<String>,
        name: impl Into<String>,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, StoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            name: name.into(),
            token,
        })
    }

    pub fn document_url(&self) -> String {
        format!("{}/{}", self.base_url, self.name)
    }
}

impl DocumentStore for RemoteStore {
    async fn fetch(&self) -> Result<Option<AppData>, StoreError> {
        // Intermediate caches may hold a stale copy right after a write.
        let response = self
            .http
            .get(self.document_url())
            .query(&[("t", cache_buster())])
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::Status(status));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(StoreError::Malformed)
    }

    async fn put(&self, data: &AppData) -> Result<(), StoreError> {
        let body = serde_json::to_vec(data).map_err(StoreError::Encode)?;
        let mut request = self
            .http
            .put(self.document_url())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let status = request.send().await?.status();
        if !status.is_success() {
            return Err(StoreError::Status(status));
        }

        debug!("wrote {} entries to {}", data.entries.len(), self.document_url());
        Ok(())
    }
}

/// Entries and settings kept under two fixed keys, one JSON file each.
/// Access goes through `lock` so a read never sees half of a write, and each
/// key is replaced by renaming a finished temp file over it.
pub struct LocalStore {
    dir: PathBuf,
    default_settings: Settings,
    lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>, default_settings: Settings) -> Self {
        Self {
            dir: dir.into(),
            default_settings,
            lock: Mutex::new(()),
        }
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl DocumentStore for LocalStore {
    async fn fetch(&self) -> Result<Option<AppData>, StoreError> {
        let _guard = self.lock.lock().await;
        let entries: Option<Vec<RevenueEntry>> = read_key(&self.key_path(ENTRIES_KEY)).await?;
        let settings: Option<Settings> = read_key(&self.key_path(SETTINGS_KEY)).await?;

        if entries.is_none() && settings.is_none() {
            return Ok(None);
        }

        Ok(Some(AppData {
            entries: entries.unwrap_or_default(),
            settings: settings.unwrap_or_else(|| self.default_settings.clone()),
        }))
    }

    async fn put(&self, data: &AppData) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        fs::create_dir_all(&self.dir).await?;
        write_key(&self.key_path(ENTRIES_KEY), &data.entries).await?;
        write_key(&self.key_path(SETTINGS_KEY), &data.settings).await?;
        Ok(())
    }
}

async fn read_key<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(StoreError::Malformed),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn write_key<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(value).map_err(StoreError::Encode)?;
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    fs::write(&staging, payload).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}

fn cache_buster() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
        .to_string()
}
