use crate::storage::Storage;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub const KEY_NAS_URL: &str = "nasUrl";
pub const KEY_USER_ID: &str = "userId";
pub const KEY_USER_PW: &str = "userPw";
pub const KEY_RESOLUTION: &str = "resolution";

/// Storage keys that feed the configuration snapshot.
pub const CONFIG_KEYS: [&str; 4] = [KEY_NAS_URL, KEY_USER_ID, KEY_USER_PW, KEY_RESOLUTION];

pub const DEFAULT_RESOLUTION: &str = "best";

#[derive(Debug, Clone)]
pub struct Config {
    pub nas_url: String,
    pub user_id: String,
    pub user_pw: String,
    pub resolution: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nas_url: String::new(),
            user_id: String::new(),
            user_pw: String::new(),
            resolution: DEFAULT_RESOLUTION.to_string(),
        }
    }
}

/// In-memory snapshot of the persisted settings. Read-only to the rest of
/// the core; the options shell mutates the underlying storage.
pub struct ConfigStore {
    storage: Arc<dyn Storage>,
    snapshot: Mutex<Config>,
}

impl ConfigStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            snapshot: Mutex::new(Config::default()),
        }
    }

    /// Reload the snapshot from storage. Missing or unreadable keys leave
    /// the defaults in effect; a failed load is not an error state.
    pub async fn load(&self) {
        let nas_url = self.read_string(KEY_NAS_URL).await.unwrap_or_default();
        let user_id = self.read_string(KEY_USER_ID).await.unwrap_or_default();
        let user_pw = self.read_string(KEY_USER_PW).await.unwrap_or_default();
        let resolution = match self.read_string(KEY_RESOLUTION).await {
            Some(value) if !value.is_empty() => value,
            _ => DEFAULT_RESOLUTION.to_string(),
        };

        let mut snapshot = self.snapshot.lock().await;
        *snapshot = Config {
            nas_url,
            user_id,
            user_pw,
            resolution,
        };
        debug!("config loaded");
    }

    async fn read_string(&self, key: &str) -> Option<String> {
        match self.storage.get(key).await {
            Ok(Some(Value::String(value))) => Some(value),
            _ => None,
        }
    }

    pub async fn get(&self) -> Config {
        self.snapshot.lock().await.clone()
    }

    pub async fn is_complete(&self) -> bool {
        let snapshot = self.snapshot.lock().await;
        !snapshot.nas_url.is_empty()
            && !snapshot.user_id.is_empty()
            && !snapshot.user_pw.is_empty()
    }

    /// Per-session resolution override from the popup; not persisted.
    pub async fn override_resolution(&self, resolution: &str) {
        let mut snapshot = self.snapshot.lock().await;
        snapshot.resolution = resolution.to_string();
        debug!(resolution, "session resolution override");
    }
}
