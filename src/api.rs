//! Process-wide context and the operations the shells call. The context is
//! constructed once at startup and handed to the RPC/CLI handlers; nothing
//! here is a global.

use crate::client::NasClient;
use crate::config::{ConfigStore, CONFIG_KEYS};
use crate::controller::{DownloadController, DownloadOutcome};
use crate::extract::TriggerContext;
use crate::storage::{LocalStorage, Storage, StorageObserver};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginStatus {
    pub success: bool,
    pub is_logged_in: bool,
    pub has_config: bool,
    pub nas_url: String,
}

/// Reacts to storage writes: a change to any configuration key refreshes
/// the snapshot and invalidates the cached login.
struct ConfigWatcher {
    config: Arc<ConfigStore>,
    client: Arc<NasClient>,
}

#[async_trait]
impl StorageObserver for ConfigWatcher {
    async fn on_keys_changed(&self, keys: &[String]) {
        if keys.iter().any(|key| CONFIG_KEYS.contains(&key.as_str())) {
            debug!(?keys, "config keys changed");
            self.config.load().await;
            self.client.invalidate_login_cache().await;
        }
    }
}

pub struct Context {
    pub storage: Arc<LocalStorage>,
    pub config: Arc<ConfigStore>,
    pub client: Arc<NasClient>,
    pub controller: DownloadController,
}

impl Context {
    pub async fn new(data_dir: &Path) -> Self {
        let storage = Arc::new(LocalStorage::new(data_dir));
        let config = Arc::new(ConfigStore::new(storage.clone()));
        config.load().await;
        let client = Arc::new(NasClient::new(config.clone(), storage.clone()).await);
        storage
            .subscribe(Arc::new(ConfigWatcher {
                config: config.clone(),
                client: client.clone(),
            }))
            .await;
        let controller = DownloadController::new(config.clone(), client.clone());
        Self {
            storage,
            config,
            client,
            controller,
        }
    }
}

/// Popup/context-menu submission path: the explicit URL becomes the link
/// candidate of the trigger.
pub async fn download(ctx: &Context, url: &str, resolution: Option<&str>) -> DownloadOutcome {
    let trigger = TriggerContext {
        link_url: Some(url.to_string()),
        ..Default::default()
    };
    ctx.controller
        .handle_download_request(&trigger, resolution)
        .await
}

pub async fn check_connection(ctx: &Context) -> ConnectionStatus {
    match ctx.client.check_connection().await {
        Ok(()) => ConnectionStatus {
            success: true,
            error: None,
        },
        Err(err) => ConnectionStatus {
            success: false,
            error: Some(err.to_string()),
        },
    }
}

pub async fn check_login_status(ctx: &Context) -> LoginStatus {
    LoginStatus {
        success: true,
        is_logged_in: ctx.client.is_login_cached().await,
        has_config: ctx.config.is_complete().await,
        nas_url: ctx.config.get().await.nas_url,
    }
}

/// Fire-and-forget settings notification from an options shell running in
/// another process; its storage writes are not visible to our observers.
pub async fn update_settings(ctx: &Context) {
    ctx.config.load().await;
    ctx.client.invalidate_login_cache().await;
}
