use crate::client::NasClient;
use crate::config::ConfigStore;
use crate::extract::{extract_target_url, is_valid_url, TriggerContext};
use crate::messages;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Result of one download request, shaped for direct return to a UI shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadOutcome {
    fn succeeded(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error),
        }
    }
}

/// The single choke point every shell funnels download requests through:
/// guards the configuration, extracts and validates the target URL, then
/// delegates to the client and translates failures into display strings.
pub struct DownloadController {
    config: Arc<ConfigStore>,
    client: Arc<NasClient>,
}

impl DownloadController {
    pub fn new(config: Arc<ConfigStore>, client: Arc<NasClient>) -> Self {
        Self { config, client }
    }

    pub async fn handle_download_request(
        &self,
        trigger: &TriggerContext,
        resolution: Option<&str>,
    ) -> DownloadOutcome {
        // Only the address is required here; the submission endpoint itself
        // needs no credentials.
        if self.config.get().await.nas_url.is_empty() {
            return DownloadOutcome::failed(messages::ERR_NAS_URL_NOT_SET.to_string());
        }

        if let Some(resolution) = resolution {
            self.config.override_resolution(resolution).await;
        }

        let target_url = extract_target_url(trigger);
        debug!(%target_url, "extracted target url");
        if target_url.is_empty() {
            return DownloadOutcome::failed(messages::ERR_NO_URL.to_string());
        }
        if !is_valid_url(&target_url) {
            return DownloadOutcome::failed(messages::ERR_INVALID_URL.to_string());
        }

        match self.client.request_download(&target_url).await {
            Ok(()) => DownloadOutcome::succeeded(messages::MSG_DOWNLOAD_STARTED),
            Err(err) => {
                error!("download request failed: {err}");
                DownloadOutcome::failed(format!("{}{}", messages::ERR_DOWNLOAD_FAILED, err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalStorage, Storage};
    use serde_json::json;

    async fn controller_for(nas_url: &str) -> (DownloadController, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(dir.path()));
        if !nas_url.is_empty() {
            storage
                .set("nasUrl", json!(nas_url))
                .await
                .unwrap();
        }
        let config = Arc::new(ConfigStore::new(storage.clone()));
        config.load().await;
        let client = Arc::new(NasClient::new(config.clone(), storage).await);
        (DownloadController::new(config, client), dir)
    }

    fn link_trigger(url: &str) -> TriggerContext {
        TriggerContext {
            link_url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_rejects_without_nas_url() {
        let (controller, _dir) = controller_for("").await;
        let outcome = controller
            .handle_download_request(&link_trigger("https://example.com/v"), None)
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some(messages::ERR_NAS_URL_NOT_SET));
    }

    #[tokio::test]
    async fn test_rejects_unextractable_url() {
        let (controller, _dir) = controller_for("http://nas:8080").await;
        let outcome = controller
            .handle_download_request(&TriggerContext::default(), None)
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some(messages::ERR_NO_URL));
    }

    #[tokio::test]
    async fn test_rejects_invalid_url() {
        let (controller, _dir) = controller_for("http://nas:8080").await;
        let outcome = controller
            .handle_download_request(&link_trigger("ftp://example.com/v"), None)
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some(messages::ERR_INVALID_URL));
    }
}
