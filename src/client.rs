pub mod login_cache;
pub mod response;

use crate::config::ConfigStore;
use crate::error::{NasError, Result};
use crate::storage::Storage;
use crate::utils::http;
use crate::utils::time::now_unix_ms;
use hyper::Uri;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use self::login_cache::LoginCache;

pub const LOGIN_CACHE_KEY: &str = "loginCache";

const PROBE_PATHS: [&str; 3] = ["/", "/login", "/youtube-dl"];

/// JSON payload for the download-submission endpoint.
#[derive(Debug, Serialize)]
struct DownloadSubmission<'a> {
    url: &'a str,
    resolution: &'a str,
}

/// Stateful HTTP client for the download station: performs the credentialed
/// login when the cached session is stale and submits download requests.
pub struct NasClient {
    config: Arc<ConfigStore>,
    storage: Arc<dyn Storage>,
    login_cache: Mutex<LoginCache>,
}

impl NasClient {
    /// Restores the persisted login cache; a missing or unreadable record
    /// starts as expired.
    pub async fn new(config: Arc<ConfigStore>, storage: Arc<dyn Storage>) -> Self {
        let login_cache = match storage.get(LOGIN_CACHE_KEY).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_default(),
            _ => LoginCache::default(),
        };
        Self {
            config,
            storage,
            login_cache: Mutex::new(login_cache),
        }
    }

    pub async fn is_login_cached(&self) -> bool {
        let cache = self.login_cache.lock().await;
        let now = now_unix_ms();
        let valid = cache.is_valid(now);
        debug!(
            is_logged_in = cache.is_logged_in,
            age_ms = now.saturating_sub(cache.timestamp),
            valid,
            "login cache check"
        );
        valid
    }

    async fn persist_cache(&self, cache: &LoginCache) {
        if let Ok(value) = serde_json::to_value(cache) {
            if let Err(err) = self.storage.set(LOGIN_CACHE_KEY, value).await {
                warn!("could not persist login cache: {err}");
            }
        }
    }

    async fn record_login(&self, success: bool) {
        let snapshot = {
            let mut cache = self.login_cache.lock().await;
            cache.record(success, now_unix_ms());
            cache.clone()
        };
        self.persist_cache(&snapshot).await;
    }

    /// Forces the next request through a fresh login; called when any
    /// configuration key changes.
    pub async fn invalidate_login_cache(&self) {
        let snapshot = {
            let mut cache = self.login_cache.lock().await;
            cache.invalidate();
            cache.clone()
        };
        self.persist_cache(&snapshot).await;
        debug!("login cache invalidated");
    }

    /// Logs in unless the cached session is still valid. Network trouble is
    /// recorded as a failed attempt and reported as `false`, never as an
    /// error; downstream cannot tell it apart from bad credentials.
    pub async fn login(&self) -> bool {
        if self.is_login_cached().await {
            debug!("using cached login status");
            return true;
        }

        let config = self.config.get().await;
        let endpoint = match endpoint_uri(&config.nas_url, "/login") {
            Some(uri) => uri,
            None => {
                self.record_login(false).await;
                return false;
            }
        };

        let success = match http::post_form(
            endpoint,
            &[
                ("id", config.user_id.as_str()),
                ("myPw", config.user_pw.as_str()),
            ],
        )
        .await
        {
            Ok(rsp) => {
                let verdict =
                    response::interpret_login_response(rsp.status, &rsp.body_text(), &config.user_id);
                debug!(status = rsp.status, verdict, "login response interpreted");
                verdict
            }
            Err(err) => {
                warn!("login request failed: {err}");
                false
            }
        };

        self.record_login(success).await;
        if success {
            info!("login successful");
        } else {
            warn!("login failed");
        }
        success
    }

    /// Submits a download. The submission endpoint itself needs no
    /// credentials, but a login is attempted first so the station has a
    /// session to attach the job to.
    pub async fn request_download(&self, url: &str) -> Result<()> {
        if !self.login().await {
            return Err(NasError::LoginFailed);
        }

        let config = self.config.get().await;
        let endpoint =
            endpoint_uri(&config.nas_url, "/youtube-dl/q").ok_or(NasError::ConfigIncomplete)?;

        debug!(%url, resolution = %config.resolution, "sending download request");
        let submission = DownloadSubmission {
            url,
            resolution: &config.resolution,
        };
        let rsp = http::post_json(endpoint, &submission)
            .await
            .map_err(|err| NasError::NetworkFailure(err.to_string()))?;

        let text = rsp.body_text();
        debug!(status = rsp.status, body = %text, "download response");
        response::interpret_download_response(rsp.status, rsp.status_text(), &text)
    }

    /// Probes the station root, the login page and the queue page in turn;
    /// the first answering endpoint counts as connected.
    pub async fn check_connection(&self) -> Result<()> {
        let config = self.config.get().await;
        if config.nas_url.is_empty() {
            return Err(NasError::ConfigIncomplete);
        }

        let mut last_error = NasError::NetworkFailure("no probe endpoint responded".to_string());
        for path in PROBE_PATHS {
            let endpoint = match endpoint_uri(&config.nas_url, path) {
                Some(uri) => uri,
                None => return Err(NasError::InvalidUrl),
            };
            match http::get(endpoint, &HashMap::new()).await {
                Ok(rsp) if response::indicates_reachable(rsp.status) => {
                    debug!(path, status = rsp.status, "connection probe succeeded");
                    return Ok(());
                }
                Ok(rsp) => {
                    last_error = NasError::HttpError {
                        status: rsp.status,
                        status_text: rsp.status_text().to_string(),
                    };
                }
                Err(err) => {
                    last_error = NasError::NetworkFailure(err.to_string());
                }
            }
        }
        Err(last_error)
    }
}

fn endpoint_uri(nas_url: &str, path: &str) -> Option<Uri> {
    if nas_url.is_empty() {
        return None;
    }
    format!("{}{}", nas_url.trim_end_matches('/'), path)
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use serde_json::json;

    async fn client_for(nas_url: &str) -> (NasClient, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(dir.path()));
        storage
            .set_many(vec![
                ("nasUrl".to_string(), json!(nas_url)),
                ("userId".to_string(), json!("tester")),
                ("userPw".to_string(), json!("secret")),
            ])
            .await
            .unwrap();
        let config = Arc::new(ConfigStore::new(storage.clone()));
        config.load().await;
        let client = NasClient::new(config, storage).await;
        (client, dir)
    }

    #[tokio::test]
    async fn test_login_success_is_cached_and_persisted() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/login")
            .with_status(302)
            .expect(1)
            .create_async()
            .await;

        let (client, _dir) = client_for(&server.url()).await;
        assert!(client.login().await);
        assert!(client.is_login_cached().await);
        // Second call must be served from the cache.
        assert!(client.login().await);
        login.assert_async().await;

        let stored = client.storage.get(LOGIN_CACHE_KEY).await.unwrap().unwrap();
        assert_eq!(stored["isLoggedIn"], json!(true));
    }

    #[tokio::test]
    async fn test_failed_login_updates_cache() {
        let mut server = mockito::Server::new_async().await;
        let _login = server
            .mock("POST", "/login")
            .with_status(200)
            .with_body("id or password is not correct")
            .create_async()
            .await;

        let (client, _dir) = client_for(&server.url()).await;
        assert!(!client.login().await);
        assert!(!client.is_login_cached().await);
    }

    #[tokio::test]
    async fn test_network_failure_is_swallowed_as_false() {
        // Nothing listens on this port.
        let (client, _dir) = client_for("http://127.0.0.1:1").await;
        assert!(!client.login().await);
        assert!(!client.is_login_cached().await);
    }

    #[tokio::test]
    async fn test_request_download_fails_without_login() {
        let mut server = mockito::Server::new_async().await;
        let _login = server
            .mock("POST", "/login")
            .with_status(200)
            .with_body("id or password is not correct")
            .create_async()
            .await;

        let (client, _dir) = client_for(&server.url()).await;
        let result = client.request_download("https://example.com/v").await;
        assert!(matches!(result, Err(NasError::LoginFailed)));
    }

    #[tokio::test]
    async fn test_check_connection_uses_fallback_probes() {
        let mut server = mockito::Server::new_async().await;
        let _root = server
            .mock("GET", "/")
            .with_status(500)
            .create_async()
            .await;
        let _login = server
            .mock("GET", "/login")
            .with_status(404)
            .create_async()
            .await;

        let (client, _dir) = client_for(&server.url()).await;
        assert!(client.check_connection().await.is_ok());
    }

    #[tokio::test]
    async fn test_check_connection_reports_last_error() {
        let mut server = mockito::Server::new_async().await;
        for path in ["/", "/login", "/youtube-dl"] {
            let _m = server
                .mock("GET", path)
                .with_status(503)
                .create_async()
                .await;
        }

        let (client, _dir) = client_for(&server.url()).await;
        let result = client.check_connection().await;
        assert!(matches!(
            result,
            Err(NasError::HttpError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_check_connection_without_address() {
        let dir = tempfile::tempdir().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(dir.path()));
        let config = Arc::new(ConfigStore::new(storage.clone()));
        let client = NasClient::new(config, storage).await;
        assert!(matches!(
            client.check_connection().await,
            Err(NasError::ConfigIncomplete)
        ));
    }
}
