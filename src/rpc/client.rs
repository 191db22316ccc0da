use crate::api::{ConnectionStatus, LoginStatus};
use crate::controller::DownloadOutcome;
use crate::rpc::data::RpcDownloadRequest;
use jsonrpsee::core::client::{ClientT, Error};
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;

/// Typed client for the background service, used by shells running in a
/// separate process.
pub struct Client {
    client: HttpClient,
}

impl Client {
    pub fn new(url: &str) -> Result<Self, Error> {
        let client: HttpClient = HttpClientBuilder::default().build(url)?;
        Ok(Self { client })
    }

    pub async fn download(
        &self,
        url: &str,
        resolution: Option<&str>,
    ) -> Result<DownloadOutcome, Error> {
        let request = RpcDownloadRequest { url, resolution };
        self.client.request("download", request).await
    }

    pub async fn check_connection(&self) -> Result<ConnectionStatus, Error> {
        self.client.request("checkConnection", rpc_params![]).await
    }

    pub async fn check_login_status(&self) -> Result<LoginStatus, Error> {
        self.client.request("checkLoginStatus", rpc_params![]).await
    }

    pub async fn update_settings(&self) -> Result<bool, Error> {
        self.client.request("updateSettings", rpc_params![]).await
    }
}
