use crate::api::{self, Context};
use crate::rpc::data::RpcDownloadRequest;
use jsonrpsee::server::{RpcModule, Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

// Method names match the `action` values the original shells send, so the
// wire contract stays recognizable.
pub async fn run_server(
    addr: &str,
    ctx: Context,
    is_running: Arc<AtomicBool>,
) -> Result<(String, ServerHandle), Box<dyn std::error::Error>> {
    let addr = if addr.is_empty() { "127.0.0.1:0" } else { addr };
    let server = Server::builder().build(addr.parse::<SocketAddr>()?).await?;
    let mut module = RpcModule::new(ctx);

    let run_flag = is_running.clone();
    module.register_async_method("shutdown", move |_, _| {
        let flag = run_flag.clone();
        async move {
            flag.store(false, Ordering::SeqCst);
        }
    })?;
    module.register_method("ping", |_, _| "pong")?;

    module.register_async_method("download", |params, ctx| async move {
        let request = params.parse::<RpcDownloadRequest>()?;
        Ok::<_, ErrorObjectOwned>(api::download(&ctx, request.url, request.resolution).await)
    })?;
    // Alias kept for shells that still send the old action name.
    module.register_async_method("downloadUrl", |params, ctx| async move {
        let request = params.parse::<RpcDownloadRequest>()?;
        Ok::<_, ErrorObjectOwned>(api::download(&ctx, request.url, request.resolution).await)
    })?;

    module.register_async_method("checkConnection", |_, ctx| async move {
        Ok::<_, ErrorObjectOwned>(api::check_connection(&ctx).await)
    })?;

    module.register_async_method("checkLoginStatus", |_, ctx| async move {
        Ok::<_, ErrorObjectOwned>(api::check_login_status(&ctx).await)
    })?;

    module.register_async_method("updateSettings", |_, ctx| async move {
        api::update_settings(&ctx).await;
        Ok::<_, ErrorObjectOwned>(true)
    })?;

    let addr = server.local_addr()?;
    let handle = server.start(module);
    tokio::spawn(handle.clone().stopped());
    info!("rpc server listening on {addr}");
    Ok((format!("http://{}", addr), handle))
}
