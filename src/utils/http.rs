use bytes::{Bytes, BytesMut};
use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::{Method, StatusCode, Uri};
#[cfg(not(feature = "rustls-platform-verifier"))]
use hyper_rustls::ConfigBuilderExt;
use hyper_util::{
    client::legacy::{
        connect::{Connect, HttpConnector},
        Client,
    },
    rt::TokioExecutor,
};
use once_cell::sync::Lazy;
use rustls::ClientConfig;
#[cfg(feature = "rustls-platform-verifier")]
use rustls_platform_verifier::BuilderVerifierExt;
use serde::Serialize;
use std::{collections::HashMap, fmt};

pub type HttpResult = Result<ResponseData, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug)]
pub struct ResponseData {
    pub status: u16,
    pub body: Option<Bytes>,
}

impl ResponseData {
    /// Raw body decoded leniently; the download station mixes HTML, plain
    /// text and JSON in its responses.
    pub fn body_text(&self) -> String {
        self.body
            .as_ref()
            .map_or_else(String::new, |body| String::from_utf8_lossy(body).to_string())
    }

    pub fn status_text(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown Status")
    }
}

pub async fn get(url: Uri, header_map: &HashMap<String, String>) -> HttpResult {
    dispatch(Method::GET, url, header_map, None).await
}

/// POST with an `application/x-www-form-urlencoded` body.
pub async fn post_form(url: Uri, fields: &[(&str, &str)]) -> HttpResult {
    let body = {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in fields {
            serializer.append_pair(key, value);
        }
        Bytes::from(serializer.finish())
    };
    dispatch(
        Method::POST,
        url,
        &HashMap::new(),
        Some(("application/x-www-form-urlencoded", body)),
    )
    .await
}

/// POST with a JSON body.
pub async fn post_json<T: Serialize + ?Sized>(url: Uri, payload: &T) -> HttpResult {
    let body = Bytes::from(serde_json::to_vec(payload)?);
    let header_map = HashMap::from([("Accept".to_string(), "application/json".to_string())]);
    dispatch(Method::POST, url, &header_map, Some(("application/json", body))).await
}

async fn dispatch(
    method: Method,
    url: Uri,
    header_map: &HashMap<String, String>,
    body: Option<(&str, Bytes)>,
) -> HttpResult {
    if url.scheme_str() == Some("https") {
        let https = https_config()?;
        let client = Client::builder(TokioExecutor::new()).build(https);
        send(client, method, url, header_map, body).await
    } else {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        send(client, method, url, header_map, body).await
    }
}

// Redirects are not followed, so a 302 from the login endpoint stays
// observable to the caller.
async fn send<C>(
    client: Client<C, Full<Bytes>>,
    method: Method,
    url: Uri,
    header_map: &HashMap<String, String>,
    body: Option<(&str, Bytes)>,
) -> HttpResult
where
    C: Connect + Clone + Send + Sync + 'static,
{
    let mut req = hyper::Request::builder().method(method).uri(url);
    for (key, value) in header_map {
        req = req.header(key, value);
    }
    let req = match body {
        Some((content_type, bytes)) => req
            .header("Content-Type", content_type)
            .body(Full::new(bytes))?,
        None => req.body(Full::new(Bytes::new()))?,
    };
    let mut res = client.request(req).await?;
    let status = res.status();
    let mut body = BytesMut::new();
    while let Some(next) = res.frame().await {
        let frame = next?;
        if let Some(chunk) = frame.data_ref() {
            body.extend_from_slice(chunk);
        }
    }
    Ok(ResponseData {
        status: status.as_u16(),
        body: Some(body.freeze()),
    })
}

// Global https provider with lazy initialization
static PROVIDER: Lazy<std::sync::Arc<rustls::crypto::CryptoProvider>> =
    Lazy::new(|| std::sync::Arc::new(rustls::crypto::ring::default_provider()));

// Https config error wrapper error
struct HttpsConfigError {
    error: Box<dyn std::error::Error + Send + Sync>,
}
impl fmt::Display for HttpsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpsConfigError: {}", self.error)
    }
}
impl fmt::Debug for HttpsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpsConfigError: {:?}", self.error)
    }
}
impl std::error::Error for HttpsConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

fn https_config() -> Result<hyper_rustls::HttpsConnector<HttpConnector>, HttpsConfigError> {
    let provider = PROVIDER.clone();
    let tls: rustls::ClientConfig;
    #[cfg(feature = "rustls-platform-verifier")]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_platform_verifier()
            .with_no_client_auth();
    }
    #[cfg(all(feature = "webpki-roots", not(feature = "rustls-platform-verifier")))]
    {
        tls = rustls::ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_webpki_roots()
            .with_no_client_auth();
    }
    #[cfg(all(
        feature = "native-tokio",
        not(feature = "webpki-roots"),
        not(feature = "rustls-platform-verifier")
    ))]
    {
        tls = rustls::ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_native_roots()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_no_client_auth();
    }
    #[cfg(all(
        not(feature = "native-tokio"),
        not(feature = "webpki-roots"),
        not(feature = "rustls-platform-verifier")
    ))]
    {
        compile_error!("No TLS backend enabled");
    }
    Ok(hyper_rustls::HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build())
}
