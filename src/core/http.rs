use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::core::error::{InstallerError, InstallerResult};

const APP_USER_AGENT: &str = "OkyanusInstaller/0.1.0";

pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}

/// Byte transport used by the metadata client and the downloader.
///
/// Production code goes through [`ReqwestTransport`]; tests swap in an
/// in-memory stub.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a whole response body into memory.
    async fn get_bytes(&self, url: &str) -> InstallerResult<Vec<u8>>;

    /// Stream a response body into `sink`, returning the number of bytes written.
    async fn stream_to(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> InstallerResult<u64>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn get_ok(&self, url: &str) -> InstallerResult<reqwest::Response> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallerError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_bytes(&self, url: &str) -> InstallerResult<Vec<u8>> {
        let bytes = self.get_ok(url).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn stream_to(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> InstallerResult<u64> {
        let mut stream = self.get_ok(url).await?.bytes_stream();
        let mut written = 0_u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            sink.write_all(&chunk)
                .await
                .map_err(|e| InstallerError::io(url, e))?;
            written += chunk.len() as u64;
        }

        debug!("Streamed {} bytes from {}", written, url);
        Ok(written)
    }
}

/// Fetch `url` and deserialize it into `T`.
///
/// Shape mismatches and parse failures are reported as
/// [`InstallerError::InvalidMetadata`]; transport failures pass through.
pub async fn fetch_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    url: &str,
) -> InstallerResult<T> {
    let body = transport.get_bytes(url).await?;
    serde_json::from_slice(&body).map_err(|e| InstallerError::InvalidMetadata {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
