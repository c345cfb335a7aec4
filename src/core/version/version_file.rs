// ─── Version File ───
// Per-version metadata; only the server download is of interest here.

use serde::Deserialize;

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::{fetch_json, Transport};

#[derive(Debug, Deserialize)]
pub struct VersionJson {
    #[serde(default)]
    pub downloads: Option<VersionDownloads>,
}

#[derive(Debug, Deserialize)]
pub struct VersionDownloads {
    #[serde(default)]
    pub server: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    pub url: String,
}

impl VersionJson {
    pub async fn fetch(transport: &dyn Transport, url: &str) -> InstallerResult<Self> {
        fetch_json(transport, url).await
    }

    /// `downloads.server.url`; `source_url` only feeds the error message.
    pub fn server_url(&self, source_url: &str) -> InstallerResult<String> {
        self.downloads
            .as_ref()
            .and_then(|d| d.server.as_ref())
            .map(|server| server.url.clone())
            .ok_or_else(|| InstallerError::InvalidMetadata {
                url: source_url.to_string(),
                reason: "no downloads.server entry".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_url_is_extracted() {
        let json = r#"{
            "id": "1.14.3",
            "downloads": {
                "client": { "sha1": "aa", "size": 1, "url": "https://c/client.jar" },
                "server": { "sha1": "bb", "size": 2, "url": "https://s/server.jar" }
            }
        }"#;
        let v: VersionJson = serde_json::from_str(json).unwrap();
        assert_eq!(v.server_url("U").unwrap(), "https://s/server.jar");
    }

    #[test]
    fn missing_downloads_block_is_invalid_metadata() {
        let v: VersionJson = serde_json::from_str(r#"{"id":"1.14.3"}"#).unwrap();
        let err = v.server_url("U").unwrap_err();
        assert!(matches!(err, InstallerError::InvalidMetadata { url, .. } if url == "U"));
    }
}
