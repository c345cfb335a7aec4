// ─── Version Manifest ───
// Fetches the Mojang version manifest and looks up a single release.

use serde::Deserialize;
use tracing::info;

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::{fetch_json, Transport};

/// Top-level Mojang version manifest.
#[derive(Debug, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionEntry>,
}

/// A single entry in the manifest. Only `id` and `url` are consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    pub url: String,
}

impl VersionManifest {
    pub async fn fetch(transport: &dyn Transport, url: &str) -> InstallerResult<Self> {
        info!("Fetching Minecraft version manifest...");

        let manifest: VersionManifest = fetch_json(transport, url).await?;

        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    /// Find a specific version entry by ID (e.g. "1.14.3").
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    pub fn require_version(&self, id: &str) -> InstallerResult<&VersionEntry> {
        self.find_version(id)
            .ok_or_else(|| InstallerError::VersionNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_manifest_ignores_extra_fields() {
        let json = r#"{
            "latest": { "release": "1.14.3" },
            "versions": [{
                "id": "1.14.3",
                "type": "release",
                "time": "2019-06-24T12:52:52+00:00",
                "url": "https://example.com/1.14.3.json"
            }]
        }"#;
        let manifest: VersionManifest = serde_json::from_str(json).unwrap();
        let entry = manifest.find_version("1.14.3").unwrap();
        assert_eq!(entry.url, "https://example.com/1.14.3.json");
    }

    #[test]
    fn first_matching_entry_wins() {
        let manifest = VersionManifest {
            versions: vec![
                VersionEntry { id: "1.14.3".into(), url: "A".into() },
                VersionEntry { id: "1.14.3".into(), url: "B".into() },
            ],
        };
        assert_eq!(manifest.require_version("1.14.3").unwrap().url, "A");
        assert!(manifest.require_version("1.15").is_err());
    }
}
