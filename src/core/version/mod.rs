mod manifest;
mod version_file;

pub use manifest::{VersionEntry, VersionManifest};
pub use version_file::{DownloadArtifact, VersionDownloads, VersionJson};

use tracing::info;

use crate::core::error::InstallerResult;
use crate::core::http::Transport;

/// Follow the manifest → per-version metadata chain down to the server jar URL.
pub async fn resolve_server_url(
    transport: &dyn Transport,
    manifest_url: &str,
    minecraft_version: &str,
) -> InstallerResult<String> {
    let manifest = VersionManifest::fetch(transport, manifest_url).await?;
    let entry = manifest.require_version(minecraft_version)?;

    let version_json = VersionJson::fetch(transport, &entry.url).await?;
    let url = version_json.server_url(&entry.url)?;

    info!("Server jar for {} at {}", minecraft_version, url);
    Ok(url)
}
