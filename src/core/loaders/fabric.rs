use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::{fetch_json, Transport};
use crate::core::maven::ArtifactCoordinate;

// ── Wire shapes ─────────────────────────────────────────
// Every field is optional on the wire; validation turns gaps into the
// matching error kind instead of a generic parse failure.

#[derive(Debug, Deserialize)]
struct RawLoaderVersion {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    stable: Option<bool>,
    #[serde(default)]
    maven: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLoaderMeta {
    #[serde(default)]
    libraries: Option<RawLibrarySections>,
}

#[derive(Debug, Deserialize)]
struct RawLibrarySections {
    #[serde(default)]
    common: Option<Vec<RawLibrary>>,
    #[serde(default)]
    server: Option<Vec<RawLibrary>>,
}

#[derive(Debug, Deserialize)]
struct RawLibrary {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

// ── Domain types ────────────────────────────────────────

/// The loader release picked from the versions endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderVersion {
    pub version: Option<String>,
    pub maven: String,
}

/// A loader release resolved against the loader maven.
#[derive(Debug, Clone)]
pub struct LoaderRelease {
    pub coordinate: ArtifactCoordinate,
    pub jar_url: String,
    pub meta_url: String,
}

/// One library required by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub coordinate_name: String,
    pub download_root: String,
}

impl LibraryEntry {
    pub fn coordinate(&self) -> InstallerResult<ArtifactCoordinate> {
        ArtifactCoordinate::parse(&self.coordinate_name)
    }

    pub fn download_url(&self) -> InstallerResult<String> {
        Ok(self.coordinate()?.url(&self.download_root, "jar"))
    }
}

/// Pick the first release flagged stable, in response order.
fn select_stable(versions: Vec<RawLoaderVersion>, url: &str) -> InstallerResult<LoaderVersion> {
    for (index, raw) in versions.into_iter().enumerate() {
        let stable = raw.stable.ok_or_else(|| InstallerError::InvalidMetadata {
            url: url.to_string(),
            reason: format!("loader entry #{index} has no `stable` flag"),
        })?;

        if !stable {
            debug!("Skipping unstable loader {:?}", raw.version);
            continue;
        }

        let maven = raw.maven.ok_or_else(|| InstallerError::InvalidMetadata {
            url: url.to_string(),
            reason: format!("stable loader entry #{index} has no `maven` coordinate"),
        })?;

        return Ok(LoaderVersion {
            version: raw.version,
            maven,
        });
    }

    Err(InstallerError::NoStableLoaderRelease)
}

/// Flatten `common` then `server`, keeping response order.
fn flatten_libraries(meta: RawLoaderMeta, url: &str) -> InstallerResult<Vec<LibraryEntry>> {
    let invalid = |reason: String| InstallerError::InvalidLibraryManifest {
        url: url.to_string(),
        reason,
    };

    let sections = meta
        .libraries
        .ok_or_else(|| invalid("no `libraries` object".into()))?;
    let common = sections
        .common
        .ok_or_else(|| invalid("no `libraries.common` array".into()))?;
    let server = sections
        .server
        .ok_or_else(|| invalid("no `libraries.server` array".into()))?;

    common
        .into_iter()
        .chain(server)
        .enumerate()
        .map(|(index, raw)| {
            let coordinate_name = raw
                .name
                .ok_or_else(|| invalid(format!("library #{index} has no name")))?;
            let download_root = raw
                .url
                .ok_or_else(|| invalid(format!("library {coordinate_name} has no url")))?;
            Ok(LibraryEntry {
                coordinate_name,
                download_root,
            })
        })
        .collect()
}

/// Client for the Fabric meta API and the Fabric maven.
pub struct FabricResolver {
    transport: Arc<dyn Transport>,
    versions_url: String,
    maven_root: String,
}

impl FabricResolver {
    pub fn new(transport: Arc<dyn Transport>, versions_url: &str, maven_root: &str) -> Self {
        Self {
            transport,
            versions_url: versions_url.to_string(),
            maven_root: maven_root.to_string(),
        }
    }

    /// First stable loader listed by the versions endpoint.
    pub async fn latest_stable(&self) -> InstallerResult<LoaderVersion> {
        let versions: Vec<RawLoaderVersion> =
            fetch_json(self.transport.as_ref(), &self.versions_url).await?;
        let picked = select_stable(versions, &self.versions_url)?;
        info!("Selected stable Fabric loader {}", picked.maven);
        Ok(picked)
    }

    pub fn release_for(&self, version: &LoaderVersion) -> InstallerResult<LoaderRelease> {
        let coordinate = ArtifactCoordinate::parse(&version.maven)?;
        let jar_url = coordinate.url(&self.maven_root, "jar");
        let meta_url = coordinate.url(&self.maven_root, "json");
        Ok(LoaderRelease {
            coordinate,
            jar_url,
            meta_url,
        })
    }

    /// Latest stable loader, resolved to its download and metadata URLs.
    pub async fn resolve_loader(&self) -> InstallerResult<LoaderRelease> {
        let version = self.latest_stable().await?;
        self.release_for(&version)
    }

    /// The loader's libraries, `common` first then `server`.
    pub async fn libraries(&self, release: &LoaderRelease) -> InstallerResult<Vec<LibraryEntry>> {
        let meta: RawLoaderMeta =
            fetch_json(self.transport.as_ref(), &release.meta_url).await?;
        let libraries = flatten_libraries(meta, &release.meta_url)?;
        info!(
            "Fabric loader {} requires {} libraries",
            release.coordinate,
            libraries.len()
        );
        Ok(libraries)
    }

    /// The intermediary mappings library, hosted on the loader maven.
    pub fn intermediary(&self, coordinate_name: &str) -> LibraryEntry {
        LibraryEntry {
            coordinate_name: coordinate_name.to_string(),
            download_root: self.maven_root.clone(),
        }
    }
}
