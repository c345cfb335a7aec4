use std::fmt;
use std::path::PathBuf;

use crate::core::error::{InstallerError, InstallerResult};

/// A parsed `group:artifact:version` Maven coordinate.
///
/// Classifiers and `@packaging` suffixes are not supported: the loader
/// metadata only ever hands back plain three-part coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

/// Repository-relative location of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// `net/fabricmc/intermediary/1.14.3`
    pub relative_path: String,
    /// `intermediary-1.14.3`
    pub file_stem: String,
}

impl ArtifactCoordinate {
    /// Parse a coordinate string. Exactly three non-empty segments are required.
    pub fn parse(coord: &str) -> InstallerResult<Self> {
        let parts: Vec<&str> = coord.split(':').collect();

        match parts.as_slice() {
            [group, artifact, version]
                if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
            {
                Ok(Self {
                    group: group.to_string(),
                    artifact: artifact.to_string(),
                    version: version.to_string(),
                })
            }
            _ => Err(InstallerError::MalformedCoordinate(coord.to_string())),
        }
    }

    /// Parse and resolve in one step.
    pub fn resolve(coord: &str) -> InstallerResult<ResolvedPath> {
        Ok(Self::parse(coord)?.resolved())
    }

    /// Group portion as a path (`net/fabricmc`).
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }

    pub fn resolved(&self) -> ResolvedPath {
        ResolvedPath {
            relative_path: format!("{}/{}/{}", self.group_path(), self.artifact, self.version),
            file_stem: format!("{}-{}", self.artifact, self.version),
        }
    }

    /// `<repo>/<relative_path>/<file_stem>` without any extension.
    pub fn url_base(&self, repo_base: &str) -> String {
        let base = repo_base.trim_end_matches('/');
        let resolved = self.resolved();
        format!("{}/{}/{}", base, resolved.relative_path, resolved.file_stem)
    }

    /// Full URL of the artifact with the given extension (`"jar"`, `"json"`).
    pub fn url(&self, repo_base: &str, extension: &str) -> String {
        format!("{}.{}", self.url_base(repo_base), extension)
    }

    /// Local cache path mirroring the repository layout:
    /// `net/fabricmc/intermediary/1.14.3/intermediary-1.14.3.jar`.
    pub fn local_path(&self) -> PathBuf {
        let resolved = self.resolved();
        PathBuf::from(resolved.relative_path).join(format!("{}.jar", resolved.file_stem))
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}
