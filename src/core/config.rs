use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::maven::FABRIC_MAVEN;

/// Optional override file looked up in the working directory.
pub const CONFIG_FILE: &str = "okyanus-installer.json";

const VERSION_MANIFEST_URL: &str = "https://launchermeta.mojang.com/mc/game/version_manifest.json";
const LOADER_VERSIONS_URL: &str = "https://meta.fabricmc.net/v2/versions/loader";

/// Immutable installer settings, built once at process start.
///
/// All relative locations are resolved against `work_dir`:
/// - `<data_root>/<server_jar_name>`    — cached vanilla server
/// - `<data_root>/<loader_jar_name>`    — loader archive, merge destination
/// - `<data_root>/<libraries_dir_name>` — downloaded libraries
/// - `<output_jar_name>`                — final merged archive
/// - `<properties_file_name>`           — launcher properties
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub minecraft_version: String,
    #[serde(skip)]
    pub work_dir: PathBuf,
    pub data_root: String,
    pub server_jar_name: String,
    pub loader_jar_name: String,
    pub libraries_dir_name: String,
    pub output_jar_name: String,
    pub properties_file_name: String,
    pub version_manifest_url: String,
    pub loader_versions_url: String,
    pub loader_maven_root: String,
    pub intermediary_group: String,
    pub intermediary_artifact: String,
    /// Maximum number of library downloads in flight.
    pub fetch_concurrency: usize,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            minecraft_version: "1.14.3".to_string(),
            work_dir: PathBuf::from("."),
            data_root: ".okyanus".to_string(),
            server_jar_name: "server.jar".to_string(),
            loader_jar_name: "fabric-loader.jar".to_string(),
            libraries_dir_name: "libs".to_string(),
            output_jar_name: "server.jar".to_string(),
            properties_file_name: "fabric-server-launcher.properties".to_string(),
            version_manifest_url: VERSION_MANIFEST_URL.to_string(),
            loader_versions_url: LOADER_VERSIONS_URL.to_string(),
            loader_maven_root: FABRIC_MAVEN.to_string(),
            intermediary_group: "net.fabricmc".to_string(),
            intermediary_artifact: "intermediary".to_string(),
            fetch_concurrency: 1,
        }
    }
}

impl InstallerConfig {
    /// Defaults rooted at `work_dir`, overridden by `work_dir/okyanus-installer.json`
    /// when that file exists.
    pub fn load(work_dir: &Path) -> InstallerResult<Self> {
        let path = work_dir.join(CONFIG_FILE);

        let mut config = if path.is_file() {
            let raw = std::fs::read_to_string(&path).map_err(|e| InstallerError::io(&path, e))?;
            let parsed: InstallerConfig =
                serde_json::from_str(&raw).map_err(|e| InstallerError::InvalidConfig {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            info!("Loaded installer overrides from {:?}", path);
            parsed
        } else {
            debug!("No {} found, using defaults", CONFIG_FILE);
            InstallerConfig::default()
        };

        config.work_dir = work_dir.to_path_buf();
        config.validate(&path)?;
        Ok(config)
    }

    /// Defaults rooted at `work_dir`, ignoring any override file.
    pub fn rooted_at(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            ..Self::default()
        }
    }

    fn validate(&self, path: &Path) -> InstallerResult<()> {
        let invalid = |reason: &str| InstallerError::InvalidConfig {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if self.minecraft_version.trim().is_empty() {
            return Err(invalid("minecraft_version must not be empty"));
        }
        if self.fetch_concurrency == 0 {
            return Err(invalid("fetch_concurrency must be at least 1"));
        }
        let server = self.server_jar_path();
        let loader = self.loader_jar_path();
        let output = self.output_jar_path();
        if loader == server {
            return Err(invalid("loader jar and server jar resolve to the same file"));
        }
        if output == server {
            return Err(invalid("output jar and server jar resolve to the same file"));
        }
        if output == loader {
            return Err(invalid("output jar and loader jar resolve to the same file"));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.work_dir.join(&self.data_root)
    }

    pub fn server_jar_path(&self) -> PathBuf {
        self.data_dir().join(&self.server_jar_name)
    }

    pub fn loader_jar_path(&self) -> PathBuf {
        self.data_dir().join(&self.loader_jar_name)
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.data_dir().join(&self.libraries_dir_name)
    }

    pub fn output_jar_path(&self) -> PathBuf {
        self.work_dir.join(&self.output_jar_name)
    }

    pub fn properties_path(&self) -> PathBuf {
        self.work_dir.join(&self.properties_file_name)
    }

    /// Server jar location relative to `work_dir`, always `/`-separated.
    pub fn server_jar_relative(&self) -> String {
        let root = self.data_root.replace('\\', "/");
        let root = root.trim_end_matches('/');
        if root.is_empty() {
            self.server_jar_name.clone()
        } else {
            format!("{}/{}", root, self.server_jar_name)
        }
    }

    /// Coordinate of the intermediary mappings for the target version.
    pub fn intermediary_coordinate(&self) -> String {
        format!(
            "{}:{}:{}",
            self.intermediary_group, self.intermediary_artifact, self.minecraft_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_layout() {
        let config = InstallerConfig::rooted_at(Path::new("/srv/mc"));
        assert_eq!(config.server_jar_path(), PathBuf::from("/srv/mc/.okyanus/server.jar"));
        assert_eq!(config.libraries_dir(), PathBuf::from("/srv/mc/.okyanus/libs"));
        assert_eq!(config.output_jar_path(), PathBuf::from("/srv/mc/server.jar"));
        assert_eq!(config.server_jar_relative(), ".okyanus/server.jar");
        assert_eq!(config.intermediary_coordinate(), "net.fabricmc:intermediary:1.14.3");
    }

    #[test]
    fn load_without_override_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = InstallerConfig::load(dir.path()).unwrap();
        assert_eq!(config.minecraft_version, "1.14.3");
        assert_eq!(config.work_dir, dir.path());
    }

    #[test]
    fn override_file_replaces_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "minecraft_version": "1.14.4", "fetch_concurrency": 4 }"#,
        )
        .unwrap();

        let config = InstallerConfig::load(dir.path()).unwrap();
        assert_eq!(config.minecraft_version, "1.14.4");
        assert_eq!(config.fetch_concurrency, 4);
        assert_eq!(config.loader_jar_name, "fabric-loader.jar");
    }

    #[test]
    fn malformed_override_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        let err = InstallerConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, InstallerError::InvalidConfig { .. }));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{ "fetch_concurrency": 0 }"#).unwrap();
        assert!(InstallerConfig::load(dir.path()).is_err());
    }

    #[test]
    fn empty_data_root_colliding_with_output_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{ "data_root": "" }"#).unwrap();
        let err = InstallerConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, InstallerError::InvalidConfig { .. }));
    }

    #[test]
    fn empty_data_root_with_distinct_output_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "data_root": "", "output_jar_name": "fabric-server.jar" }"#,
        )
        .unwrap();
        let config = InstallerConfig::load(dir.path()).unwrap();
        assert_ne!(config.server_jar_path(), config.output_jar_path());
        assert_eq!(config.server_jar_relative(), "server.jar");
    }

    #[test]
    fn loader_named_like_server_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{ "loader_jar_name": "server.jar" }"#)
            .unwrap();
        assert!(InstallerConfig::load(dir.path()).is_err());
    }
}
