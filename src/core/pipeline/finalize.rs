// ─── Final touches ───
// Properties file, output rename and cleanup of intermediate files.

use std::path::Path;

use tracing::debug;

use crate::core::config::InstallerConfig;
use crate::core::error::{InstallerError, InstallerResult};

const SERVER_JAR_KEY: &str = "serverJar";

/// `serverJar=<relative path>`, always `/`-separated.
fn properties_contents(config: &InstallerConfig) -> String {
    format!("{}={}", SERVER_JAR_KEY, config.server_jar_relative())
}

pub async fn write_properties(config: &InstallerConfig) -> InstallerResult<()> {
    let path = config.properties_path();
    tokio::fs::write(&path, properties_contents(config))
        .await
        .map_err(|e| InstallerError::io(&path, e))?;
    debug!("Wrote {:?}", path);
    Ok(())
}

/// Move the merged loader archive to the final output name, replacing any
/// previous output.
pub async fn promote_output(loader: &Path, output: &Path) -> InstallerResult<()> {
    if tokio::fs::metadata(output).await.is_ok() {
        tokio::fs::remove_file(output)
            .await
            .map_err(|e| InstallerError::io(output, e))?;
    }
    tokio::fs::rename(loader, output)
        .await
        .map_err(|e| InstallerError::io(output, e))?;
    debug!("Renamed {:?} -> {:?}", loader, output);
    Ok(())
}

/// Remove the libraries directory and any leftover loader archive.
pub async fn cleanup(config: &InstallerConfig) -> InstallerResult<()> {
    let libs = config.libraries_dir();
    if tokio::fs::metadata(&libs).await.is_ok() {
        tokio::fs::remove_dir_all(&libs)
            .await
            .map_err(|e| InstallerError::io(&libs, e))?;
    }

    let loader = config.loader_jar_path();
    if tokio::fs::metadata(&loader).await.is_ok() {
        tokio::fs::remove_file(&loader)
            .await
            .map_err(|e| InstallerError::io(&loader, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_use_forward_slashes() {
        let mut config = InstallerConfig::rooted_at(Path::new("."));
        config.data_root = ".okyanus\\data".to_string();
        assert_eq!(properties_contents(&config), "serverJar=.okyanus/data/server.jar");
    }

    #[tokio::test]
    async fn promote_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let loader = dir.path().join("fabric-loader.jar");
        let output = dir.path().join("server.jar");
        std::fs::write(&loader, b"new").unwrap();
        std::fs::write(&output, b"old").unwrap();

        promote_output(&loader, &output).await.unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), b"new");
        assert!(!loader.exists());
    }

    #[tokio::test]
    async fn cleanup_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = InstallerConfig::rooted_at(dir.path());
        cleanup(&config).await.unwrap();

        std::fs::create_dir_all(config.libraries_dir().join("x")).unwrap();
        std::fs::write(config.loader_jar_path(), b"l").unwrap();
        cleanup(&config).await.unwrap();

        assert!(!config.libraries_dir().exists());
        assert!(!config.loader_jar_path().exists());
    }
}
