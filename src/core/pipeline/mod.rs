// ─── Install Pipeline ───
// base server → loader → libraries → fetch → merge → final touches.
// Strictly linear; the first error aborts the run and nothing is rolled back.

mod finalize;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::core::archive::{merge_archives, MergeStats};
use crate::core::config::InstallerConfig;
use crate::core::downloader::{DownloadTask, Downloader, FetchOutcome};
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::Transport;
use crate::core::loaders::{FabricResolver, LibraryEntry};
use crate::core::version;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub server_jar: PathBuf,
    pub output_jar: PathBuf,
    pub properties_file: PathBuf,
    /// Library archives merged into the output, intermediary mappings included.
    pub libraries: usize,
    pub merge: MergeStats,
}

pub struct InstallPipeline {
    config: InstallerConfig,
    transport: Arc<dyn Transport>,
    downloader: Downloader,
    fabric: FabricResolver,
}

impl InstallPipeline {
    pub fn new(config: InstallerConfig, transport: Arc<dyn Transport>) -> Self {
        let downloader =
            Downloader::new(transport.clone()).with_concurrency(config.fetch_concurrency);
        let fabric = FabricResolver::new(
            transport.clone(),
            &config.loader_versions_url,
            &config.loader_maven_root,
        );

        Self {
            config,
            transport,
            downloader,
            fabric,
        }
    }

    pub async fn run(&self) -> InstallerResult<InstallReport> {
        let data_dir = self.config.data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| InstallerError::io(&data_dir, e))?;

        // 1. Base server
        self.ensure_server_jar().await?;

        // 2. Loader
        info!("Getting Fabric data");
        let release = self.fabric.resolve_loader().await?;
        let loader_jar = self.config.loader_jar_path();
        if self
            .downloader
            .fetch(&DownloadTask::cached(&release.jar_url, &loader_jar))
            .await?
            != FetchOutcome::Cached
        {
            info!("Downloaded Fabric loader {}", release.coordinate);
        }

        // 3 + 4. Libraries, intermediary mappings last and always refreshed
        info!("Getting loader library data");
        let libraries = self.fabric.libraries(&release).await?;
        let mut tasks = self.library_tasks(&libraries)?;
        tasks.push(self.intermediary_task()?);

        info!("Downloading {} libraries", tasks.len());
        let outcomes = self.downloader.fetch_all(&tasks).await?;
        let downloaded = outcomes
            .iter()
            .filter(|o| matches!(o, FetchOutcome::Downloaded { .. }))
            .count();
        info!(
            "{} libraries downloaded, {} already cached",
            downloaded,
            outcomes.len() - downloaded
        );

        // 5. Merge in metadata order
        info!("Applying libraries");
        let sources: Vec<PathBuf> = tasks.into_iter().map(|t| t.dest).collect();
        let merge = merge_archives(&loader_jar, &sources)?;

        // 6-8. Final touches
        info!("Final touches");
        finalize::write_properties(&self.config).await?;
        let output_jar = self.config.output_jar_path();
        finalize::promote_output(&loader_jar, &output_jar).await?;
        finalize::cleanup(&self.config).await?;

        Ok(InstallReport {
            server_jar: self.config.server_jar_path(),
            output_jar,
            properties_file: self.config.properties_path(),
            libraries: sources.len(),
            merge,
        })
    }

    /// Download the vanilla server unless it is already cached. The metadata
    /// chain is only walked when the file is missing.
    async fn ensure_server_jar(&self) -> InstallerResult<()> {
        let server_jar = self.config.server_jar_path();
        if tokio::fs::metadata(&server_jar)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            info!("Minecraft server {} already present", self.config.minecraft_version);
            return Ok(());
        }

        info!("Getting Minecraft data");
        let url = version::resolve_server_url(
            self.transport.as_ref(),
            &self.config.version_manifest_url,
            &self.config.minecraft_version,
        )
        .await?;

        info!(
            "Downloading the Minecraft server for {}",
            self.config.minecraft_version
        );
        self.downloader
            .fetch(&DownloadTask::cached(url, server_jar))
            .await?;
        Ok(())
    }

    fn library_tasks(&self, libraries: &[LibraryEntry]) -> InstallerResult<Vec<DownloadTask>> {
        let libs_dir = self.config.libraries_dir();
        libraries
            .iter()
            .map(|lib| {
                let coordinate = lib.coordinate()?;
                Ok(DownloadTask::cached(
                    coordinate.url(&lib.download_root, "jar"),
                    libs_dir.join(coordinate.local_path()),
                ))
            })
            .collect()
    }

    fn intermediary_task(&self) -> InstallerResult<DownloadTask> {
        let lib = self
            .fabric
            .intermediary(&self.config.intermediary_coordinate());
        let coordinate = lib.coordinate()?;
        Ok(DownloadTask::refreshed(
            coordinate.url(&lib.download_root, "jar"),
            self.config.libraries_dir().join(coordinate.local_path()),
        ))
    }
}
