use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::destination::{ArchiveDestination, OverwritePolicy, WriteEntryOutcome};
use super::source::ArchiveSource;
use super::MANIFEST_MARKER;
use crate::core::error::{InstallerError, InstallerResult};

/// Per-merge counters, reported once the destination is committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub sources: usize,
    pub written: usize,
    pub skipped_duplicate: usize,
    pub skipped_empty: usize,
    pub excluded_manifest: usize,
}

/// Union-mounts library archives onto the loader archive: later sources
/// shadow earlier ones at identical paths.
pub struct ArchiveMerger {
    destination: ArchiveDestination,
    stats: MergeStats,
}

impl ArchiveMerger {
    pub fn open(destination: &Path) -> InstallerResult<Self> {
        Ok(Self {
            destination: ArchiveDestination::open(destination)?,
            stats: MergeStats::default(),
        })
    }

    /// Copy every non-manifest entry of `source` into the destination.
    /// The source is closed before returning, whatever the outcome.
    pub fn merge_source(&mut self, source: &Path) -> InstallerResult<()> {
        let mut archive = ArchiveSource::open(source)?;
        debug!("Applying {:?} ({} entries)", source, archive.len());

        for entry in archive.entries()? {
            let entry = entry?;

            if entry.path.contains(MANIFEST_MARKER) {
                self.stats.excluded_manifest += 1;
                continue;
            }

            match self
                .destination
                .write_entry(&entry.path, entry.payload, OverwritePolicy::Replace)
            {
                WriteEntryOutcome::Written => self.stats.written += 1,
                WriteEntryOutcome::SkippedDuplicate => self.stats.skipped_duplicate += 1,
                WriteEntryOutcome::SkippedEmpty => self.stats.skipped_empty += 1,
                WriteEntryOutcome::Failed(reason) => {
                    return Err(InstallerError::ArchiveCopy {
                        archive: source.to_path_buf(),
                        entry: entry.path,
                        reason,
                    });
                }
            }
        }

        self.stats.sources += 1;
        Ok(())
    }

    /// Commit the destination and release it.
    pub fn finish(self) -> InstallerResult<MergeStats> {
        let path = self.destination.path().to_path_buf();
        self.destination.commit()?;
        info!(
            "Merged {} archives into {:?}: {} written, {} duplicates, {} manifests excluded",
            self.stats.sources,
            path,
            self.stats.written,
            self.stats.skipped_duplicate,
            self.stats.excluded_manifest
        );
        Ok(self.stats)
    }
}

/// Merge `sources`, in order, into `destination`.
pub fn merge_archives(destination: &Path, sources: &[PathBuf]) -> InstallerResult<MergeStats> {
    let mut merger = ArchiveMerger::open(destination)?;
    for source in sources {
        merger.merge_source(source)?;
    }
    merger.finish()
}
