// ─── Archive Merge ───
// Zip archives treated as small virtual file systems: a source yields its
// entries, the destination accepts writes and is committed once.

mod destination;
mod merge;
mod source;

pub use destination::{ArchiveDestination, OverwritePolicy, WriteEntryOutcome};
pub use merge::{merge_archives, ArchiveMerger, MergeStats};
pub use source::{ArchiveSource, EntryPayload, SourceEntry};

/// Entries whose path contains this marker are never copied, so the
/// destination keeps its own manifest.
pub const MANIFEST_MARKER: &str = "MANIFEST.MF";
