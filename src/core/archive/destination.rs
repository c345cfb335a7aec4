use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::source::EntryPayload;
use crate::core::error::{InstallerError, InstallerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Last writer wins.
    Replace,
    /// An existing entry at the same path is kept.
    KeepExisting,
}

/// Result of a single [`ArchiveDestination::write_entry`] call. Only
/// `Failed` is fatal for a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteEntryOutcome {
    Written,
    /// The path already exists and cannot be replaced (directories, or files
    /// under [`OverwritePolicy::KeepExisting`]).
    SkippedDuplicate,
    /// The entry resolves to the archive root itself.
    SkippedEmpty,
    Failed(String),
}

/// The merge target. Writes are staged in memory; the archive on disk is
/// only rewritten by [`ArchiveDestination::commit`].
pub struct ArchiveDestination {
    path: PathBuf,
    base: ZipArchive<File>,
    base_names: HashSet<String>,
    staged: Vec<(String, EntryPayload)>,
    staged_index: HashMap<String, usize>,
}

impl ArchiveDestination {
    pub fn open(path: &Path) -> InstallerResult<Self> {
        let file = File::open(path).map_err(|e| InstallerError::io(path, e))?;
        let mut base = ZipArchive::new(file)?;

        let mut base_names = HashSet::with_capacity(base.len());
        for index in 0..base.len() {
            base_names.insert(base.by_index_raw(index)?.name().to_string());
        }

        Ok(Self {
            path: path.to_path_buf(),
            base,
            base_names,
            staged: Vec::new(),
            staged_index: HashMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if an entry with this exact stored name exists or has been staged.
    fn contains(&self, name: &str) -> bool {
        self.base_names.contains(name) || self.staged_index.contains_key(name)
    }

    pub fn write_entry(
        &mut self,
        path: &str,
        payload: EntryPayload,
        policy: OverwritePolicy,
    ) -> WriteEntryOutcome {
        let name = match normalize_entry_name(path, &payload) {
            Ok(Some(name)) => name,
            Ok(None) => return WriteEntryOutcome::SkippedEmpty,
            Err(reason) => return WriteEntryOutcome::Failed(reason),
        };

        if self.contains(&name) {
            let replaceable =
                matches!(payload, EntryPayload::File(_)) && policy == OverwritePolicy::Replace;
            if !replaceable {
                return WriteEntryOutcome::SkippedDuplicate;
            }
        }

        match self.staged_index.get(&name) {
            Some(&index) => self.staged[index].1 = payload,
            None => {
                self.staged_index.insert(name.clone(), self.staged.len());
                self.staged.push((name, payload));
            }
        }

        WriteEntryOutcome::Written
    }

    /// Rewrite the archive with every staged write applied, then release it.
    ///
    /// Untouched entries are raw-copied in their original order, replaced
    /// entries keep their position and new entries are appended.
    pub fn commit(self) -> InstallerResult<()> {
        let ArchiveDestination {
            path,
            mut base,
            staged,
            staged_index,
            ..
        } = self;

        let temp = temp_path(&path);
        let result = write_merged(&temp, &mut base, &staged, &staged_index);
        drop(base);

        if let Err(e) = result {
            let _ = std::fs::remove_file(&temp);
            return Err(e);
        }

        std::fs::rename(&temp, &path).map_err(|e| InstallerError::io(&path, e))?;
        debug!("Committed {} staged entries into {:?}", staged.len(), path);
        Ok(())
    }
}

fn write_merged(
    temp: &Path,
    base: &mut ZipArchive<File>,
    staged: &[(String, EntryPayload)],
    staged_index: &HashMap<String, usize>,
) -> InstallerResult<()> {
    let out = File::create(temp).map_err(|e| InstallerError::io(temp, e))?;
    let mut writer = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut written: HashSet<String> = HashSet::new();

    for index in 0..base.len() {
        let entry = base.by_index_raw(index)?;
        let name = entry.name().to_string();
        if !written.insert(name.clone()) {
            continue;
        }

        match staged_index.get(&name) {
            Some(&staged_at) => {
                drop(entry);
                let (_, payload) = &staged[staged_at];
                write_payload(&mut writer, &name, payload, options, temp)?;
            }
            None => writer.raw_copy_file(entry)?,
        }
    }

    for (name, payload) in staged {
        if written.insert(name.clone()) {
            write_payload(&mut writer, name, payload, options, temp)?;
        }
    }

    writer.finish()?;
    Ok(())
}

fn write_payload(
    writer: &mut ZipWriter<File>,
    name: &str,
    payload: &EntryPayload,
    options: SimpleFileOptions,
    temp: &Path,
) -> InstallerResult<()> {
    match payload {
        EntryPayload::Directory => writer.add_directory(name, options)?,
        EntryPayload::File(bytes) => {
            writer.start_file(name, options)?;
            writer
                .write_all(bytes)
                .map_err(|e| InstallerError::io(temp, e))?;
        }
    }
    Ok(())
}

/// Strip the root, drop `.` and empty segments, reject `..`.
/// `Ok(None)` means the entry is the root itself.
fn normalize_entry_name(path: &str, payload: &EntryPayload) -> Result<Option<String>, String> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(format!("entry {path:?} escapes the archive root")),
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Ok(None);
    }

    let mut name = segments.join("/");
    if matches!(payload, EntryPayload::Directory) {
        name.push('/');
    }
    Ok(Some(name))
}

fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".merging");
    PathBuf::from(name)
}
