use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::core::error::{InstallerError, InstallerResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPayload {
    File(Vec<u8>),
    Directory,
}

/// One entry read out of a source archive.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Name as stored in the archive (`/`-separated, directories end in `/`).
    pub path: String,
    pub payload: EntryPayload,
}

/// A read-only archive opened for merging. The file handle is released when
/// the value is dropped.
pub struct ArchiveSource {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl ArchiveSource {
    pub fn open(path: &Path) -> InstallerResult<Self> {
        let file = File::open(path).map_err(|e| InstallerError::io(path, e))?;
        let archive = ZipArchive::new(file)?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.archive.len()
    }

    /// Lazy, single-pass walk over every entry in pre-order depth-first order:
    /// a directory comes before its children and siblings are sorted by name.
    pub fn entries(&mut self) -> InstallerResult<SourceEntries<'_>> {
        let mut order: Vec<(usize, Vec<String>)> = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let name = self.archive.by_index_raw(index)?.name().to_string();
            order.push((index, path_components(&name)));
        }
        order.sort_by(|(ia, a), (ib, b)| a.cmp(b).then(ia.cmp(ib)));

        Ok(SourceEntries {
            archive: &mut self.archive,
            path: &self.path,
            order: order
                .into_iter()
                .map(|(index, _)| index)
                .collect::<Vec<_>>()
                .into_iter(),
        })
    }
}

fn path_components(name: &str) -> Vec<String> {
    name.split('/')
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct SourceEntries<'a> {
    archive: &'a mut ZipArchive<File>,
    path: &'a Path,
    order: std::vec::IntoIter<usize>,
}

impl Iterator for SourceEntries<'_> {
    type Item = InstallerResult<SourceEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.order.next()?;
        Some(read_entry(self.archive, self.path, index))
    }
}

fn read_entry(
    archive: &mut ZipArchive<File>,
    archive_path: &Path,
    index: usize,
) -> InstallerResult<SourceEntry> {
    let mut entry = archive.by_index(index)?;
    let path = entry.name().to_string();

    if entry.is_dir() {
        return Ok(SourceEntry {
            path,
            payload: EntryPayload::Directory,
        });
    }

    // The declared size is untrusted; let the buffer grow with what is read.
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| InstallerError::ArchiveCopy {
            archive: archive_path.to_path_buf(),
            entry: path.clone(),
            reason: e.to_string(),
        })?;

    Ok(SourceEntry {
        path,
        payload: EntryPayload::File(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::write_zip;

    #[test]
    fn entries_walk_parents_before_children() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.jar");
        write_zip(
            &path,
            &[
                ("b/z.class", b"z"),
                ("a/", b""),
                ("b/", b""),
                ("a/x.class", b"x"),
                ("a.txt", b"t"),
            ],
        );

        let mut source = ArchiveSource::open(&path).unwrap();
        let names: Vec<String> = source.entries().unwrap().map(|e| e.unwrap().path).collect();

        assert_eq!(names, ["a/", "a/x.class", "a.txt", "b/", "b/z.class"]);
    }

    #[test]
    fn file_payloads_carry_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.jar");
        write_zip(&path, &[("dir/", b""), ("dir/f.bin", b"payload")]);

        let mut source = ArchiveSource::open(&path).unwrap();
        let entries: Vec<SourceEntry> = source.entries().unwrap().map(Result::unwrap).collect();

        assert_eq!(entries[0].payload, EntryPayload::Directory);
        assert_eq!(entries[1].payload, EntryPayload::File(b"payload".to_vec()));
    }

    #[test]
    fn opening_a_non_archive_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not.jar");
        std::fs::write(&path, b"plain text").unwrap();
        assert!(ArchiveSource::open(&path).is_err());
    }
}
