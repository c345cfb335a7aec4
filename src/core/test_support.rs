//! In-memory transport and zip fixtures shared by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use zip::write::SimpleFileOptions;

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::Transport;

/// Serves canned bodies by exact URL and records every request.
/// Unknown URLs answer like a 404.
#[derive(Default)]
pub struct StubTransport {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, url: &str, json: &str) -> Self {
        self.with_bytes(url, json.as_bytes().to_vec())
    }

    pub fn with_bytes(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests_for(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    fn lookup(&self, url: &str) -> InstallerResult<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| InstallerError::DownloadFailed {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get_bytes(&self, url: &str) -> InstallerResult<Vec<u8>> {
        self.lookup(url)
    }

    async fn stream_to(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> InstallerResult<u64> {
        let body = self.lookup(url)?;
        sink.write_all(&body).await.unwrap();
        Ok(body.len() as u64)
    }
}

/// Build an in-memory zip from `(name, contents)` pairs. Names ending in `/`
/// become directory entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, zip_bytes(entries)).unwrap();
}

/// Read every file entry of a zip into a sorted map (directories omitted).
pub fn read_zip(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut out = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        if entry.is_dir() {
            continue;
        }
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        out.insert(entry.name().to_string(), bytes);
    }
    out
}

/// Entry names in central-directory order, directories included.
pub fn zip_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index_raw(i).unwrap().name().to_string())
        .collect()
}
