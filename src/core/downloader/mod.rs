mod client;

pub use client::{CachePolicy, DownloadTask, Downloader, FetchOutcome};
