// ─── Okyanus Installer Core ───
// Bootstraps a Fabric server: resolves the vanilla server and the Fabric
// loader, then merges the loader with its libraries into one runnable jar.
//
// Architecture:
//   core/
//     maven/      — Coordinate parsing and repository paths
//     version/    — Mojang manifest + per-version metadata
//     loaders/    — Fabric meta API (stable loader, library list)
//     downloader/ — Cache-by-presence artifact fetcher
//     archive/    — Zip union-merge with manifest exclusion
//     pipeline/   — Orchestration and final touches
//     config.rs   — Immutable installer settings
//     http.rs     — HTTP client + transport seam

pub mod archive;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod loaders;
pub mod maven;
pub mod pipeline;
pub mod version;

#[cfg(test)]
pub(crate) mod test_support;
