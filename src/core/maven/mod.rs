mod artifact;

pub use artifact::{ArtifactCoordinate, ResolvedPath};

/// Maven repository hosting the Fabric loader and intermediary mappings.
pub const FABRIC_MAVEN: &str = "https://maven.fabricmc.net";
