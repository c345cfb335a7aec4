pub mod fabric;

pub use fabric::{FabricResolver, LibraryEntry, LoaderRelease, LoaderVersion};
