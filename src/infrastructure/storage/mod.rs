//! Storage - 产物存储实现

mod artifact_store;

pub use artifact_store::FileArtifactStore;
