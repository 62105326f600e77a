//! Titles, descriptions, and sidecar records for produced shorts.

mod composer;
mod sidecar;

pub use composer::{ComposedMetadata, MetadataComposer};
pub use sidecar::{sidecar_path, write_sidecar, ClipMetadata, OriginalVideoRecord, ShortRecord, METADATA_DIR};
