//! Filesystem backend for the session engine: one JSON sidecar per
//! document, library directory enumeration, and raw document bytes.

mod library;
mod sidecar;
mod source;

pub use sidecar::{DOCUMENT_SUFFIX, FsConfigStore, SIDECAR_EXTENSION, StoreError, derive_sidecar_path};
pub use source::FsDocumentSource;
