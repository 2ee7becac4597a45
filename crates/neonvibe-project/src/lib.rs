//! Project reconstruction for NeonVibe.
//!
//! Turns the raw text a model streams back into a set of named files and
//! folds those files into one self-contained preview document:
//! - [`extract`] recovers `<file name="...">` blocks from a partial buffer
//! - [`merge_files`] applies one tick's extraction onto the session's map
//! - [`bundle`] inlines local stylesheets and scripts into `index.html`
//! - [`export`] writes a finished file map to a zip archive or a directory
//!
//! Extraction and bundling never fail: input they cannot interpret yields
//! fewer files or an empty preview.

pub mod bundle;
pub mod export;
pub mod extract;
pub mod files;

pub use bundle::{bundle, ENTRY_POINT};
pub use extract::extract;
pub use files::merge_files;
pub use neonvibe_common::FileMap;
