//! docmerge-core - Word mail merge from a spreadsheet
//!
//! Core library for docmerge. A merge runs in two steps:
//!
//! 1. [`extract_placeholders`] lists the `{{ name }}` markers of a DOCX
//!    template and [`export_schema`] turns them into a workbook header for
//!    the user to fill in.
//! 2. [`generate_documents`] renders the template once per filled-in row
//!    and bundles the results into a ZIP archive.
//!
//! # Example
//!
//! ```no_run
//! use docmerge_core::{extract_placeholders, generate_documents, MergeSettings};
//! use docmerge_data::DataEngine;
//!
//! let template = std::fs::read("offer-letter.docx")?;
//! println!("{:?}", extract_placeholders(&template)?);
//!
//! let table = DataEngine::read_records("candidates.xlsx", None)?;
//! let bundle = generate_documents(&template, &table, MergeSettings::default())?;
//! std::fs::write("documents.zip", bundle.to_zip_bytes()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod batch;
pub mod bundle;
pub mod config;
pub mod error;
pub mod extract;
pub mod filename;

// Re-export main types and functions
pub use batch::{build_context, generate_documents, BatchRenderer, RenderContext};
pub use bundle::{DocumentBundle, ZIP_MIME};
pub use config::{
    CollisionPolicy, MergeSettings, MissingValuePolicy, OutputSettings, CONFIG_FILE_NAME,
    DEFAULT_NAME_COLUMN,
};
pub use error::{MergeError, Result};
pub use extract::{export_schema, extract_placeholders};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
