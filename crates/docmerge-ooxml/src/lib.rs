//! # docmerge-ooxml
//!
//! OOXML (Office Open XML) handling for docmerge.
//!
//! This crate provides functionality to:
//! - Read and write DOCX/DOTX packages
//! - Find `{{ placeholder }}` markers in the document body, headers and footers
//! - Render a record's values into a template with `minijinja`
//!
//! ## Example: Listing Placeholders
//!
//! ```no_run
//! use docmerge_ooxml::DocxTemplate;
//!
//! let template = DocxTemplate::load("offer-letter.docx")?;
//! for name in template.placeholders()? {
//!     println!("{}", name);
//! }
//! # Ok::<(), docmerge_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod error;
pub mod placeholder;
pub mod template;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use archive::{OoxmlArchive, DOCUMENT_PART};
pub use error::{OoxmlError, Result};
pub use template::{DocxTemplate, MissingValuePolicy};

/// File extension of rendered documents
pub const DOCX_EXTENSION: &str = "docx";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
