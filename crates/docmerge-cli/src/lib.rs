//! docmerge CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docmerge:
//! - Placeholders: List the `{{ name }}` markers of a template
//! - Extract: Write a spreadsheet with one column per placeholder
//! - Generate: Render one document per row into a ZIP archive
//!
//! # Library Usage
//!
//! ```ignore
//! use docmerge_cli::{extract_command, generate_command, OutputFormat};
//!
//! extract_command(&template, &schema, OutputFormat::Text)?;
//! generate_command(&template, &filled, &archive, &settings)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Step 1: spreadsheet to fill in
//! docmerge extract offer-letter.docx --output placeholders.xlsx
//!
//! # Step 2: one document per row
//! docmerge generate offer-letter.docx placeholders.xlsx --output documents.zip
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{
    apply_overrides, extract_command, generate_command, init_logging, load_settings,
    placeholders_command,
};
pub use app::{run_cli, CollisionArg, OutputFormat};
