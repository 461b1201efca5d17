//! xlsxstream - Forward-only streaming writer for single-sheet XLSX workbooks
//!
//! This crate writes one worksheet row by row straight into a ZIP package, so
//! large tables can be exported without buffering the rows. Text is deduplicated into a shared strings table, dates become
//! serial day numbers with a date/time style, and hyperlink cells produce
//! external relationships.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsxstream::{CellValue, XlsxStreamBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a writer with default settings
//!     let mut writer = XlsxStreamBuilder::new().create("output.xlsx")?;
//!
//!     // Rows are written to the file as they are added
//!     writer.add_row(&[CellValue::text("name"), CellValue::text("score")])?;
//!     writer.add_row(&[CellValue::text("alice"), CellValue::number(91.5)])?;
//!
//!     // Close the sheet and write the remaining parts
//!     writer.finalize()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! For in-memory output, use `Cursor`:
//!
//! ```rust
//! use std::io::Cursor;
//! use xlsxstream::{CellValue, XlsxStreamBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = XlsxStreamBuilder::new().build(Cursor::new(Vec::new()))?;
//! writer.add_row(&["a".into(), CellValue::number(1.0)])?;
//! let xlsx_bytes: Vec<u8> = writer.finalize()?.into_inner();
//! assert!(!xlsx_bytes.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use xlsxstream::{ArchiveOptions, CellValue, ColumnDefinition, Compression, XlsxStreamBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut writer = XlsxStreamBuilder::new()
//!         .with_default_width(12.0)
//!         .with_columns(vec![ColumnDefinition::new(30.0), ColumnDefinition::default()])
//!         .with_cell_map(["link", "updated"])  // header row
//!         .with_archive_options(ArchiveOptions {
//!             compression: Compression::Deflated,
//!             compression_level: Some(6),
//!             large_file: false,
//!         })
//!         .on_finish(|path| println!("done: {}", path.display()))
//!         .create("links.xlsx")?;
//!
//!     writer.add_row(&[
//!         CellValue::hyperlink("docs.rs", "https://docs.rs"),
//!         CellValue::date(Utc::now()),
//!     ])?;
//!     writer.finalize()?;
//!
//!     Ok(())
//! }
//! ```

mod api;
mod builder;
mod date;
mod error;
mod limits;
mod package;
mod relationships;
mod serializer;
mod strings;
mod templates;
mod types;
mod writer;

// 公開API
pub use api::{ArchiveOptions, CellValue, ColumnDefinition, Compression};
pub use builder::{FileSheetWriter, XlsxStreamBuilder, DEFAULT_COLUMN_WIDTH};
pub use date::{from_epoch_days, max_date, min_date, to_epoch_days};
pub use error::XlsxStreamError;
pub use limits::{MAX_COLUMNS, MAX_ROWS};
pub use package::{MemoryPackage, PackageBuilder, ZipPackage};
pub use types::{cell_reference, column_letters};
pub use writer::{FinishCallback, SheetState, SheetStreamWriter};
