//! Basic Streaming Example
//!
//! This example demonstrates the most basic usage of xlsxstream:
//! writing a sheet row by row into an XLSX file.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example basic_stream -- output.xlsx 1000
//! ```
//!
//! If no arguments are provided, it writes 100 rows to `basic_stream.xlsx`.

use chrono::{Duration, TimeZone, Utc};
use xlsxstream::{CellValue, ColumnDefinition, XlsxStreamBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Get output file path from command line arguments or use default
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "basic_stream.xlsx".to_string());

    // Get row count from command line arguments or use default
    let row_count: u32 = match std::env::args().nth(2) {
        Some(n) => n.parse()?,
        None => 100,
    };

    println!("Writing {} rows to {}...", row_count, output_path);

    // Create a writer with a header row and column widths
    let mut writer = XlsxStreamBuilder::new()
        .with_columns(vec![
            ColumnDefinition::new(8.0),
            ColumnDefinition::default(),
            ColumnDefinition::new(22.0),
            ColumnDefinition::new(30.0),
        ])
        .with_cell_map(["id", "amount", "created", "link"])
        .on_finish(|path| println!("Finished: {}", path.display()))
        .create(&output_path)?;

    let base = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).single().ok_or("invalid base date")?;

    // Rows are streamed into the file as they are added
    for i in 1..=row_count {
        writer.add_row(&[
            CellValue::from(i),
            CellValue::number(f64::from(i) * 1.25),
            CellValue::date(base + Duration::hours(i64::from(i))),
            CellValue::hyperlink(format!("item {}", i), format!("https://example.com/items/{}", i)),
        ])?;
    }

    // Close the sheet; the completion callback runs after the file is flushed
    writer.finalize()?;

    Ok(())
}
