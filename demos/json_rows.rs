//! JSON Rows Example
//!
//! This example converts a JSON document into an XLSX sheet. The input is an
//! object with optional `columns` (column definitions), optional `header`
//! (header labels) and `rows` (arrays of JSON values):
//!
//! ```json
//! {
//!   "columns": [{"width": 12}, {}, {"width": 40}],
//!   "header": ["id", "name", "homepage"],
//!   "rows": [
//!     [1, "alice", {"text": "site", "url": "https://example.com/alice"}],
//!     [2, "bob", null]
//!   ]
//! }
//! ```
//!
//! An object with `text` and `url` keys becomes a hyperlink cell.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example json_rows -- input.json output.xlsx
//! cargo run --example json_rows -- - output.xlsx < input.json
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::process;
use xlsxstream::{CellValue, ColumnDefinition, XlsxStreamBuilder, XlsxStreamError};

/// 入力ドキュメント
#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    columns: Vec<ColumnDefinition>,
    #[serde(default)]
    header: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// `{"text": ..., "url": ...}`はハイパーリンク、それ以外はそのまま変換
fn to_cell(value: &Value) -> CellValue {
    if let Value::Object(map) = value {
        if let (Some(text), Some(Value::String(url))) = (map.get("text"), map.get("url")) {
            return CellValue::hyperlink(CellValue::from(text), url.as_str());
        }
    }
    CellValue::from(value)
}

fn convert(document: &Document, output_path: &str) -> Result<u32, XlsxStreamError> {
    let mut writer = XlsxStreamBuilder::new()
        .with_columns(document.columns.clone())
        .with_cell_map(document.header.iter().cloned())
        .create(output_path)?;

    for row in &document.rows {
        let cells: Vec<CellValue> = row.iter().map(to_cell).collect();
        writer.add_row(&cells)?;
    }

    let rows = writer.rows_written();
    writer.finalize()?;
    Ok(rows)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <input.json | -> <output.xlsx>", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} data.json data.xlsx", args[0]);
        eprintln!("  {} - data.xlsx < data.json", args[0]);
        process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];

    // Read the JSON document
    let reader: Box<dyn Read> = if input_path == "-" {
        Box::new(io::stdin())
    } else {
        match File::open(input_path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("Error: Could not open input file '{}': {}", input_path, e);
                process::exit(1);
            }
        }
    };

    let document: Document = match serde_json::from_reader(reader) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: Invalid JSON document: {}", e);
            process::exit(1);
        }
    };

    match convert(&document, output_path) {
        Ok(rows) => println!("Wrote {} rows to {}", rows, output_path),
        Err(e) => {
            eprintln!("Error: {}", e);
            match e {
                XlsxStreamError::Validation { .. } => {
                    eprintln!("  Hint: check the row values (finite numbers, non-empty links)")
                }
                XlsxStreamError::Config(_) => {
                    eprintln!("  Hint: column widths must be positive numbers")
                }
                _ => {}
            }
            process::exit(1);
        }
    }
}
