//! Integration Tests for xlsxstream
//!
//! 生成したパッケージをZIPとして開き、各パートの内容と、
//! `calamine`で読み戻した値を検証します。

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use chrono::{TimeZone, Utc};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};
use xlsxstream::{
    ArchiveOptions, CellValue, ColumnDefinition, Compression, XlsxStreamBuilder, XlsxStreamError,
};

// テスト用ヘルパー
mod helpers {
    use super::*;
    use zip::ZipArchive;

    /// 行を書き込んでXLSXのバイト列を返す
    pub fn write_rows(rows: &[Vec<CellValue>]) -> Vec<u8> {
        let mut writer = XlsxStreamBuilder::new()
            .build(Cursor::new(Vec::new()))
            .unwrap();
        writer.add_rows(rows).unwrap();
        writer.finalize().unwrap().into_inner()
    }

    /// パッケージ内のエントリを文字列として読み出す
    pub fn read_part(xlsx: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(xlsx)).unwrap();
        let mut part = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut part)
            .unwrap();
        part
    }

    /// パッケージ内のエントリ名（格納順）
    pub fn part_names(xlsx: &[u8]) -> Vec<String> {
        let mut archive = ZipArchive::new(Cursor::new(xlsx)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    /// calamineで"Sheet1"を読み込む
    pub fn read_sheet(xlsx: Vec<u8>) -> calamine::Range<Data> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(xlsx)).unwrap();
        workbook.worksheet_range("Sheet1").unwrap()
    }

    /// 数値または日時セルの値
    pub fn serial(cell: Option<&Data>) -> f64 {
        match cell {
            Some(Data::Float(f)) => *f,
            Some(Data::Int(i)) => *i as f64,
            Some(Data::DateTime(dt)) => dt.as_f64(),
            other => panic!("Expected numeric cell, got {:?}", other),
        }
    }

    /// 文字列セルの値
    pub fn text(cell: Option<&Data>) -> &str {
        match cell {
            Some(Data::String(s)) => s,
            other => panic!("Expected string cell, got {:?}", other),
        }
    }
}

use helpers::*;

// ============================================================================
// パッケージ構造
// ============================================================================

#[test]
fn test_package_contains_all_parts() {
    let xlsx = write_rows(&[vec![CellValue::text("a")]]);
    let names = part_names(&xlsx);

    for expected in [
        "[Content_Types].xml",
        "_rels/.rels",
        "xl/workbook.xml",
        "xl/styles.xml",
        "xl/_rels/workbook.xml.rels",
        "xl/worksheets/sheet1.xml",
        "xl/worksheets/_rels/sheet1.xml.rels",
        "xl/sharedStrings.xml",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {}", expected);
    }
    assert_eq!(names.len(), 8);
}

#[test]
fn test_sheet_sections_are_in_order() {
    let mut writer = XlsxStreamBuilder::new()
        .build(Cursor::new(Vec::new()))
        .unwrap();
    writer
        .define_columns(&[ColumnDefinition::new(20.0)])
        .unwrap();
    writer.set_cell_map(["link"]);
    writer
        .add_row(&[CellValue::hyperlink("click", "http://x")])
        .unwrap();
    let xlsx = writer.finalize().unwrap().into_inner();

    let sheet = read_part(&xlsx, "xl/worksheets/sheet1.xml");
    let positions: Vec<usize> = [
        "<worksheet",
        "<cols>",
        "<sheetData>",
        r#"<row r="1">"#,
        r#"<row r="2">"#,
        "</sheetData>",
        "<hyperlinks>",
        "<pageMargins",
        "</worksheet>",
    ]
    .iter()
    .map(|marker| sheet.find(marker).unwrap_or_else(|| panic!("missing {}", marker)))
    .collect();

    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", sheet);
    assert_eq!(sheet.matches("<sheetData>").count(), 1);
}

// ============================================================================
// 読み戻し（calamine）
// ============================================================================

#[test]
fn test_values_round_trip_through_reader() {
    let date = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    let xlsx = write_rows(&[
        vec![CellValue::text("name"), CellValue::text("score"), CellValue::text("at")],
        vec![CellValue::text("alice"), CellValue::number(91.5), CellValue::date(date)],
        vec![CellValue::text("bob"), CellValue::from(-3i32), CellValue::date(date)],
    ]);

    let range = read_sheet(xlsx);
    assert_eq!(text(range.get_value((0, 0))), "name");
    assert_eq!(text(range.get_value((1, 0))), "alice");
    assert_eq!(serial(range.get_value((1, 1))), 91.5);
    assert_eq!(serial(range.get_value((1, 2))), 45658.5);
    assert_eq!(text(range.get_value((2, 0))), "bob");
    assert_eq!(serial(range.get_value((2, 1))), -3.0);
}

#[test]
fn test_header_row_is_first_row() {
    let mut writer = XlsxStreamBuilder::new()
        .with_cell_map(["id", "name"])
        .build(Cursor::new(Vec::new()))
        .unwrap();
    writer
        .add_row(&[CellValue::number(1.0), CellValue::text("alice")])
        .unwrap();
    let xlsx = writer.finalize().unwrap().into_inner();

    let range = read_sheet(xlsx);
    assert_eq!(text(range.get_value((0, 0))), "id");
    assert_eq!(text(range.get_value((0, 1))), "name");
    assert_eq!(serial(range.get_value((1, 0))), 1.0);
    assert_eq!(text(range.get_value((1, 1))), "alice");
}

#[test]
fn test_special_characters_round_trip() {
    let values = ["<A & B>", "say \"hi\"", "日本語テキスト", "emoji 🎉", " padded "];
    let row: Vec<CellValue> = values.iter().map(|v| CellValue::text(*v)).collect();
    let xlsx = write_rows(&[row]);

    let strings = read_part(&xlsx, "xl/sharedStrings.xml");
    assert!(strings.contains("<t>&lt;A &amp; B&gt;</t>"));
    assert!(!strings.contains("&amp;amp;"));
    assert!(strings.contains(r#"<t xml:space="preserve"> padded </t>"#));

    let range = read_sheet(xlsx);
    for (col, expected) in values.iter().enumerate() {
        assert_eq!(text(range.get_value((0, col as u32))), *expected);
    }
}

#[test]
fn test_control_characters_are_encoded() {
    let xlsx = write_rows(&[vec![
        CellValue::text("bell\u{1}char"),
        CellValue::text("form\u{C}feed"),
        CellValue::text("literal _x0041_"),
    ]]);

    let strings = read_part(&xlsx, "xl/sharedStrings.xml");
    assert!(strings.contains("<t>bell_x0001_char</t>"));
    assert!(strings.contains("<t>form_x000C_feed</t>"));
    assert!(strings.contains("<t>literal _x005F_x0041_</t>"));
    assert!(
        !strings
            .chars()
            .any(|c| c < ' ' && !matches!(c, '\t' | '\n' | '\r')),
        "raw control character in {:?}",
        strings
    );
}

#[test]
fn test_control_character_in_link_target_is_rejected() {
    let mut writer = XlsxStreamBuilder::new()
        .build(Cursor::new(Vec::new()))
        .unwrap();
    match writer.add_row(&[CellValue::hyperlink("go", "https://example.com/\u{7}")]) {
        Err(XlsxStreamError::Validation { cell, message }) => {
            assert_eq!(cell, "A1");
            assert!(message.contains("U+0007"), "{}", message);
        }
        other => panic!("Expected Validation error, got {:?}", other),
    }
    assert_eq!(writer.rows_written(), 0);
}

#[test]
fn test_stored_archive_is_readable() {
    let mut writer = XlsxStreamBuilder::new()
        .with_archive_options(ArchiveOptions {
            compression: Compression::Stored,
            ..ArchiveOptions::default()
        })
        .build(Cursor::new(Vec::new()))
        .unwrap();
    writer.add_row(&[CellValue::text("stored")]).unwrap();
    let xlsx = writer.finalize().unwrap().into_inner();

    let range = read_sheet(xlsx);
    assert_eq!(text(range.get_value((0, 0))), "stored");
}

#[test]
fn test_empty_sheet_is_readable() {
    let mut writer = XlsxStreamBuilder::new()
        .build(Cursor::new(Vec::new()))
        .unwrap();
    let xlsx = writer.finalize().unwrap().into_inner();

    let sheet = read_part(&xlsx, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<sheetData/>"));

    let range = read_sheet(xlsx);
    assert!(range.is_empty());
}

// ============================================================================
// 共有文字列とハイパーリンク
// ============================================================================

#[test]
fn test_shared_strings_are_deduplicated() {
    let xlsx = write_rows(&[
        vec![CellValue::text("a"), CellValue::text("b")],
        vec![CellValue::text("a"), CellValue::text("c")],
    ]);

    let strings = read_part(&xlsx, "xl/sharedStrings.xml");
    assert!(strings.contains(r#"count="4" uniqueCount="3""#));
    assert!(strings.contains("<si><t>a</t></si><si><t>b</t></si><si><t>c</t></si>"));

    let sheet = read_part(&xlsx, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<c r="A2" t="s"><v>0</v></c>"#));
    assert!(sheet.contains(r#"<c r="B2" t="s"><v>2</v></c>"#));
}

#[test]
fn test_hyperlink_cell() {
    let xlsx = write_rows(&[
        vec![CellValue::text("before")],
        vec![
            CellValue::Empty,
            CellValue::hyperlink("click", "http://x/?a=1&b=2"),
        ],
    ]);

    let sheet = read_part(&xlsx, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<hyperlink ref="B2" r:id="rId1"/>"#));
    assert_eq!(sheet.matches("<hyperlink ").count(), 1);

    let rels = read_part(&xlsx, "xl/worksheets/_rels/sheet1.xml.rels");
    assert!(rels.contains(r#"Id="rId1""#));
    assert!(rels.contains(r#"Target="http://x/?a=1&amp;b=2""#));
    assert!(rels.contains(r#"TargetMode="External""#));

    let range = read_sheet(xlsx);
    assert_eq!(text(range.get_value((1, 1))), "click");
}

#[test]
fn test_relationships_part_without_links() {
    let xlsx = write_rows(&[vec![CellValue::text("plain")]]);
    let rels = read_part(&xlsx, "xl/worksheets/_rels/sheet1.xml.rels");
    assert!(rels.contains("<Relationships"));
    assert!(!rels.contains("<Relationship "));

    let sheet = read_part(&xlsx, "xl/worksheets/sheet1.xml");
    assert!(!sheet.contains("<hyperlinks>"));
}

// ============================================================================
// 状態遷移とエラー
// ============================================================================

#[test]
fn test_finalize_twice_keeps_first_document() {
    let mut writer = XlsxStreamBuilder::new()
        .build(Cursor::new(Vec::new()))
        .unwrap();
    writer.add_row(&[CellValue::text("kept")]).unwrap();
    let xlsx = writer.finalize().unwrap().into_inner();

    assert!(matches!(writer.finalize(), Err(XlsxStreamError::State(_))));
    assert!(matches!(
        writer.add_row(&[CellValue::text("late")]),
        Err(XlsxStreamError::State(_))
    ));

    let range = read_sheet(xlsx);
    assert_eq!(text(range.get_value((0, 0))), "kept");
}

#[test]
fn test_define_columns_after_row_fails() {
    let mut writer = XlsxStreamBuilder::new()
        .build(Cursor::new(Vec::new()))
        .unwrap();
    writer.add_row(&[CellValue::text("a")]).unwrap();

    let result = writer.define_columns(&[ColumnDefinition::new(10.0)]);
    assert!(matches!(result, Err(XlsxStreamError::State(_))));

    // ライターは引き続き使用できる
    writer.add_row(&[CellValue::text("b")]).unwrap();
    writer.finalize().unwrap();
}

#[test]
fn test_invalid_row_is_not_written() {
    let mut writer = XlsxStreamBuilder::new()
        .build(Cursor::new(Vec::new()))
        .unwrap();
    writer.add_row(&[CellValue::text("ok")]).unwrap();

    let result = writer.add_row(&[CellValue::text("partial"), CellValue::hyperlink("x", "")]);
    match result {
        Err(XlsxStreamError::Validation { cell, .. }) => assert_eq!(cell, "B2"),
        other => panic!("Expected Validation error, got {:?}", other),
    }
    writer.add_row(&[CellValue::text("next")]).unwrap();
    let xlsx = writer.finalize().unwrap().into_inner();

    let strings = read_part(&xlsx, "xl/sharedStrings.xml");
    assert!(!strings.contains("partial"));
    let sheet = read_part(&xlsx, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<row r="2"><c r="A2" t="s"><v>1</v></c></row>"#));
    assert!(!sheet.contains(r#"<row r="3">"#));
}

/// 書き込みに常に失敗する出力先
struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "sink closed",
        ))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Seek for FailingSink {
    fn seek(&mut self, _pos: SeekFrom) -> std::io::Result<u64> {
        Ok(0)
    }
}

#[test]
fn test_sink_errors_are_propagated() {
    let result = XlsxStreamBuilder::new().build(FailingSink);
    match result {
        Err(XlsxStreamError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe),
        other => panic!("Expected Io error, got {:?}", other.map(|_| ())),
    }
}

// ============================================================================
// ファイル出力
// ============================================================================

#[test]
fn test_file_target_with_callback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");

    let finished = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&finished);
    let mut writer = XlsxStreamBuilder::new()
        .with_columns(vec![ColumnDefinition::new(25.0)])
        .on_finish(move |p| {
            *slot.lock().unwrap() = Some(p.to_path_buf());
        })
        .create(&path)
        .unwrap();

    writer.add_row(&[CellValue::text("file")]).unwrap();
    assert!(finished.lock().unwrap().is_none());
    writer.finalize().unwrap();

    assert_eq!(finished.lock().unwrap().as_deref(), Some(path.as_path()));

    let xlsx = std::fs::read(&path).unwrap();
    let range = read_sheet(xlsx);
    assert_eq!(text(range.get_value((0, 0))), "file");
}

#[test]
fn test_create_in_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("report.xlsx");
    let result = XlsxStreamBuilder::new().create(&path);
    assert!(matches!(result, Err(XlsxStreamError::Io(_))));
}
