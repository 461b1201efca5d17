//! Row Serializer Module
//!
//! 行データを検証し、シートXMLの`<row>`断片に変換するモジュール。
//!
//! 1枚のシートの可変状態（共有文字列テーブル、リレーションシップ、列ラベルキャッシュ、
//! 行カウンタ）はすべて`RowSerializer`が所有します。

use crate::api::CellValue;
use crate::date::to_epoch_days;
use crate::error::{Result, XlsxStreamError};
use crate::limits::SheetLimits;
use crate::relationships::RelationshipTracker;
use crate::strings::SharedStringTable;
use crate::templates;
use crate::types::{cell_reference, CellCoord, ColumnLabelCache};

/// 検証済みのセル内容
#[derive(Debug, Clone, Copy, PartialEq)]
enum CellBody<'a> {
    /// 共有文字列（`Empty`は空文字列）
    Shared(&'a str),
    Number(f64),
    /// 日付（シリアル値）
    Date(f64),
}

/// 検証済みのセル（リンク先があればハイパーリンク）
#[derive(Debug, Clone, Copy, PartialEq)]
struct PreparedCell<'a> {
    body: CellBody<'a>,
    link: Option<&'a str>,
}

/// 1枚のシートの行シリアライザ
#[derive(Debug)]
pub(crate) struct RowSerializer {
    strings: SharedStringTable,
    links: RelationshipTracker,
    labels: ColumnLabelCache,
    rows_written: u32,
    limits: SheetLimits,
}

impl RowSerializer {
    pub fn new() -> Self {
        Self {
            strings: SharedStringTable::new(),
            links: RelationshipTracker::new(),
            labels: ColumnLabelCache::new(),
            rows_written: 0,
            limits: SheetLimits::default(),
        }
    }

    /// 書き込み済みの行数（ヘッダー行を含む）
    pub fn rows_written(&self) -> u32 {
        self.rows_written
    }

    pub fn limits(&self) -> &SheetLimits {
        &self.limits
    }

    /// 行を検証する（状態は変更しない）
    ///
    /// `serialize_row`と同じ検証を行います。`pending`にはこの行より前に
    /// 書き込まれる予定の行数（ヘッダー行など）を指定します。
    pub fn validate_row(&self, values: &[CellValue], pending: u32) -> Result<()> {
        let row = self.next_row(pending)?;
        self.prepare_row(values, row).map(|_| ())
    }

    /// 行を`<row r="N">...</row>`断片に変換する
    ///
    /// 行全体を先に検証するため、エラー時には文字列テーブル・リレーションシップ・
    /// 行カウンタのいずれも変更されません。
    pub fn serialize_row(&mut self, values: &[CellValue]) -> Result<String> {
        let row = self.next_row(0)?;
        let cells = self.prepare_row(values, row)?;

        let mut buf = String::with_capacity(16 + cells.len() * 40);
        templates::push_start_row(&mut buf, row);

        for (i, cell) in cells.into_iter().enumerate() {
            let cell_ref = self.labels.cell_ref(CellCoord::new(row, i as u32 + 1));
            match cell.body {
                CellBody::Shared(text) => {
                    let index = self.strings.intern(text);
                    templates::push_shared_string_cell(&mut buf, &cell_ref, index);
                }
                CellBody::Number(value) => templates::push_number_cell(&mut buf, &cell_ref, value),
                CellBody::Date(serial) => templates::push_date_cell(&mut buf, &cell_ref, serial),
            }
            if let Some(target) = cell.link {
                self.links.record(cell_ref, target.to_string());
            }
        }

        buf.push_str(templates::END_ROW);
        self.rows_written = row;
        log::trace!("row {} serialized ({} cells)", row, values.len());
        Ok(buf)
    }

    /// ヘッダーラベルを通常の文字列行として変換する
    pub fn serialize_labels(&mut self, labels: &[String]) -> Result<String> {
        let values: Vec<CellValue> = labels.iter().map(CellValue::from).collect();
        self.serialize_row(&values)
    }

    /// シートXMLに埋め込む`<hyperlinks>`ブロック
    pub fn render_hyperlinks(&self) -> String {
        self.links.render_hyperlinks()
    }

    /// シートのリレーションシップパート
    pub fn render_relationships(&self) -> String {
        self.links.render_part()
    }

    /// 共有文字列パート
    pub fn render_shared_strings(&self) -> String {
        self.strings.render()
    }

    pub fn unique_strings(&self) -> usize {
        self.strings.unique_count()
    }

    pub fn string_references(&self) -> u64 {
        self.strings.reference_count()
    }

    pub fn hyperlink_count(&self) -> usize {
        self.links.len()
    }

    fn next_row(&self, pending: u32) -> Result<u32> {
        let row = self
            .rows_written
            .checked_add(pending)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| XlsxStreamError::LimitExceeded("row counter overflow".to_string()))?;
        self.limits
            .check_row(row)
            .map_err(XlsxStreamError::LimitExceeded)?;
        Ok(row)
    }

    fn prepare_row<'a>(&self, values: &'a [CellValue], row: u32) -> Result<Vec<PreparedCell<'a>>> {
        self.limits
            .check_columns(values.len())
            .map_err(XlsxStreamError::LimitExceeded)?;

        values
            .iter()
            .enumerate()
            .map(|(i, value)| prepare_cell(value, row, i as u32 + 1))
            .collect()
    }
}

fn invalid(row: u32, col: u32, message: impl Into<String>) -> XlsxStreamError {
    XlsxStreamError::Validation {
        cell: cell_reference(row, col).unwrap_or_default(),
        message: message.into(),
    }
}

fn prepare_cell(value: &CellValue, row: u32, col: u32) -> Result<PreparedCell<'_>> {
    match value {
        CellValue::Hyperlink { display, target } => {
            if target.is_empty() {
                return Err(invalid(row, col, "hyperlink target is empty"));
            }
            if let Some(c) = target.chars().find(|&c| !templates::is_xml_char(c)) {
                return Err(invalid(
                    row,
                    col,
                    format!(
                        "hyperlink target contains U+{:04X}, which XML cannot carry",
                        u32::from(c)
                    ),
                ));
            }
            let body = match display.as_ref() {
                CellValue::Text(text) if !text.is_empty() => CellBody::Shared(text),
                CellValue::Number(_) => prepare_body(display, row, col)?,
                CellValue::Empty | CellValue::Text(_) => {
                    return Err(invalid(row, col, "hyperlink display value is empty"));
                }
                CellValue::Date(_) | CellValue::Hyperlink { .. } => {
                    return Err(invalid(
                        row,
                        col,
                        "hyperlink display value must be text or a number",
                    ));
                }
            };
            Ok(PreparedCell {
                body,
                link: Some(target),
            })
        }
        other => Ok(PreparedCell {
            body: prepare_body(other, row, col)?,
            link: None,
        }),
    }
}

fn prepare_body(value: &CellValue, row: u32, col: u32) -> Result<CellBody<'_>> {
    match value {
        CellValue::Empty => Ok(CellBody::Shared("")),
        CellValue::Text(text) => Ok(CellBody::Shared(text)),
        CellValue::Number(n) if n.is_finite() => Ok(CellBody::Number(*n)),
        CellValue::Number(n) => Err(invalid(row, col, format!("number is not finite: {}", n))),
        CellValue::Date(ts) => to_epoch_days(ts).map(CellBody::Date).ok_or_else(|| {
            invalid(
                row,
                col,
                format!("date {} is outside 1900-01-01..9999-12-31", ts.to_rfc3339()),
            )
        }),
        CellValue::Hyperlink { .. } => Err(invalid(row, col, "nested hyperlink")),
    }
}
