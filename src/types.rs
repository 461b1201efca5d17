//! Types Module
//!
//! セル座標（A1記法）の生成と、列ラベルのキャッシュを提供するモジュール。
//!
//! 列番号は1始まりで、スプレッドシート形式の「ゼロなし26進数」（bijective base-26）で
//! 表現します（1 -> "A", 26 -> "Z", 27 -> "AA"）。

use std::collections::HashMap;

/// 列番号（1始まり）を列ラベルに変換する
///
/// # 戻り値
///
/// * `Some(String)` - 列ラベル（例: 28 -> `"AB"`）
/// * `None` - `col`が0の場合
///
/// # 使用例
///
/// ```rust
/// use xlsxstream::column_letters;
///
/// assert_eq!(column_letters(1).as_deref(), Some("A"));
/// assert_eq!(column_letters(28).as_deref(), Some("AB"));
/// assert_eq!(column_letters(703).as_deref(), Some("AAA"));
/// assert_eq!(column_letters(0), None);
/// ```
pub fn column_letters(col: u32) -> Option<String> {
    if col == 0 {
        return None;
    }
    Some(encode_column(col))
}

/// 行番号・列番号（どちらも1始まり）からセル参照を生成する
///
/// # 使用例
///
/// ```rust
/// use xlsxstream::cell_reference;
///
/// assert_eq!(cell_reference(7, 28).as_deref(), Some("AB7"));
/// assert_eq!(cell_reference(0, 1), None);
/// ```
pub fn cell_reference(row: u32, col: u32) -> Option<String> {
    if row == 0 {
        return None;
    }
    column_letters(col).map(|letters| format!("{}{}", letters, row))
}

// col >= 1 が前提
fn encode_column(col: u32) -> String {
    let mut n = col;
    let mut letters = Vec::with_capacity(3);
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// セル座標（1始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// 列ラベルのキャッシュ
///
/// 同じ列番号は行ごとに繰り返し現れるため、計算済みの列ラベルを保持します。
/// シートの状態（`RowSerializer`）と一緒に生成・破棄されます。
#[derive(Debug, Default)]
pub(crate) struct ColumnLabelCache {
    labels: HashMap<u32, String>,
}

impl ColumnLabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 列ラベルを取得（未計算なら計算してキャッシュする）
    pub fn label(&mut self, col: u32) -> &str {
        debug_assert!(col >= 1, "column index is 1-based");
        self.labels.entry(col).or_insert_with(|| encode_column(col))
    }

    /// セル参照を生成（例: (3, 2) -> "B3"）
    pub fn cell_ref(&mut self, coord: CellCoord) -> String {
        let label = self.label(coord.col);
        let mut cell = String::with_capacity(label.len() + 7);
        cell.push_str(label);
        cell.push_str(&coord.row.to_string());
        cell
    }

    /// キャッシュ済みの列数
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.labels.len()
    }
}
