//! Public API Types
//!
//! 公開APIで使用するセル値・列定義・アーカイブ設定を定義するモジュール。

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// セルの値
///
/// 行（`&[CellValue]`）の各要素が1つのセルになり、列1から順に配置されます。
///
/// # 使用例
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use xlsxstream::CellValue;
///
/// let row = [
///     CellValue::text("name"),
///     CellValue::number(42.0),
///     CellValue::date(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
///     CellValue::hyperlink("docs", "https://docs.rs"),
///     CellValue::Empty,
/// ];
/// assert_eq!(row.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CellValue {
    /// 空セル（空文字列の共有文字列セルとして出力）
    Empty,

    /// 文字列（共有文字列テーブルに登録される）
    Text(String),

    /// 数値（そのまま出力。有限値のみ）
    Number(f64),

    /// 日時（UTC。シリアル値に変換され、日付書式のセルとして出力）
    Date(DateTime<Utc>),

    /// ハイパーリンク
    ///
    /// 表示値（`Text`または`Number`）を通常のセルとして出力し、
    /// 同じセルに外部リンクのリレーションシップを記録します。
    Hyperlink {
        /// 表示値
        display: Box<CellValue>,
        /// リンク先URL
        target: String,
    },
}

impl CellValue {
    pub fn text(v: impl Into<String>) -> Self {
        CellValue::Text(v.into())
    }

    pub fn number(v: f64) -> Self {
        CellValue::Number(v)
    }

    /// 任意のタイムゾーンの日時をUTCに正規化して生成
    pub fn date<Tz: TimeZone>(v: DateTime<Tz>) -> Self {
        CellValue::Date(v.with_timezone(&Utc))
    }

    pub fn hyperlink(display: impl Into<CellValue>, target: impl Into<String>) -> Self {
        CellValue::Hyperlink {
            display: Box::new(display.into()),
            target: target.into(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<&String> for CellValue {
    fn from(v: &String) -> Self {
        CellValue::Text(v.clone())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<f32> for CellValue {
    fn from(v: f32) -> Self {
        CellValue::Number(f64::from(v))
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Number(f64::from(v))
    }
}

impl From<u32> for CellValue {
    fn from(v: u32) -> Self {
        CellValue::Number(f64::from(v))
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Number(v as f64)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for CellValue {
    fn from(v: DateTime<Tz>) -> Self {
        CellValue::date(v)
    }
}

/// タイムゾーンなしの日時はUTCとして扱う
impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::Date(Utc.from_utc_datetime(&v))
    }
}

/// 日付のみの場合はUTCの0時として扱う
impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        CellValue::Date(Utc.from_utc_datetime(&v.and_time(chrono::NaiveTime::MIN)))
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Empty, Into::into)
    }
}

/// JSON値からの変換
///
/// `null`は空セル、数値は数値セル、文字列はテキストセルになります。
/// 真偽値は`"true"`/`"false"`、配列とオブジェクトはJSON文字列としてテキストセルになります。
impl From<&serde_json::Value> for CellValue {
    fn from(v: &serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::Text(b.to_string()),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| CellValue::Text(n.to_string()), CellValue::Number),
            Value::String(s) => CellValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => CellValue::Text(v.to_string()),
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => CellValue::Text(s),
            other => CellValue::from(&other),
        }
    }
}

/// 列定義
///
/// `width`が`None`の場合は、設定された既定の列幅（初期値15）を使用します。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnDefinition {
    /// 列幅（Excelの文字幅単位、正の有限値）
    pub width: Option<f64>,
}

impl ColumnDefinition {
    /// 列幅を指定して生成
    pub fn new(width: f64) -> Self {
        Self { width: Some(width) }
    }
}

/// ZIPエントリの圧縮方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Compression {
    /// 無圧縮
    Stored,
    /// Deflate圧縮（デフォルト）
    #[default]
    Deflated,
}

/// アーカイブ（ZIPコンテナ）の設定
///
/// 内容は解釈せず、そのまま`zip`クレートの`FileOptions`に渡されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveOptions {
    /// 圧縮方式
    pub compression: Compression,

    /// 圧縮レベル（Deflateの場合0-9。`None`で既定値）
    pub compression_level: Option<i32>,

    /// 4GBを超えるエントリのためにZIP64を有効にするか
    pub large_file: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Deflated,
            compression_level: None,
            large_file: false,
        }
    }
}
