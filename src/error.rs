//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxstreamクレート全体で使用するエラー型
///
/// シートのストリーミング書き込み中に発生するすべてのエラーを
/// 統一的に扱うために使用されます。どのエラーも書き込み中のシートに対して
/// 致命的であり、クレート内部でリトライは行いません。
///
/// # エラーの種類
///
/// - `Io`: 出力先への書き込みに失敗したエラー
/// - `Zip`: ZIPアーカイブの構築に失敗したエラー
/// - `State`: 呼び出し順序の違反（行の後の列定義、二重の`finalize`など）
/// - `Validation`: セル値の検証に失敗したエラー
/// - `LimitExceeded`: ワークシートの行数・列数の上限を超えたエラー
/// - `Config`: 設定の検証に失敗したエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use std::io::Cursor;
/// use xlsxstream::{CellValue, XlsxStreamBuilder, XlsxStreamError};
///
/// # fn main() -> Result<(), XlsxStreamError> {
/// let mut writer = XlsxStreamBuilder::new().build(Cursor::new(Vec::new()))?;
/// writer.add_row(&[CellValue::text("a")])?;
/// writer.finalize()?;
///
/// match writer.finalize() {
///     Err(XlsxStreamError::State(msg)) => println!("状態エラー: {}", msg),
///     _ => unreachable!(),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Error, Debug)]
pub enum XlsxStreamError {
    /// I/O操作中に発生したエラー
    ///
    /// 出力先（ファイル、ソケット、メモリバッファなど）への書き込み失敗は
    /// 内部で処理せず、そのまま呼び出し元に伝播します。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIPアーカイブの構築エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 呼び出し順序に違反したエラー
    ///
    /// 次の場合に、違反した呼び出しの時点で同期的に返されます。
    ///
    /// - 行を書き込んだ後に`define_columns()`を呼び出した
    /// - 列定義を二度出力しようとした
    /// - `finalize()`の後に`add_row()`/`define_columns()`を呼び出した
    /// - `finalize()`を二度呼び出した
    #[error("Invalid writer state: {0}")]
    State(String),

    /// セル値の検証に失敗したエラー
    ///
    /// ハイパーリンクの表示値またはリンク先が欠けている場合、数値が有限でない場合、
    /// 日付が表現可能な範囲外の場合に発生します。検証に失敗した行は
    /// 一切出力されません。
    ///
    /// # 例
    ///
    /// ```rust
    /// use xlsxstream::XlsxStreamError;
    ///
    /// let error = XlsxStreamError::Validation {
    ///     cell: "B2".to_string(),
    ///     message: "hyperlink target is empty".to_string(),
    /// };
    /// assert_eq!(error.to_string(), "Invalid value at cell B2: hyperlink target is empty");
    /// ```
    #[error("Invalid value at cell {cell}: {message}")]
    Validation {
        /// エラーが発生したセルの座標（A1記法）
        cell: String,
        /// エラーの詳細メッセージ
        message: String,
    },

    /// ワークシートの上限（1,048,576行、16,384列）を超えたエラー
    #[error("Worksheet limit exceeded: {0}")]
    LimitExceeded(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `XlsxStreamBuilder`の構築時に、列幅が正の有限値でない場合や
    /// 圧縮レベルが範囲外の場合などに発生します。
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<zip::result::ZipError> for XlsxStreamError {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => XlsxStreamError::Io(io),
            other => XlsxStreamError::Zip(other.to_string()),
        }
    }
}

/// クレート内部で使用する`Result`型
pub(crate) type Result<T> = std::result::Result<T, XlsxStreamError>;
