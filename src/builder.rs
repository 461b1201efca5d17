//! Builder Module
//!
//! Fluent Builder APIを提供し、`SheetStreamWriter`インスタンスを段階的に構築する。

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use crate::api::{ArchiveOptions, ColumnDefinition};
use crate::error::{Result, XlsxStreamError};
use crate::package::{PackageBuilder, ZipPackage};
use crate::writer::{FinishCallback, FinishHook, SheetStreamWriter};

/// 既定の列幅（Excelの文字幅単位）
pub const DEFAULT_COLUMN_WIDTH: f64 = 15.0;

/// ファイルに書き込むシートライター
pub type FileSheetWriter = SheetStreamWriter<ZipPackage<BufWriter<File>>>;

/// 書き込み処理の設定を保持する内部構造体
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StreamConfig {
    /// 幅を指定しない列の既定幅
    pub default_width: f64,

    /// 構築時に書き込む列定義（空の場合は書き込まない）
    pub columns: Vec<ColumnDefinition>,

    /// ヘッダー行のラベル（空の場合はヘッダー行なし）
    pub cell_map: Vec<String>,

    /// ZIPコンテナの設定
    pub archive: ArchiveOptions,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_COLUMN_WIDTH,
            columns: Vec::new(),
            cell_map: Vec::new(),
            archive: ArchiveOptions::default(),
        }
    }
}

impl StreamConfig {
    fn validate(&self) -> Result<()> {
        // 1. 既定の列幅
        if !(self.default_width.is_finite() && self.default_width > 0.0) {
            return Err(XlsxStreamError::Config(format!(
                "Invalid default column width: {} (must be positive and finite)",
                self.default_width
            )));
        }

        // 2. 個別の列幅
        for (i, column) in self.columns.iter().enumerate() {
            if let Some(width) = column.width {
                if !(width.is_finite() && width > 0.0) {
                    return Err(XlsxStreamError::Config(format!(
                        "Invalid width for column {}: {} (must be positive and finite)",
                        i + 1,
                        width
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `SheetStreamWriter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxstream::{CellValue, ColumnDefinition, XlsxStreamBuilder};
///
/// # fn main() -> Result<(), xlsxstream::XlsxStreamError> {
/// let mut writer = XlsxStreamBuilder::new()
///     .with_columns(vec![ColumnDefinition::new(25.0), ColumnDefinition::default()])
///     .with_cell_map(["name", "score"])
///     .on_finish(|path| println!("written: {}", path.display()))
///     .create("report.xlsx")?;
///
/// writer.add_row(&[CellValue::text("alice"), CellValue::number(91.5)])?;
/// writer.finalize()?;
/// # Ok(())
/// # }
/// ```
pub struct XlsxStreamBuilder {
    /// 内部設定（構築中）
    config: StreamConfig,

    /// 完了時コールバック（ファイル出力時のみ）
    on_finish: Option<FinishCallback>,
}

impl fmt::Debug for XlsxStreamBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XlsxStreamBuilder")
            .field("config", &self.config)
            .field("on_finish", &self.on_finish.is_some())
            .finish()
    }
}

impl Default for XlsxStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxStreamBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 既定の列幅: 15
    /// - 列定義: なし
    /// - ヘッダー行: なし
    /// - 圧縮: Deflate（既定レベル）、ZIP64なし
    pub fn new() -> Self {
        Self {
            config: StreamConfig::default(),
            on_finish: None,
        }
    }

    /// 幅を指定しない列の既定幅を設定する
    ///
    /// # 引数
    ///
    /// * `width: f64`: 列幅（正の有限値）
    pub fn with_default_width(mut self, width: f64) -> Self {
        self.config.default_width = width;
        self
    }

    /// 構築時に書き込む列定義を設定する
    ///
    /// 構築後に`SheetStreamWriter::define_columns`を呼び出すのと同じ効果を持ちます。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxstream::{ColumnDefinition, XlsxStreamBuilder};
    ///
    /// // JSONから読み込んだ列定義を使用
    /// let columns: Vec<ColumnDefinition> =
    ///     serde_json::from_str(r#"[{"width": 30}, {}]"#).unwrap();
    /// let builder = XlsxStreamBuilder::new().with_columns(columns);
    /// ```
    pub fn with_columns(mut self, columns: Vec<ColumnDefinition>) -> Self {
        self.config.columns = columns;
        self
    }

    /// ヘッダー行のラベルを設定する
    pub fn with_cell_map<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.cell_map = labels.into_iter().map(Into::into).collect();
        self
    }

    /// ZIPコンテナの設定を指定する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxstream::{ArchiveOptions, Compression, XlsxStreamBuilder};
    ///
    /// let builder = XlsxStreamBuilder::new().with_archive_options(ArchiveOptions {
    ///     compression: Compression::Deflated,
    ///     compression_level: Some(9),
    ///     large_file: false,
    /// });
    /// ```
    pub fn with_archive_options(mut self, archive: ArchiveOptions) -> Self {
        self.config.archive = archive;
        self
    }

    /// 完了時コールバックを設定する
    ///
    /// `create`で生成したライターの`finalize`が成功した後、出力ファイルのパスを
    /// 引数に一度だけ呼び出されます。
    pub fn on_finish<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&Path) + Send + 'static,
    {
        self.on_finish = Some(Box::new(callback));
        self
    }

    /// ファイルを作成し、そこに書き込むライターを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxStreamError::Config` - 設定が無効な場合
    /// * `XlsxStreamError::Io` - ファイルを作成できない場合
    pub fn create(self, path: impl AsRef<Path>) -> Result<FileSheetWriter> {
        self.config.validate()?;
        let path: PathBuf = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let package = ZipPackage::new(BufWriter::new(file), &self.config.archive)?;
        let hook = self
            .on_finish
            .map(|callback| FinishHook { path, callback });
        start_writer(self.config, package, hook)
    }

    /// 任意の出力先（`Write + Seek`）に書き込むライターを生成する
    ///
    /// `finalize`は出力先をそのまま返します。
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxStreamError::Config` - 設定が無効な場合、または`on_finish`が設定されている場合
    pub fn build<W: Write + Seek>(self, writer: W) -> Result<SheetStreamWriter<ZipPackage<W>>> {
        self.config.validate()?;
        reject_callback(&self.on_finish)?;
        let package = ZipPackage::new(writer, &self.config.archive)?;
        start_writer(self.config, package, None)
    }

    /// 任意の`PackageBuilder`に書き込むライターを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxStreamError::Config` - 設定が無効な場合、または`on_finish`が設定されている場合
    pub fn build_with_package<P: PackageBuilder>(self, package: P) -> Result<SheetStreamWriter<P>> {
        self.config.validate()?;
        reject_callback(&self.on_finish)?;
        start_writer(self.config, package, None)
    }
}

fn reject_callback(on_finish: &Option<FinishCallback>) -> Result<()> {
    if on_finish.is_some() {
        return Err(XlsxStreamError::Config(
            "on_finish requires a file target; use create(path)".to_string(),
        ));
    }
    Ok(())
}

fn start_writer<P: PackageBuilder>(
    config: StreamConfig,
    package: P,
    hook: Option<FinishHook>,
) -> Result<SheetStreamWriter<P>> {
    let mut writer = SheetStreamWriter::start(package, config.default_width, config.cell_map, hook)?;
    writer.define_columns(&config.columns)?;
    Ok(writer)
}
