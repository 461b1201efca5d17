//! Sheet Stream Writer Module
//!
//! 1枚のワークシートを前方向のみのストリームとして書き出すライターを提供します。
//!
//! # 書き込み順序
//!
//! 1. シートヘッダー（構築時）
//! 2. 列定義`<cols>`（任意、最初の行より前に一度だけ）
//! 3. `<sheetData>`とヘッダー行（最初の`add_row`時）
//! 4. データ行
//! 5. `</sheetData>`、`<hyperlinks>`、シートフッター（`finalize`時）
//! 6. 固定パート、シートのリレーションシップ、共有文字列（`finalize`時）

use std::path::{Path, PathBuf};

use crate::api::{CellValue, ColumnDefinition};
use crate::error::{Result, XlsxStreamError};
use crate::package::PackageBuilder;
use crate::serializer::RowSerializer;
use crate::templates;
use crate::types::column_letters;

const ALREADY_FINALIZED: &str = "This XLSX was already finalized.";

/// 完了時に出力ファイルのパスを受け取るコールバック
pub type FinishCallback = Box<dyn FnOnce(&Path) + Send>;

/// シートの書き込み状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetState {
    /// ヘッダーのみ書き込み済み
    Fresh,
    /// 列定義を書き込み済み
    ColumnsDefined,
    /// 1行以上書き込み済み
    RowsWritten,
    /// 完了済み（以降の操作はすべてエラー）
    Finalized,
}

/// 完了時のコールバックと、その引数になる出力先パス
pub(crate) struct FinishHook {
    pub path: PathBuf,
    pub callback: FinishCallback,
}

/// ストリーミングシートライター
///
/// `XlsxStreamBuilder`から生成します。行は`add_row`で追加した順に、そのまま
/// パッケージのシートエントリへ書き込まれます（全行をメモリに保持しません）。
///
/// # 使用例
///
/// ```rust
/// use std::io::Cursor;
/// use xlsxstream::{CellValue, ColumnDefinition, XlsxStreamBuilder};
///
/// # fn main() -> Result<(), xlsxstream::XlsxStreamError> {
/// let mut writer = XlsxStreamBuilder::new().build(Cursor::new(Vec::new()))?;
/// writer.define_columns(&[ColumnDefinition::new(30.0), ColumnDefinition::default()])?;
/// writer.set_cell_map(["name", "score"]);
/// writer.add_row(&[CellValue::text("alice"), CellValue::number(91.5)])?;
/// writer.add_row(&[CellValue::hyperlink("docs", "https://docs.rs"), CellValue::Empty])?;
///
/// let bytes = writer.finalize()?.into_inner();
/// assert_eq!(&bytes[..2], b"PK");
/// # Ok(())
/// # }
/// ```
pub struct SheetStreamWriter<P: PackageBuilder> {
    package: Option<P>,
    serializer: RowSerializer,
    state: SheetState,
    default_width: f64,
    cell_map: Vec<String>,
    finish_hook: Option<FinishHook>,
}

impl<P: PackageBuilder> std::fmt::Debug for SheetStreamWriter<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetStreamWriter")
            .field("state", &self.state)
            .field("rows_written", &self.serializer.rows_written())
            .field("default_width", &self.default_width)
            .field("cell_map", &self.cell_map)
            .finish_non_exhaustive()
    }
}

impl<P: PackageBuilder> SheetStreamWriter<P> {
    /// シートエントリを開き、シートヘッダーを書き込む
    pub(crate) fn start(
        mut package: P,
        default_width: f64,
        cell_map: Vec<String>,
        finish_hook: Option<FinishHook>,
    ) -> Result<Self> {
        package.start_entry(templates::SHEET_PART)?;
        package.write(templates::SHEET_HEADER.as_bytes())?;
        log::debug!("sheet stream started: {}", templates::SHEET_PART);

        Ok(Self {
            package: Some(package),
            serializer: RowSerializer::new(),
            state: SheetState::Fresh,
            default_width,
            cell_map,
            finish_hook,
        })
    }

    /// 現在の状態
    pub fn state(&self) -> SheetState {
        self.state
    }

    /// 書き込み済みの行数（ヘッダー行を含む）
    pub fn rows_written(&self) -> u32 {
        self.serializer.rows_written()
    }

    /// 列幅を定義する
    ///
    /// `width`が`None`の列には既定の列幅を使用します。空のリストは何も書き込みません。
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxStreamError::State` - 行の書き込み後、列定義の書き込み後、または完了後
    /// * `XlsxStreamError::Validation` - 列幅が正の有限値でない場合
    /// * `XlsxStreamError::LimitExceeded` - 列数が上限を超える場合
    pub fn define_columns(&mut self, columns: &[ColumnDefinition]) -> Result<()> {
        match self.state {
            SheetState::Finalized => {
                return Err(XlsxStreamError::State(ALREADY_FINALIZED.to_string()))
            }
            SheetState::RowsWritten => {
                return Err(XlsxStreamError::State(
                    "Columns cannot be added after rows! Call define_columns before add_row."
                        .to_string(),
                ))
            }
            SheetState::ColumnsDefined if !columns.is_empty() => {
                return Err(XlsxStreamError::State(
                    "Columns have already been defined".to_string(),
                ))
            }
            _ => {}
        }
        if columns.is_empty() {
            return Ok(());
        }

        self.serializer
            .limits()
            .check_columns(columns.len())
            .map_err(XlsxStreamError::LimitExceeded)?;

        let widths = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let width = column.width.unwrap_or(self.default_width);
                if width.is_finite() && width > 0.0 {
                    Ok(width)
                } else {
                    Err(XlsxStreamError::Validation {
                        cell: column_letters(i as u32 + 1).unwrap_or_default(),
                        message: format!("column width must be positive and finite: {}", width),
                    })
                }
            })
            .collect::<Result<Vec<f64>>>()?;

        self.write(templates::columns(&widths).as_bytes())?;
        self.state = SheetState::ColumnsDefined;
        log::debug!("{} column definitions written", widths.len());
        Ok(())
    }

    /// ヘッダー行のラベルを設定する
    ///
    /// ラベルは最初の`add_row`の直前に1行目として書き込まれます。行の書き込み後に
    /// 呼び出した場合は警告を記録して無視します。空のリストはヘッダー行を無効にします。
    pub fn set_cell_map<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.state {
            SheetState::Fresh | SheetState::ColumnsDefined => {
                self.cell_map = labels.into_iter().map(Into::into).collect();
            }
            SheetState::RowsWritten | SheetState::Finalized => {
                log::warn!(
                    "set_cell_map called after rows were written; the header labels are ignored"
                );
            }
        }
    }

    /// 1行を追加する
    ///
    /// 値は列1から順に配置されます。行全体を検証してから書き込むため、
    /// エラー時には部分的な行は出力されません。
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxStreamError::State` - 完了後に呼び出した場合
    /// * `XlsxStreamError::Validation` - セル値が不正な場合
    /// * `XlsxStreamError::LimitExceeded` - 行数・列数が上限を超える場合
    /// * `XlsxStreamError::Io` / `XlsxStreamError::Zip` - 出力先への書き込みに失敗した場合
    pub fn add_row(&mut self, row: &[CellValue]) -> Result<()> {
        match self.state {
            SheetState::Finalized => {
                return Err(XlsxStreamError::State(ALREADY_FINALIZED.to_string()))
            }
            SheetState::Fresh | SheetState::ColumnsDefined => {
                let header_rows = u32::from(!self.cell_map.is_empty());
                self.serializer.validate_row(row, header_rows)?;
                self.serializer
                    .limits()
                    .check_columns(self.cell_map.len())
                    .map_err(XlsxStreamError::LimitExceeded)?;
                self.open_sheet_data()?;
            }
            SheetState::RowsWritten => {}
        }

        let fragment = self.serializer.serialize_row(row)?;
        self.write(fragment.as_bytes())
    }

    /// 複数行を順に追加する
    ///
    /// 途中の行でエラーが発生した場合、それ以前の行は書き込まれたままになります。
    pub fn add_rows<I, R>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[CellValue]>,
    {
        for row in rows {
            self.add_row(row.as_ref())?;
        }
        Ok(())
    }

    /// シートを閉じ、残りのパートを追加してパッケージを完了する
    ///
    /// # 戻り値
    ///
    /// * `Ok(P::Output)` - パッケージの出力（`ZipPackage`の場合は出力先）
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxStreamError::State` - すでに完了している場合
    pub fn finalize(&mut self) -> Result<P::Output> {
        if self.state == SheetState::Finalized {
            return Err(XlsxStreamError::State(ALREADY_FINALIZED.to_string()));
        }
        let had_rows = self.state == SheetState::RowsWritten;
        self.state = SheetState::Finalized;
        let mut package = self
            .package
            .take()
            .ok_or_else(|| XlsxStreamError::State(ALREADY_FINALIZED.to_string()))?;

        let mut tail = String::from(if had_rows {
            templates::SHEET_DATA_FOOTER
        } else {
            templates::EMPTY_SHEET_DATA
        });
        tail.push_str(&self.serializer.render_hyperlinks());
        tail.push_str(templates::SHEET_FOOTER);
        package.write(tail.as_bytes())?;

        for (name, xml) in templates::static_parts() {
            package.append(name, xml.as_bytes())?;
        }
        package.append(
            templates::SHEET_RELS_PART,
            self.serializer.render_relationships().as_bytes(),
        )?;
        package.append(
            templates::SHARED_STRINGS_PART,
            self.serializer.render_shared_strings().as_bytes(),
        )?;

        let output = package.finalize()?;
        log::debug!(
            "sheet finalized: {} rows, {} unique strings ({} references), {} hyperlinks",
            self.serializer.rows_written(),
            self.serializer.unique_strings(),
            self.serializer.string_references(),
            self.serializer.hyperlink_count()
        );

        if let Some(FinishHook { path, callback }) = self.finish_hook.take() {
            log::debug!("invoking completion callback for {}", path.display());
            callback(&path);
        }
        Ok(output)
    }

    fn open_sheet_data(&mut self) -> Result<()> {
        self.write(templates::SHEET_DATA_HEADER.as_bytes())?;
        if !self.cell_map.is_empty() {
            let header = self.serializer.serialize_labels(&self.cell_map)?;
            self.write(header.as_bytes())?;
        }
        self.state = SheetState::RowsWritten;
        log::debug!(
            "sheet data opened (header row: {})",
            !self.cell_map.is_empty()
        );
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        match self.package.as_mut() {
            Some(package) => package.write(data),
            None => Err(XlsxStreamError::State(ALREADY_FINALIZED.to_string())),
        }
    }
}
