//! Package Module
//!
//! XLSXパッケージ（ZIPコンテナ）への書き込みを抽象化するモジュール。
//!
//! シートライターはパッケージの中身を解釈せず、名前付きエントリを追加して
//! 最後に`finalize`を呼び出すだけです。ZIP形式の実装（`ZipPackage`）と、
//! エントリをメモリ上に保持する実装（`MemoryPackage`）を提供します。

use std::collections::HashSet;
use std::io::{Seek, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::api::{ArchiveOptions, Compression};
use crate::error::{Result, XlsxStreamError};
use crate::limits::validate_entry_path;

/// 名前付きエントリを順に追加していくパッケージ
///
/// `start_entry`で開いたエントリには、次の`start_entry`/`append`/`finalize`まで
/// `write`で追記できます。書き込みは同期的で、出力先がデータを受け取るまで
/// ブロックします。
pub trait PackageBuilder {
    /// `finalize`が返す値（出力先など）
    type Output;

    /// 新しいエントリを開始する
    fn start_entry(&mut self, name: &str) -> Result<()>;

    /// 開いているエントリに追記する
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// 内容が確定したエントリを追加する
    fn append(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.start_entry(name)?;
        self.write(data)
    }

    /// パッケージを閉じる
    fn finalize(self) -> Result<Self::Output>
    where
        Self: Sized;
}

/// 開いているエントリ名と、使用済みエントリ名の管理
#[derive(Debug, Default)]
struct EntryLog {
    names: HashSet<String>,
    open: Option<String>,
}

impl EntryLog {
    fn open(&mut self, name: &str) -> Result<()> {
        validate_entry_path(name).map_err(XlsxStreamError::Config)?;
        if !self.names.insert(name.to_string()) {
            return Err(XlsxStreamError::Zip(format!("duplicate entry: {}", name)));
        }
        log::trace!("package entry started: {}", name);
        self.open = Some(name.to_string());
        Ok(())
    }

    fn current(&self) -> Result<&str> {
        self.open
            .as_deref()
            .ok_or_else(|| XlsxStreamError::State("no package entry is open".to_string()))
    }
}

/// ZIP形式のパッケージ
///
/// `W`には`File`（`BufWriter`推奨）や`Cursor<Vec<u8>>`など、`Write + Seek`を
/// 実装する任意の出力先を使用できます。
pub struct ZipPackage<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: FileOptions,
    entries: EntryLog,
}

impl<W: Write + Seek> ZipPackage<W> {
    /// 出力先とアーカイブ設定からパッケージを生成
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxStreamError::Config` - 圧縮レベルが範囲外、または無圧縮に圧縮レベルを指定した場合
    pub fn new(inner: W, archive: &ArchiveOptions) -> Result<Self> {
        Ok(Self {
            zip: ZipWriter::new(inner),
            options: file_options(archive)?,
            entries: EntryLog::default(),
        })
    }
}

impl<W: Write + Seek> std::fmt::Debug for ZipPackage<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipPackage")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

fn file_options(archive: &ArchiveOptions) -> Result<FileOptions> {
    let method = match archive.compression {
        Compression::Stored => CompressionMethod::Stored,
        Compression::Deflated => CompressionMethod::Deflated,
    };

    if let Some(level) = archive.compression_level {
        match archive.compression {
            Compression::Stored => {
                return Err(XlsxStreamError::Config(
                    "compression level cannot be set for stored entries".to_string(),
                ));
            }
            Compression::Deflated if !(0..=9).contains(&level) => {
                return Err(XlsxStreamError::Config(format!(
                    "Invalid deflate compression level: {} (expected 0-9)",
                    level
                )));
            }
            Compression::Deflated => {}
        }
    }

    Ok(FileOptions::default()
        .compression_method(method)
        .compression_level(archive.compression_level)
        .large_file(archive.large_file))
}

impl<W: Write + Seek> PackageBuilder for ZipPackage<W> {
    type Output = W;

    fn start_entry(&mut self, name: &str) -> Result<()> {
        self.entries.open(name)?;
        self.zip.start_file(name, self.options)?;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.entries.current()?;
        self.zip.write_all(data)?;
        Ok(())
    }

    fn finalize(mut self) -> Result<W> {
        let mut inner = self.zip.finish()?;
        inner.flush()?;
        Ok(inner)
    }
}

/// エントリをメモリ上に保持するパッケージ
///
/// 生成されるパートをZIP化せずに確認したい場合に使用します。
///
/// # 使用例
///
/// ```rust
/// use xlsxstream::{CellValue, MemoryPackage, XlsxStreamBuilder};
///
/// # fn main() -> Result<(), xlsxstream::XlsxStreamError> {
/// let mut writer = XlsxStreamBuilder::new().build_with_package(MemoryPackage::new())?;
/// writer.add_row(&[CellValue::text("hello")])?;
/// let package = writer.finalize()?;
///
/// let strings = package.entry_str("xl/sharedStrings.xml").unwrap();
/// assert!(strings.contains("<t>hello</t>"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryPackage {
    entries: Vec<(String, Vec<u8>)>,
    log: EntryLog,
}

impl MemoryPackage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加順のエントリ名
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// エントリの内容
    pub fn entry(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    /// エントリの内容（UTF-8文字列として）
    pub fn entry_str(&self, name: &str) -> Option<&str> {
        self.entry(name).and_then(|data| std::str::from_utf8(data).ok())
    }
}

impl PackageBuilder for MemoryPackage {
    type Output = MemoryPackage;

    fn start_entry(&mut self, name: &str) -> Result<()> {
        self.log.open(name)?;
        self.entries.push((name.to_string(), Vec::new()));
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.log.current()?;
        if let Some((_, buf)) = self.entries.last_mut() {
            buf.extend_from_slice(data);
        }
        Ok(())
    }

    fn finalize(mut self) -> Result<MemoryPackage> {
        self.log.open = None;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    #[test]
    fn test_memory_package_collects_entries() {
        let mut package = MemoryPackage::new();
        package.start_entry("a.xml").unwrap();
        package.write(b"<a>").unwrap();
        package.write(b"</a>").unwrap();
        package.append("b.xml", b"<b/>").unwrap();
        let package = package.finalize().unwrap();

        assert_eq!(package.names().collect::<Vec<_>>(), vec!["a.xml", "b.xml"]);
        assert_eq!(package.entry_str("a.xml"), Some("<a></a>"));
        assert_eq!(package.entry("b.xml"), Some(&b"<b/>"[..]));
        assert_eq!(package.entry("c.xml"), None);
    }

    #[test]
    fn test_write_without_entry_fails() {
        let mut package = MemoryPackage::new();
        let result = package.write(b"data");
        assert!(matches!(result, Err(XlsxStreamError::State(_))));
    }

    #[test]
    fn test_duplicate_and_unsafe_entries_are_rejected() {
        let mut package = MemoryPackage::new();
        package.append("a.xml", b"").unwrap();
        assert!(matches!(
            package.append("a.xml", b""),
            Err(XlsxStreamError::Zip(_))
        ));
        assert!(matches!(
            package.start_entry("../a.xml"),
            Err(XlsxStreamError::Config(_))
        ));
    }

    #[test]
    fn test_zip_package_round_trip() {
        let mut package = ZipPackage::new(Cursor::new(Vec::new()), &ArchiveOptions::default()).unwrap();
        package.start_entry("xl/worksheets/sheet1.xml").unwrap();
        package.write(b"<worksheet>").unwrap();
        package.write(b"</worksheet>").unwrap();
        package.append("xl/sharedStrings.xml", b"<sst/>").unwrap();
        let cursor = package.finalize().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), 2);

        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet)
            .unwrap();
        assert_eq!(sheet, "<worksheet></worksheet>");
    }

    #[test]
    fn test_archive_option_validation() {
        let stored_with_level = ArchiveOptions {
            compression: Compression::Stored,
            compression_level: Some(3),
            large_file: false,
        };
        assert!(matches!(
            ZipPackage::new(Cursor::new(Vec::new()), &stored_with_level),
            Err(XlsxStreamError::Config(_))
        ));

        let bad_level = ArchiveOptions {
            compression_level: Some(42),
            ..ArchiveOptions::default()
        };
        assert!(matches!(
            ZipPackage::new(Cursor::new(Vec::new()), &bad_level),
            Err(XlsxStreamError::Config(_))
        ));

        let stored = ArchiveOptions {
            compression: Compression::Stored,
            ..ArchiveOptions::default()
        };
        assert!(ZipPackage::new(Cursor::new(Vec::new()), &stored).is_ok());
    }
}
