//! Limits Module
//!
//! ワークシートの寸法制限と、アーカイブエントリのパス検証を提供するモジュール。

/// ワークシートの最大行数（1,048,576）
pub const MAX_ROWS: u32 = 1_048_576;

/// ワークシートの最大列数（16,384 = "XFD"）
pub const MAX_COLUMNS: u32 = 16_384;

/// ワークシートの寸法制限
///
/// 既定値はExcelの上限と同じです。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SheetLimits {
    pub max_rows: u32,
    pub max_columns: u32,
}

impl Default for SheetLimits {
    fn default() -> Self {
        Self {
            max_rows: MAX_ROWS,
            max_columns: MAX_COLUMNS,
        }
    }
}

impl SheetLimits {
    /// 行番号（1始まり）が上限内かを検証
    pub fn check_row(&self, row: u32) -> Result<(), String> {
        if row > self.max_rows {
            return Err(format!(
                "row {} exceeds the maximum of {} rows",
                row, self.max_rows
            ));
        }
        Ok(())
    }

    /// 列数が上限内かを検証
    pub fn check_columns(&self, count: usize) -> Result<(), String> {
        if count > self.max_columns as usize {
            return Err(format!(
                "{} columns exceed the maximum of {} columns",
                count, self.max_columns
            ));
        }
        Ok(())
    }
}

/// アーカイブエントリのパスを検証
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（空、絶対パス、`..`、`\`を含む）
pub(crate) fn validate_entry_path(path: &str) -> Result<(), String> {
    // 空のパスは拒否
    if path.is_empty() {
        return Err("Empty entry path is not allowed".to_string());
    }

    // 絶対パスを拒否（Unix形式の`/`、Windows形式のドライブレター）
    let bytes = path.as_bytes();
    if path.starts_with('/') || (bytes.len() >= 2 && bytes[1] == b':') {
        return Err(format!("Absolute entry path is not allowed: {}", path));
    }

    // `..`セグメントを拒否
    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    // `\`を含むパスを拒否（ZIPのパス区切りは`/`のみ）
    if path.contains('\\') {
        return Err(format!("Backslash in entry path is not allowed: {}", path));
    }

    Ok(())
}
