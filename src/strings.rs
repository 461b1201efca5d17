//! Shared String Table Module
//!
//! テキストセルの値を重複排除し、`xl/sharedStrings.xml`として出力するモジュール。

use std::collections::HashMap;

use crate::templates;

/// 共有文字列テーブル
///
/// 初出順に0始まりのインデックスを割り当てます。同じ文字列を二度登録しても
/// 新しいインデックスは割り当てられません。
#[derive(Debug, Default)]
pub(crate) struct SharedStringTable {
    /// 文字列 -> インデックス
    index: HashMap<String, u32>,
    /// 初出順の文字列
    strings: Vec<String>,
    /// 参照の総数（`<sst count="...">`）
    references: u64,
}

impl SharedStringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 文字列を登録し、そのインデックスを返す
    pub fn intern(&mut self, value: &str) -> u32 {
        self.references += 1;
        if let Some(&idx) = self.index.get(value) {
            return idx;
        }
        let idx = self.strings.len() as u32;
        self.index.insert(value.to_owned(), idx);
        self.strings.push(value.to_owned());
        idx
    }

    /// 重複を除いた文字列の数
    pub fn unique_count(&self) -> usize {
        self.strings.len()
    }

    /// 参照の総数
    pub fn reference_count(&self) -> u64 {
        self.references
    }

    /// `xl/sharedStrings.xml`パート全体を生成
    pub fn render(&self) -> String {
        let body_len: usize = self.strings.iter().map(|s| s.len() + 16).sum();
        let mut xml = String::with_capacity(body_len + 256);
        xml.push_str(&templates::strings_header(
            self.references,
            self.strings.len(),
        ));
        for s in &self.strings {
            templates::push_string_item(&mut xml, s);
        }
        xml.push_str(templates::STRINGS_FOOTER);
        xml
    }
}
