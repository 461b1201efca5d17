//! Relationship Tracker Module
//!
//! ハイパーリンクセルが生成する外部リレーションシップを記録するモジュール。
//! 記録順のN番目（1始まり）のエントリに`rIdN`を割り当てます。

use crate::templates;

/// 1件の外部リレーションシップ
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    /// リンク元のセル参照（例: "B3"）
    pub cell: String,
    /// リンク先URL
    pub target: String,
}

/// 外部リレーションシップの記録
///
/// 重複排除は行いません。同じURLへのリンクでもセルごとに別のエントリになります。
#[derive(Debug, Default)]
pub(crate) struct RelationshipTracker {
    entries: Vec<Relationship>,
}

impl RelationshipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, cell: String, target: String) {
        self.entries.push(Relationship { cell, target });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[Relationship] {
        &self.entries
    }

    /// シートXMLに埋め込む`<hyperlinks>`ブロック（エントリがなければ空文字列）
    pub fn render_hyperlinks(&self) -> String {
        templates::hyperlinks(self.entries.iter().map(|r| r.cell.as_str()))
    }

    /// `xl/worksheets/_rels/sheet1.xml.rels`パート全体
    ///
    /// エントリがない場合も、空の`<Relationships>`コンテナとして有効なXMLを返します。
    pub fn render_part(&self) -> String {
        let body = templates::external_relationships(self.entries.iter().map(|r| r.target.as_str()));
        templates::relationships_part(&body)
    }
}
