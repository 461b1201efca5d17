//! XML Templates Module
//!
//! パッケージを構成する固定XMLパートと、シートXMLの断片を組み立てる関数群。
//! 固定パートは単一シート構成（`xl/worksheets/sheet1.xml`）を前提としています。

use std::borrow::Cow;

use quick_xml::escape::{escape, partial_escape};

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub(crate) const ROOT_RELS_PART: &str = "_rels/.rels";
pub(crate) const WORKBOOK_PART: &str = "xl/workbook.xml";
pub(crate) const STYLES_PART: &str = "xl/styles.xml";
pub(crate) const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub(crate) const SHEET_PART: &str = "xl/worksheets/sheet1.xml";
pub(crate) const SHEET_RELS_PART: &str = "xl/worksheets/_rels/sheet1.xml.rels";
pub(crate) const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// 日付セルに適用するスタイル（`STYLES`の`cellXfs`の2番目）
pub(crate) const DATE_STYLE_INDEX: u32 = 1;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(crate) const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    r#"</Types>"#,
);

pub(crate) const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

pub(crate) const WORKBOOK: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    r#"<bookViews><workbookView activeTab="0"/></bookViews>"#,
    r#"<sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>"#,
    r#"</workbook>"#,
);

pub(crate) const WORKBOOK_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
    r#"</Relationships>"#,
);

pub(crate) const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd hh:mm:ss"/></numFmts>"#,
    r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="2">"#,
    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#,
    r#"</cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#,
);

pub(crate) const SHEET_HEADER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    r#"<sheetViews><sheetView workbookViewId="0"/></sheetViews>"#,
    r#"<sheetFormatPr defaultRowHeight="15"/>"#,
);

pub(crate) const SHEET_FOOTER: &str = concat!(
    r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
    r#"</worksheet>"#,
);

pub(crate) const SHEET_DATA_HEADER: &str = "<sheetData>";
pub(crate) const SHEET_DATA_FOOTER: &str = "</sheetData>";
pub(crate) const EMPTY_SHEET_DATA: &str = "<sheetData/>";

pub(crate) const END_ROW: &str = "</row>";

pub(crate) const STRINGS_FOOTER: &str = "</sst>";

const RELATIONSHIPS_HEADER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
);
const RELATIONSHIPS_FOOTER: &str = "</Relationships>";
const REL_TYPE_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// 要素テキスト用のエスケープ（`&`, `<`, `>`）
pub(crate) fn escape_text(s: &str) -> Cow<'_, str> {
    partial_escape(s)
}

/// 属性値用のエスケープ（引用符も含む）
pub(crate) fn escape_attr(s: &str) -> Cow<'_, str> {
    escape(s)
}

/// `<cols>`ブロックを生成（`widths`は列1から順）
pub(crate) fn columns(widths: &[f64]) -> String {
    if widths.is_empty() {
        return String::new();
    }
    let mut xml = String::with_capacity(16 + widths.len() * 56);
    xml.push_str("<cols>");
    for (i, width) in widths.iter().enumerate() {
        let index = i + 1;
        xml.push_str(&format!(
            r#"<col min="{index}" max="{index}" width="{width}" customWidth="1"/>"#
        ));
    }
    xml.push_str("</cols>");
    xml
}

pub(crate) fn push_start_row(buf: &mut String, row: u32) {
    buf.push_str(&format!(r#"<row r="{}">"#, row));
}

pub(crate) fn push_shared_string_cell(buf: &mut String, cell: &str, index: u32) {
    buf.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, cell, index));
}

pub(crate) fn push_number_cell(buf: &mut String, cell: &str, value: f64) {
    buf.push_str(&format!(r#"<c r="{}" t="n"><v>{}</v></c>"#, cell, value));
}

pub(crate) fn push_date_cell(buf: &mut String, cell: &str, serial: f64) {
    buf.push_str(&format!(
        r#"<c r="{}" s="{}" t="n"><v>{}</v></c>"#,
        cell, DATE_STYLE_INDEX, serial
    ));
}

pub(crate) fn strings_header(count: u64, unique_count: usize) -> String {
    format!(
        r#"{}<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
        XML_DECL, count, unique_count
    )
}

/// XML 1.0で文書中に置ける文字かどうか
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// `_x`の直後が`HHHH_`（16進4桁とアンダースコア）になっているか
fn starts_escape_sequence(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    bytes.len() >= 7
        && bytes[0] == b'_'
        && bytes[1] == b'x'
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

/// 共有文字列の値をST_Xstring形式にエンコードする
///
/// XMLに置けない文字は`_xHHHH_`に置き換えます。元の文字列に`_xHHHH_`と
/// 同じ並びがある場合は先頭の`_`を`_x005F_`にして、読み込み時に
/// 元の文字列へ戻るようにします。
pub(crate) fn encode_xstring(s: &str) -> Cow<'_, str> {
    let needs_encoding = s
        .char_indices()
        .any(|(i, c)| !is_xml_char(c) || (c == '_' && starts_escape_sequence(&s[i..])));
    if !needs_encoding {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for (i, c) in s.char_indices() {
        if c == '_' && starts_escape_sequence(&s[i..]) {
            out.push_str("_x005F_");
        } else if is_xml_char(c) {
            out.push(c);
        } else {
            out.push_str(&format!("_x{:04X}_", u32::from(c)));
        }
    }
    Cow::Owned(out)
}

pub(crate) fn push_string_item(buf: &mut String, value: &str) {
    let encoded = encode_xstring(value);
    let escaped = escape_text(&encoded);
    let preserve = value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace);
    if preserve {
        buf.push_str(r#"<si><t xml:space="preserve">"#);
    } else {
        buf.push_str("<si><t>");
    }
    buf.push_str(&escaped);
    buf.push_str("</t></si>");
}

/// シートXML内の`<hyperlinks>`ブロック（`cells`の順にrId1, rId2, ...）
pub(crate) fn hyperlinks<'a>(cells: impl ExactSizeIterator<Item = &'a str>) -> String {
    if cells.len() == 0 {
        return String::new();
    }
    let mut xml = String::from("<hyperlinks>");
    for (i, cell) in cells.enumerate() {
        xml.push_str(&format!(r#"<hyperlink ref="{}" r:id="rId{}"/>"#, cell, i + 1));
    }
    xml.push_str("</hyperlinks>");
    xml
}

/// 外部ハイパーリンクの`Relationship`要素（`targets`の順にrId1, rId2, ...）
pub(crate) fn external_relationships<'a>(targets: impl Iterator<Item = &'a str>) -> String {
    let mut xml = String::new();
    for (i, target) in targets.enumerate() {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}" Target="{}" TargetMode="External"/>"#,
            i + 1,
            REL_TYPE_HYPERLINK,
            escape_attr(target)
        ));
    }
    xml
}

/// `Relationship`要素列を`<Relationships>`コンテナで包んでパート全体にする
pub(crate) fn relationships_part(body: &str) -> String {
    let mut xml = String::with_capacity(RELATIONSHIPS_HEADER.len() + body.len() + 16);
    xml.push_str(RELATIONSHIPS_HEADER);
    xml.push_str(body);
    xml.push_str(RELATIONSHIPS_FOOTER);
    xml
}

/// 固定テンプレートのパート（パス, 内容）
pub(crate) fn static_parts() -> [(&'static str, &'static str); 5] {
    [
        (CONTENT_TYPES_PART, CONTENT_TYPES),
        (ROOT_RELS_PART, ROOT_RELS),
        (WORKBOOK_PART, WORKBOOK),
        (STYLES_PART, STYLES),
        (WORKBOOK_RELS_PART, WORKBOOK_RELS),
    ]
}
