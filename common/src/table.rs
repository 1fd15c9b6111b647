//! 結果テーブルの構造化スキャン
//!
//! 描画済みの結果ページから `table tr` / `td` を文書順に取り出し、
//! IOL Power列が目標値と許容誤差内で一致する最初の行のRefractionを返す。

use crate::error::Error;
use crate::numeric::{scan_power, scan_signed};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

lazy_static::lazy_static! {
    static ref ROW_SEL: Selector = Selector::parse("table tr").unwrap();
    static ref CELL_SEL: Selector = Selector::parse("td").unwrap();
    static ref HIGHLIGHT_SEL: Selector =
        Selector::parse(r#"tr[style*="background"], tr.highlighted"#).unwrap();
}

/// IOL Powerの一致判定に使う許容誤差（絶対差）
pub const POWER_TOLERANCE: f64 = 0.1;

/// 検索キー（目標IOL Powerと許容誤差）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionKey {
    pub target: f64,
    pub tolerance: f64,
}

impl ExtractionKey {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            tolerance: POWER_TOLERANCE,
        }
    }

    /// `abs(value - target) < tolerance`
    pub fn matches(&self, value: f64) -> bool {
        (value - self.target).abs() < self.tolerance
    }
}

/// 結果テーブルの1行（セル文字列の並び）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRow {
    pub cells: Vec<String>,
}

impl ResultRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

/// 結果テーブルの列構成
///
/// 1回の実行で有効なのは1つだけ。構成に合わない行は解析失敗として読み飛ばす。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableLayout {
    /// IOL Power | Optic | Refraction
    #[default]
    WithOptic,
    /// IOL Power | Refraction（フレーム表示版）
    Compact,
}

impl TableLayout {
    /// 1行に必要な最小セル数
    pub fn min_cells(&self) -> usize {
        match self {
            TableLayout::WithOptic => 3,
            TableLayout::Compact => 2,
        }
    }

    /// Refraction列の位置
    pub fn refraction_column(&self) -> usize {
        match self {
            TableLayout::WithOptic => 2,
            TableLayout::Compact => 1,
        }
    }
}

impl std::str::FromStr for TableLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "with-optic" | "optic" | "3" => Ok(TableLayout::WithOptic),
            "compact" | "2" => Ok(TableLayout::Compact),
            _ => Err(Error::Parse(format!(
                "Unknown layout: {}. Use with-optic or compact",
                s
            ))),
        }
    }
}

impl std::fmt::Display for TableLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableLayout::WithOptic => write!(f, "with-optic"),
            TableLayout::Compact => write!(f, "compact"),
        }
    }
}

/// テーブル一致結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableHit {
    /// 文書順の行番号（0始まり）
    pub row_index: usize,
    pub power: f64,
    pub refraction: f64,
}

/// 行を文書順に走査し、最初に一致した行のRefractionを返す
pub fn scan_rows(rows: &[ResultRow], key: &ExtractionKey, layout: TableLayout) -> Option<TableHit> {
    for (row_index, row) in rows.iter().enumerate() {
        if row.len() < layout.min_cells() {
            tracing::trace!(row_index, cells = row.len(), "セル数不足のためスキップ");
            continue;
        }

        let Some(power) = row.cell(0).and_then(scan_power) else {
            continue;
        };

        if !key.matches(power) {
            continue;
        }

        match row.cell(layout.refraction_column()).and_then(scan_signed) {
            Some(refraction) => {
                return Some(TableHit {
                    row_index,
                    power,
                    refraction,
                });
            }
            None => {
                tracing::debug!(row_index, power, "一致行のRefractionが数値ではありません");
            }
        }
    }

    None
}

/// 文書内の `table tr` をセル文字列の行に変換
pub fn parse_rows(document: &Html) -> Vec<ResultRow> {
    document
        .select(&ROW_SEL)
        .map(|tr| ResultRow {
            cells: tr.select(&CELL_SEL).map(element_text).collect(),
        })
        .collect()
}

/// 強調表示された行（背景色スタイルまたは `highlighted` クラス）のテキスト
pub fn highlighted_texts(document: &Html) -> Vec<String> {
    document.select(&HIGHLIGHT_SEL).map(element_text).collect()
}

/// 要素内テキストを空白で連結して返す
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> ResultRow {
        ResultRow::new(cells.iter().copied())
    }

    #[test]
    fn test_tolerance_boundaries() {
        let key = ExtractionKey::new(21.0);
        assert!(key.matches(21.0));
        assert!(key.matches(21.05));
        assert!(key.matches(21.099));
        assert!(!key.matches(21.15));
        assert!(!key.matches(20.85));
    }

    #[test]
    fn test_scan_rows_returns_third_cell() {
        let rows = vec![
            row(&["IOL Power", "Optic", "Refraction"]),
            row(&["21.5", "Biconvex", "1.25"]),
            row(&["22.0", "Biconvex", "1.75"]),
        ];
        let hit = scan_rows(&rows, &ExtractionKey::new(21.5), TableLayout::WithOptic).unwrap();
        assert_eq!(hit.refraction, 1.25);
        assert_eq!(hit.row_index, 1);
    }

    #[test]
    fn test_scan_rows_within_tolerance() {
        let rows = vec![row(&["21.45", "Biconvex", "1.25"])];
        let hit = scan_rows(&rows, &ExtractionKey::new(21.5), TableLayout::WithOptic);
        assert_eq!(hit.map(|h| h.refraction), Some(1.25));
    }

    #[test]
    fn test_first_match_wins() {
        let rows = vec![
            row(&["21.50", "Biconvex", "-0.10"]),
            row(&["21.52", "Biconvex", "-0.40"]),
        ];
        let hit = scan_rows(&rows, &ExtractionKey::new(21.5), TableLayout::WithOptic).unwrap();
        assert_eq!(hit.refraction, -0.10);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let rows = vec![row(&["21.5"]), row(&["21.5", "1.25"])];
        assert!(scan_rows(&rows, &ExtractionKey::new(21.5), TableLayout::WithOptic).is_none());
    }

    #[test]
    fn test_compact_layout_reads_second_cell() {
        let rows = vec![row(&["IOL Power", "Refraction"]), row(&["21.5", "-0.25"])];
        let hit = scan_rows(&rows, &ExtractionKey::new(21.5), TableLayout::Compact).unwrap();
        assert_eq!(hit.refraction, -0.25);
    }

    #[test]
    fn test_non_numeric_refraction_continues_scan() {
        let rows = vec![
            row(&["21.5", "Biconvex", "--"]),
            row(&["21.5", "Biconvex", "0.33"]),
        ];
        let hit = scan_rows(&rows, &ExtractionKey::new(21.5), TableLayout::WithOptic).unwrap();
        assert_eq!(hit.row_index, 1);
        assert_eq!(hit.refraction, 0.33);
    }

    #[test]
    fn test_parse_rows_from_markup() {
        let html = Html::parse_document(
            r#"<table>
                <tr><th>IOL Power</th><th>Optic</th><th>Refraction</th></tr>
                <tr><td> 21.5 </td><td>Biconvex</td><td><b>1.25</b></td></tr>
            </table>"#,
        );
        let rows = parse_rows(&html);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1].cells, vec!["21.5", "Biconvex", "1.25"]);
    }

    #[test]
    fn test_highlighted_texts() {
        let html = Html::parse_document(
            r#"<table>
                <tr><td>21.0</td><td>Biconvex</td><td>1.50</td></tr>
                <tr style="background-color: #9cf"><td>21.5</td><td>Biconvex</td><td>1.75</td></tr>
                <tr class="highlighted"><td>22.0</td><td>Biconvex</td><td>2.00</td></tr>
            </table>"#,
        );
        let texts = highlighted_texts(&html);
        assert_eq!(texts, vec!["21.5 Biconvex 1.75", "22.0 Biconvex 2.00"]);
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("with-optic".parse::<TableLayout>().unwrap(), TableLayout::WithOptic);
        assert_eq!("Compact".parse::<TableLayout>().unwrap(), TableLayout::Compact);
        assert!("four".parse::<TableLayout>().is_err());
    }
}
