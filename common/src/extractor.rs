//! Refraction抽出
//!
//! 抽出の流れ:
//! 1. 結果テーブルを文書順に走査（IOL Powerが許容誤差内で一致する最初の行）
//! 2. 見つからなければ代替ストラテジーを順番に試す
//! 3. すべて失敗したら「見つからない」
//!
//! 1患者ごとに毎回作り直し、行をまたいだ状態は持たない。

use crate::fallback::{default_strategies, FallbackStrategy};
use crate::table::{highlighted_texts, parse_rows, scan_rows, ExtractionKey, ResultRow, TableLayout};
use scraper::Html;

/// 描画済み結果ページ
///
/// 生のマークアップと、そこから解析した行・強調表示行を保持する。
#[derive(Debug, Clone, Default)]
pub struct ResultPage {
    markup: String,
    rows: Vec<ResultRow>,
    highlighted: Vec<String>,
}

impl ResultPage {
    /// マークアップを解析して構築
    pub fn parse(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let document = Html::parse_document(&markup);
        let rows = parse_rows(&document);
        let highlighted = highlighted_texts(&document);
        Self {
            markup,
            rows,
            highlighted,
        }
    }

    /// 行を直接指定して構築（マークアップなし）
    pub fn from_rows(rows: Vec<ResultRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn highlighted(&self) -> &[String] {
        &self.highlighted
    }
}

/// 値の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// テーブル走査（行番号）
    Table { row_index: usize },
    /// 代替ストラテジー
    Fallback(&'static str),
}

impl std::fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionSource::Table { row_index } => write!(f, "テーブル{}行目", row_index + 1),
            ExtractionSource::Fallback(name) => write!(f, "代替方法({})", name),
        }
    }
}

/// 抽出結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtractionResult {
    Found { value: f64, source: ExtractionSource },
    NotFound,
}

impl ExtractionResult {
    pub fn value(&self) -> Option<f64> {
        match self {
            ExtractionResult::Found { value, .. } => Some(*value),
            ExtractionResult::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ExtractionResult::Found { .. })
    }
}

/// Refraction抽出器
pub struct RefractionExtractor {
    layout: TableLayout,
    strategies: Vec<Box<dyn FallbackStrategy>>,
}

impl Default for RefractionExtractor {
    fn default() -> Self {
        Self::new(TableLayout::default())
    }
}

impl RefractionExtractor {
    /// 既定の代替ストラテジーで構築
    pub fn new(layout: TableLayout) -> Self {
        Self::with_strategies(layout, default_strategies())
    }

    pub fn with_strategies(layout: TableLayout, strategies: Vec<Box<dyn FallbackStrategy>>) -> Self {
        Self { layout, strategies }
    }

    pub fn layout(&self) -> TableLayout {
        self.layout
    }

    /// 目標IOL Powerに対応するRefractionを抽出
    pub fn extract(&self, page: &ResultPage, target: f64) -> ExtractionResult {
        let key = ExtractionKey::new(target);

        if let Some(hit) = scan_rows(page.rows(), &key, self.layout) {
            tracing::info!(
                "テーブルから抽出: IOL Power {} → Refraction {}",
                hit.power,
                hit.refraction
            );
            return ExtractionResult::Found {
                value: hit.refraction,
                source: ExtractionSource::Table {
                    row_index: hit.row_index,
                },
            };
        }

        tracing::debug!(rows = page.rows().len(), "テーブルに一致行なし、代替方法を試行");

        for strategy in &self.strategies {
            if let Some(value) = strategy.find(page, &key) {
                tracing::info!(
                    "代替方法({})で抽出: IOL Power {} → Refraction {}",
                    strategy.name(),
                    target,
                    value
                );
                return ExtractionResult::Found {
                    value,
                    source: ExtractionSource::Fallback(strategy.name()),
                };
            }
        }

        ExtractionResult::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    const RESULT_TABLE: &str = r#"
        <html><body>
        <table>
            <tr><th>IOL Power</th><th>Optic</th><th>Refraction</th></tr>
            <tr><td>21.5</td><td>Biconvex</td><td>1.25</td></tr>
            <tr><td>22.0</td><td>Biconvex</td><td>1.75</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_end_to_end_table() {
        let extractor = RefractionExtractor::default();
        let page = ResultPage::parse(RESULT_TABLE);

        assert_eq!(extractor.extract(&page, 21.5).value(), Some(1.25));
        assert_eq!(extractor.extract(&page, 22.05).value(), Some(1.75));
        assert_eq!(
            extractor.extract(&page, 21.5),
            ExtractionResult::Found {
                value: 1.25,
                source: ExtractionSource::Table { row_index: 1 }
            }
        );
    }

    #[test]
    fn test_no_match_and_no_fallback_candidate() {
        let extractor = RefractionExtractor::default();
        let page = ResultPage::parse(RESULT_TABLE);
        assert_eq!(extractor.extract(&page, 25.0), ExtractionResult::NotFound);
    }

    #[test]
    fn test_negative_refraction() {
        let page = ResultPage::from_rows(vec![ResultRow::new(["21.5", "Biconvex", "-2.75"])]);
        let result = RefractionExtractor::default().extract(&page, 21.5);
        assert_eq!(result.value(), Some(-2.75));
    }

    #[test]
    fn test_fallback_used_when_table_shape_differs() {
        // 2列のテーブルは WithOptic では解析失敗 → 代替方法で拾う
        let page = ResultPage::parse(
            "<table><tr><td>21.5</td><td>0.62</td></tr></table>",
        );
        let result = RefractionExtractor::new(TableLayout::WithOptic).extract(&page, 21.5);
        assert_eq!(
            result,
            ExtractionResult::Found {
                value: 0.62,
                source: ExtractionSource::Fallback("cell-bounded")
            }
        );

        let result = RefractionExtractor::new(TableLayout::Compact).extract(&page, 21.5);
        assert!(matches!(result.value(), Some(v) if v == 0.62));
        assert!(matches!(result, ExtractionResult::Found { source: ExtractionSource::Table { .. }, .. }));
    }

    #[test]
    fn test_highlighted_row_fallback() {
        let page = ResultPage::parse(
            r#"<div class="x"><p>No pattern match</p></div>
               <table><tr class="highlighted"><th>21.5</th><th>Biconvex</th><th>1.75</th></tr></table>"#,
        );
        let extractor = RefractionExtractor::with_strategies(
            TableLayout::WithOptic,
            vec![Box::new(crate::fallback::HighlightedRow)],
        );
        assert_eq!(extractor.extract(&page, 21.5).value(), Some(1.75));
    }

    #[test]
    fn test_empty_strategy_list_reports_not_found() {
        let page = ResultPage::parse("<p>21.5 then 1.25</p>");
        let extractor = RefractionExtractor::with_strategies(TableLayout::WithOptic, Vec::new());
        assert!(!extractor.extract(&page, 21.5).is_found());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_logs_go_to_injected_subscriber() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let page = ResultPage::parse(RESULT_TABLE);
            RefractionExtractor::default().extract(&page, 22.0);
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("テーブルから抽出"));
        assert!(output.contains("1.75"));
    }
}
