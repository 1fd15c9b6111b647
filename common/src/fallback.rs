//! 代替抽出ストラテジー
//!
//! テーブル走査で値が得られなかった場合に順番に試す。
//! 各ストラテジーは独立しており、単体でテストできる。

use crate::extractor::ResultPage;
use crate::numeric::{format_decimal, scan_signed, scan_trailing_signed};
use crate::table::ExtractionKey;
use regex::Regex;

/// 代替抽出の1手順
pub trait FallbackStrategy: Send + Sync {
    /// ログ出力用の名前
    fn name(&self) -> &'static str;

    /// 値が見つかれば返す
    fn find(&self, page: &ResultPage, key: &ExtractionKey) -> Option<f64>;
}

/// マークアップ用パターンの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupPattern {
    /// `{T}\s*</td>.*?(-?\d+\.?\d*)</td>`
    CellBounded,
    /// `>{T}<.*?(-?\d+\.?\d*)`
    TagBounded,
    /// `{T}.*?(-?\d+\.?\d*)`
    Loose,
}

impl MarkupPattern {
    /// 目標値リテラルを埋め込んだ正規表現
    ///
    /// リテラルはエスケープする（"21.5" の `.` が任意文字にならないように）。
    pub fn build(&self, target: f64) -> Option<Regex> {
        let literal = regex::escape(&format_decimal(target));
        let pattern = match self {
            MarkupPattern::CellBounded => format!(r"(?s){}\s*</td>.*?(-?\d+\.?\d*)</td>", literal),
            MarkupPattern::TagBounded => format!(r"(?s)>{}<.*?(-?\d+\.?\d*)", literal),
            MarkupPattern::Loose => format!(r"(?s){}.*?(-?\d+\.?\d*)", literal),
        };
        Regex::new(&pattern).ok()
    }
}

impl FallbackStrategy for MarkupPattern {
    fn name(&self) -> &'static str {
        match self {
            MarkupPattern::CellBounded => "cell-bounded",
            MarkupPattern::TagBounded => "tag-bounded",
            MarkupPattern::Loose => "loose",
        }
    }

    fn find(&self, page: &ResultPage, key: &ExtractionKey) -> Option<f64> {
        let re = self.build(key.target)?;
        re.captures(page.markup())
            .and_then(|cap| cap.get(1))
            .and_then(|m| scan_signed(m.as_str()))
    }
}

/// 強調表示行から末尾の数値を取り出す
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightedRow;

impl FallbackStrategy for HighlightedRow {
    fn name(&self) -> &'static str {
        "highlighted-row"
    }

    fn find(&self, page: &ResultPage, key: &ExtractionKey) -> Option<f64> {
        let literal = format_decimal(key.target);
        page.highlighted()
            .iter()
            .filter(|text| text.contains(&literal))
            .find_map(|text| scan_trailing_signed(text))
    }
}

/// 既定の試行順
///
/// 境界のはっきりしたパターンから順に、最後に強調表示行を見る。
/// 旧版のスクリプトはゆるいパターンを先に試しており、本文中の目標値
/// （"Target IOL 21.5 D" など）の直後の数値を拾ってしまうため順序を変えている。
pub fn default_strategies() -> Vec<Box<dyn FallbackStrategy>> {
    vec![
        Box::new(MarkupPattern::CellBounded),
        Box::new(MarkupPattern::TagBounded),
        Box::new(MarkupPattern::Loose),
        Box::new(HighlightedRow),
    ]
}
