//! 計算実行と結果取得

use crate::browser::CalculatorPage;
use crate::config::Config;
use crate::error::{BarrettError, Result};
use barrett_common::{ExtractionResult, RefractionExtractor, ResultPage, TableLayout};
use std::path::Path;

pub const CALCULATE_BUTTON: &str = r#"input[value="Calculate"]"#;
pub const UNIVERSAL_FORMULA_TAB: &str = "Universal Formula";

/// Calculate → Universal Formula タブ → 結果テーブルから抽出
///
/// ボタン・タブがない、ドライバのエラー、一致なしはいずれも `NotFound`。
pub async fn calculate_and_extract<P>(
    page: &mut P,
    extractor: &RefractionExtractor,
    target: f64,
    config: &Config,
) -> ExtractionResult
where
    P: CalculatorPage + ?Sized,
{
    match run_calculation(page, extractor, target, config).await {
        Ok(result) => {
            if !result.is_found() {
                tracing::warn!("Barrett値が見つかりません: IOL Power {}", target);
            }
            result
        }
        Err(e) => {
            tracing::error!("計算処理エラー: {}", e);
            ExtractionResult::NotFound
        }
    }
}

async fn run_calculation<P>(
    page: &mut P,
    extractor: &RefractionExtractor,
    target: f64,
    config: &Config,
) -> Result<ExtractionResult>
where
    P: CalculatorPage + ?Sized,
{
    if !page.click_first(CALCULATE_BUTTON).await? {
        tracing::error!("Calculateボタンが見つかりません");
        return Ok(ExtractionResult::NotFound);
    }
    tracing::info!("Calculateボタンをクリックしました");
    page.pause(config.timing.calculate()).await;

    if !page.click_link_containing(UNIVERSAL_FORMULA_TAB).await? {
        tracing::error!("Universal Formulaタブが見つかりません");
        return Ok(ExtractionResult::NotFound);
    }
    tracing::info!("Universal Formulaタブをクリックしました");
    page.pause(config.timing.tab_switch()).await;

    page.pause(config.timing.table()).await;
    let markup = match &config.result_frame {
        Some(frame) => page.frame_content(frame).await?,
        None => page.content().await?,
    };

    Ok(extractor.extract(&ResultPage::parse(markup), target))
}

/// 保存済みの結果ページ（HTMLファイル）から抽出
pub fn extract_saved_page(path: &Path, target: f64, layout: TableLayout) -> Result<ExtractionResult> {
    if !path.exists() {
        return Err(BarrettError::FileNotFound(path.display().to_string()));
    }
    let markup = std::fs::read_to_string(path)?;
    Ok(RefractionExtractor::new(layout).extract(&ResultPage::parse(markup), target))
}
