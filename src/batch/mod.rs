//! 全患者の一括処理
//!
//! 行はスプレッドシートの順に1件ずつ処理し、失敗しても次の行へ進む。
//! 各行の結果列には数値かセンチネル文字列が入る。

mod reporter;

pub use reporter::{ConsoleReporter, Reporter};

use crate::browser::{CalculatorPage, ChromiumSession};
use crate::calculator::calculate_and_extract;
use crate::config::Config;
use crate::error::Result;
use crate::form::fill_form;
use crate::sheet::{default_output_path, load_sheet, save_sheet, PatientSheet};
use barrett_common::{PatientRecord, RefractionExtractor, RowOutcome};
use std::path::{Path, PathBuf};

/// 処理件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &RowOutcome) {
        self.total += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// ファイル単位の処理結果
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: BatchSummary,
    pub input: PathBuf,
    pub output: PathBuf,
    pub backup: Option<PathBuf>,
}

pub struct BatchRunner<'a> {
    config: &'a Config,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// 全行を処理して結果列に書き込む
    pub async fn run<P>(
        &self,
        page: &mut P,
        sheet: &mut PatientSheet,
        records: &[PatientRecord],
        reporter: &mut dyn Reporter,
    ) -> BatchSummary
    where
        P: CalculatorPage + ?Sized,
    {
        let column = sheet.result_column(&self.config.result_column);
        let mut summary = BatchSummary::default();
        reporter.start(records.len());

        for (index, record) in records.iter().enumerate() {
            let name = record.display_name(index);
            tracing::info!("処理中: {} ({}/{})", name, index + 1, records.len());
            reporter.row_started(index, &name);

            let outcome = self.process_row(page, record).await;
            match &outcome {
                RowOutcome::Value(v) => tracing::info!("成功: {} → Refraction: {}", name, v),
                RowOutcome::Failed(msg) => tracing::error!("患者処理エラー ({}): {}", name, msg),
                other => tracing::warn!("失敗: {} → {}", name, other),
            }

            sheet.record_outcome(index, column, &outcome);
            summary.record(&outcome);
            reporter.row_finished(index, &name, &outcome);

            if index + 1 < records.len() {
                page.pause(self.config.timing.between_rows()).await;
            }
        }

        tracing::info!(
            "処理完了 - 成功: {}, エラー: {}",
            summary.succeeded,
            summary.failed
        );
        reporter.finish(&summary);
        summary
    }

    /// 1患者分の処理（抽出器は毎回作り直す）
    pub async fn process_row<P>(&self, page: &mut P, record: &PatientRecord) -> RowOutcome
    where
        P: CalculatorPage + ?Sized,
    {
        match self.try_row(page, record).await {
            Ok(outcome) => outcome,
            Err(e) => RowOutcome::failed(e),
        }
    }

    async fn try_row<P>(&self, page: &mut P, record: &PatientRecord) -> Result<RowOutcome>
    where
        P: CalculatorPage + ?Sized,
    {
        let timing = &self.config.timing;

        page.open(&self.config.url).await?;
        page.pause(timing.settle()).await;

        if fill_form(page, record).await.is_none() {
            return Ok(RowOutcome::InputError);
        }
        page.pause(timing.settle()).await;

        let extractor = RefractionExtractor::new(self.config.layout);
        let result =
            calculate_and_extract(page, &extractor, record.target_power(), self.config).await;

        Ok(match result.value() {
            Some(value) => RowOutcome::Value(value),
            None => RowOutcome::CalculationError,
        })
    }
}

/// 入力ファイルを読み込み、ブラウザで全行を処理して保存
///
/// ブラウザはバッチの開始時に1回起動し、終了時に必ず閉じる。
pub async fn run_workbook(
    input: &Path,
    output: Option<&Path>,
    config: &Config,
    reporter: &mut dyn Reporter,
) -> Result<RunReport> {
    let mut sheet = load_sheet(input)?;
    let records = sheet.records()?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));

    let mut session = ChromiumSession::launch(config).await?;
    let summary = BatchRunner::new(config)
        .run(&mut session, &mut sheet, &records, reporter)
        .await;
    if let Err(e) = session.close().await {
        tracing::warn!("ブラウザ終了エラー: {}", e);
    }

    let backup = save_sheet(&sheet, &output)?;

    Ok(RunReport {
        summary,
        input: input.to_path_buf(),
        output,
        backup,
    })
}
