//! 患者データのフォーム入力
//!
//! 計算フォームのテキスト入力欄は固定順:
//! 0-4 が Doctor Name, Patient Name, Patient ID, Lens Factor, A Constant、
//! 5 以降は右眼(OD)と左眼(OS)が交互に並ぶ測定値グリッド。

use crate::browser::CalculatorPage;
use barrett_common::PatientRecord;

/// 右眼の最初の入力欄
pub const OD_FIRST_INPUT: usize = 5;
/// 右眼の入力欄の間隔（OD/OSが交互）
pub const OD_INPUT_STRIDE: usize = 2;

/// フィールドと入力欄位置の対応
pub fn field_slots(record: &PatientRecord) -> Vec<(usize, &'static str, Option<String>)> {
    let header = record
        .header_fields()
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| (i, name, value));

    let od = record
        .od_fields()
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| (OD_FIRST_INPUT + OD_INPUT_STRIDE * i, name, value));

    header.chain(od).collect()
}

/// 入力結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    pub filled: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl FillReport {
    /// 値のある項目がすべて入力に失敗したら入力エラー
    pub fn is_success(&self) -> bool {
        !(self.filled == 0 && self.failed > 0)
    }
}

/// 患者データをフォームに入力
///
/// 入力欄が取得できない・1つもない場合は `None`（入力エラー）。
pub async fn fill_form<P>(page: &mut P, record: &PatientRecord) -> Option<FillReport>
where
    P: CalculatorPage + ?Sized,
{
    let available = match page.text_input_count().await {
        Ok(0) => {
            tracing::error!("テキスト入力欄が見つかりません");
            return None;
        }
        Ok(n) => n,
        Err(e) => {
            tracing::error!("データ入力エラー: {}", e);
            return None;
        }
    };

    let mut report = FillReport::default();
    for (index, name, value) in field_slots(record) {
        let Some(value) = value else {
            report.skipped += 1;
            continue;
        };
        if index >= available {
            tracing::warn!("{}用のフィールドが見つかりません (入力欄{}個)", name, available);
            report.skipped += 1;
            continue;
        }

        match page.fill_text_input(index, &value).await {
            Ok(()) => {
                tracing::debug!("{}入力完了: {}", name, value);
                report.filled += 1;
            }
            Err(e) => {
                tracing::warn!("{}入力スキップ: {}", name, e);
                report.failed += 1;
            }
        }
    }

    if report.is_success() {
        tracing::info!("データ入力完了 ({}項目)", report.filled);
        Some(report)
    } else {
        tracing::error!("すべての項目の入力に失敗しました");
        None
    }
}
