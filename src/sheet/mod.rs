//! 患者データのスプレッドシート入出力
//!
//! 先頭シートの1行目をヘッダーとし、以降を患者行として保持する。
//! 結果列はヘッダーになければ末尾に追加する。

mod reader;
mod writer;

pub use reader::load_sheet;
pub use writer::{backup_path, default_output_path, save_sheet};

use crate::error::Result;
use barrett_common::{CellValue, Column, ColumnMap, PatientRecord, RowOutcome};

/// 結果列名が入力列と重なる場合の出力列
pub const FALLBACK_RESULT_COLUMN: &str = "Barrett";

/// 読み込んだ表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientSheet {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl PatientSheet {
    pub fn new(sheet_name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            headers,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> ColumnMap {
        ColumnMap::from_headers(&self.headers)
    }

    /// 全行を患者レコードに変換
    ///
    /// 行があるのにIOLPower列がない場合はエラー。
    pub fn records(&self) -> Result<Vec<PatientRecord>> {
        let columns = self.columns();
        if !self.rows.is_empty() {
            columns.require(Column::IolPower)?;
        }

        for missing in columns.missing() {
            if missing != Column::IolPower {
                tracing::debug!("列がありません（空欄として扱います）: {}", missing.canonical());
            }
        }

        Ok(self
            .rows
            .iter()
            .map(|cells| PatientRecord::from_cells(&columns, cells))
            .collect())
    }

    /// 結果列の位置（なければヘッダー末尾に追加）
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(pos) = self.headers.iter().position(|h| h.trim() == name) {
            return pos;
        }
        self.headers.push(name.to_string());
        self.headers.len() - 1
    }

    /// 結果を書き込む列の位置
    ///
    /// 指定名の列が入力列（旧形式の "Refraction" など）に当たる場合は
    /// 入力値を上書きしないよう `Barrett` 列に書き込む。
    pub fn result_column(&mut self, preferred: &str) -> usize {
        let columns = self.columns();
        let collides = self
            .headers
            .iter()
            .position(|h| h.trim() == preferred)
            .is_some_and(|pos| columns.is_input_position(pos));

        if collides {
            tracing::warn!(
                "出力列 {} は入力列のため {} 列に書き込みます",
                preferred,
                FALLBACK_RESULT_COLUMN
            );
            return self.ensure_column(FALLBACK_RESULT_COLUMN);
        }
        self.ensure_column(preferred)
    }

    /// セルに値を設定（行が短ければ空セルで埋める）
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        let Some(cells) = self.rows.get_mut(row) else {
            return;
        };
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    /// 行の処理結果を結果列に書き込む
    pub fn record_outcome(&mut self, row: usize, col: usize, outcome: &RowOutcome) {
        self.set_cell(row, col, outcome.to_cell());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> PatientSheet {
        PatientSheet::new(
            "Sheet1",
            vec!["PatientName".into(), "IOLPower".into()],
            vec![
                vec![CellValue::Text("A".into()), CellValue::Number(21.5)],
                vec![CellValue::Text("B".into())],
            ],
        )
    }

    #[test]
    fn test_ensure_column_appends_once() {
        let mut sheet = sheet();
        let col = sheet.ensure_column("Refraction");
        assert_eq!(col, 2);
        assert_eq!(sheet.ensure_column("Refraction"), 2);
        assert_eq!(sheet.headers.len(), 3);
    }

    #[test]
    fn test_ensure_column_reuses_existing() {
        let mut sheet = sheet();
        assert_eq!(sheet.ensure_column("IOLPower"), 1);
    }

    #[test]
    fn test_result_column_avoids_legacy_input() {
        let mut sheet = PatientSheet::new(
            "Sheet1",
            vec!["Patient Name".into(), "Refraction".into(), "IOL Power".into()],
            vec![vec![
                CellValue::Text("A".into()),
                CellValue::Number(-0.5),
                CellValue::Number(21.5),
            ]],
        );
        assert_eq!(sheet.result_column("Refraction"), 3);
        assert_eq!(sheet.headers[3], "Barrett");
        assert_eq!(sheet.result_column("Refraction"), 3);
    }

    #[test]
    fn test_result_column_reuses_previous_output() {
        let mut sheet = sheet();
        sheet.headers.push("Refraction".into());
        assert_eq!(sheet.result_column("Refraction"), 2);
        assert_eq!(sheet.headers.len(), 3);
    }

    #[test]
    fn test_set_cell_pads_short_row() {
        let mut sheet = sheet();
        sheet.record_outcome(1, 2, &RowOutcome::InputError);
        assert_eq!(sheet.rows[1].len(), 3);
        assert_eq!(sheet.rows[1][1], CellValue::Empty);
        assert_eq!(sheet.cell(1, 2), Some(&CellValue::Text("入力エラー".into())));
    }

    #[test]
    fn test_records_missing_power_column() {
        let sheet = PatientSheet::new(
            "Sheet1",
            vec!["PatientName".into()],
            vec![vec![CellValue::Text("A".into())]],
        );
        assert!(sheet.records().is_err());
    }

    #[test]
    fn test_records_empty_sheet_without_columns() {
        let sheet = PatientSheet::new("Sheet1", Vec::new(), Vec::new());
        assert!(sheet.records().unwrap().is_empty());
    }

    #[test]
    fn test_records_target_power() {
        let records = sheet().records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].target_power(), 21.5);
        assert_eq!(records[1].target_power(), 0.0);
    }
}
