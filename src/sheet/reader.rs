use super::PatientSheet;
use crate::error::{BarrettError, Result};
use barrett_common::CellValue;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// スプレッドシート（xlsx/xls/ods）の先頭シートを読み込む
pub fn load_sheet(path: &Path) -> Result<PatientSheet> {
    if !path.exists() {
        return Err(BarrettError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| BarrettError::SheetRead(format!("{}: {}", path.display(), e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| BarrettError::SheetRead(format!("シートがありません: {}", path.display())))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| to_cell_value(cell).as_text().unwrap_or_default())
            .collect(),
        None => {
            tracing::info!("データ読み込み完了: 0件");
            return Ok(PatientSheet::new(sheet_name, Vec::new(), Vec::new()));
        }
    };

    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(to_cell_value).collect())
        .collect();

    tracing::info!("データ読み込み完了: {}件", rows.len());
    Ok(PatientSheet::new(sheet_name, headers, rows))
}

/// calamineのセル値を変換
///
/// 日付は Excel のシリアル値、エラーセルは空欄として扱う。
fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => {
            tracing::debug!("エラーセルを空欄として扱います: {:?}", e);
            CellValue::Empty
        }
    }
}
