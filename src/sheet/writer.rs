use super::PatientSheet;
use crate::error::Result;
use barrett_common::CellValue;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

/// 入力ファイルと同じ場所の `<stem>_results.xlsx`
pub fn default_output_path(input: &Path) -> PathBuf {
    sibling_with_suffix(input, "_results")
}

/// 既存出力の退避先 `<stem>_backup.xlsx`
pub fn backup_path(output: &Path) -> PathBuf {
    sibling_with_suffix(output, "_backup")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "patients".to_string());
    path.with_file_name(format!("{}{}.xlsx", stem, suffix))
}

/// 表をxlsxとして保存
///
/// 出力先が既に存在する場合は `<stem>_backup.xlsx` に退避してから書き込む。
/// 退避した場合はそのパスを返す。
pub fn save_sheet(sheet: &PatientSheet, output: &Path) -> Result<Option<PathBuf>> {
    let backup = if output.exists() {
        let backup = backup_path(output);
        if backup.exists() {
            std::fs::remove_file(&backup)?;
        }
        std::fs::rename(output, &backup)?;
        tracing::info!("バックアップを作成: {}", backup.display());
        Some(backup)
    } else {
        None
    };

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    if !sheet.sheet_name.is_empty() {
        if let Err(e) = worksheet.set_name(&sheet.sheet_name) {
            tracing::warn!("シート名を設定できません ({}): {}", sheet.sheet_name, e);
        }
    }

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (i, cells) in sheet.rows.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Number(n) if n.is_finite() => {
                    worksheet.write_number(row, col, *n)?;
                }
                CellValue::Text(s) if !s.is_empty() => {
                    worksheet.write_string(row, col, s)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                _ => {}
            }
        }
    }

    workbook.save(output).map_err(|e| {
        tracing::error!("データ保存エラー: {}", e);
        e
    })?;

    tracing::info!("結果を保存: {}", output.display());
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        let path = default_output_path(Path::new("/data/APACdata.xlsx"));
        assert_eq!(path, PathBuf::from("/data/APACdata_results.xlsx"));
    }

    #[test]
    fn test_backup_path() {
        let path = backup_path(Path::new("/data/APACdata_results.xlsx"));
        assert_eq!(path, PathBuf::from("/data/APACdata_results_backup.xlsx"));
    }

    #[test]
    fn test_output_path_from_ods_input() {
        let path = default_output_path(Path::new("patients.ods"));
        assert_eq!(path, PathBuf::from("patients_results.xlsx"));
    }
}
