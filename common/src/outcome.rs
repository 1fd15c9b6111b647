//! 行ごとの処理結果
//!
//! 出力列には数値か、失敗理由を区別するセンチネル文字列のどちらかが入る。

use crate::patient::CellValue;

/// 入力エラーのセンチネル
pub const INPUT_ERROR: &str = "入力エラー";
/// 計算エラーのセンチネル
pub const CALCULATION_ERROR: &str = "計算エラー";
/// 予期しないエラーの接頭辞
pub const FAILURE_PREFIX: &str = "エラー: ";
/// エラーメッセージの最大文字数
pub const MAX_MESSAGE_CHARS: usize = 50;

/// 1患者分の処理結果
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Refraction値
    Value(f64),
    /// フォーム入力に失敗
    InputError,
    /// 計算・抽出に失敗
    CalculationError,
    /// その他の失敗（切り詰め済みメッセージ）
    Failed(String),
}

impl RowOutcome {
    /// 予期しないエラーから生成（メッセージは50文字に切り詰め）
    pub fn failed(message: impl std::fmt::Display) -> Self {
        RowOutcome::Failed(truncate_chars(&message.to_string(), MAX_MESSAGE_CHARS))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Value(_))
    }

    /// 出力セルの値
    pub fn to_cell(&self) -> CellValue {
        match self {
            RowOutcome::Value(v) => CellValue::Number(*v),
            RowOutcome::InputError => CellValue::Text(INPUT_ERROR.to_string()),
            RowOutcome::CalculationError => CellValue::Text(CALCULATION_ERROR.to_string()),
            RowOutcome::Failed(msg) => CellValue::Text(format!("{}{}", FAILURE_PREFIX, msg)),
        }
    }
}

impl std::fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_cell())
    }
}

/// 文字単位で切り詰め（バイト境界で切らない）
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_cells() {
        assert_eq!(RowOutcome::Value(1.25).to_cell(), CellValue::Number(1.25));
        assert_eq!(RowOutcome::InputError.to_cell(), CellValue::Text("入力エラー".into()));
        assert_eq!(RowOutcome::CalculationError.to_cell(), CellValue::Text("計算エラー".into()));
    }

    #[test]
    fn test_failed_message_truncated() {
        let long = "x".repeat(120);
        let outcome = RowOutcome::failed(&long);
        assert_eq!(outcome, RowOutcome::Failed("x".repeat(50)));
        assert_eq!(outcome.to_string(), format!("エラー: {}", "x".repeat(50)));
    }

    #[test]
    fn test_truncate_multibyte() {
        let text = "ページの読み込みがタイムアウトしました";
        assert_eq!(truncate_chars(text, 4), "ページの");
        assert_eq!(truncate_chars("short", 50), "short");
    }

    #[test]
    fn test_is_success() {
        assert!(RowOutcome::Value(0.0).is_success());
        assert!(!RowOutcome::InputError.is_success());
        assert!(!RowOutcome::failed("Processing error").is_success());
    }
}
