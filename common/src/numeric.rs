//! 数値スキャン
//!
//! 結果ページのセル文字列から最初の数値部分を取り出す。
//! 数字を含まない文字列は「一致なし」であり、0として扱ってはならない。

use regex::Regex;

lazy_static::lazy_static! {
    /// IOL Power列用（符号なし）
    static ref POWER_RE: Regex = Regex::new(r"(\d+\.?\d*)").unwrap();
    /// Refraction列用（先頭のマイナスを許容）
    static ref SIGNED_RE: Regex = Regex::new(r"(-?\d+\.?\d*)").unwrap();
    /// 行テキスト末尾の数値
    static ref TRAILING_SIGNED_RE: Regex = Regex::new(r"(-?\d+\.?\d*)\s*$").unwrap();
}

/// 先頭から最初の符号なし数値を抽出
///
/// 小数点は任意、桁区切りは非対応。".5" は0.5ではなく最初の数字列から読む。
pub fn scan_power(text: &str) -> Option<f64> {
    first_capture(&POWER_RE, text)
}

/// 先頭から最初の符号付き数値を抽出
///
/// 検索はアンカーなしのため "+1.50" は `+` を読み飛ばして 1.50 になる。
/// プラス記号自体をトークンの一部として解釈することはない。
pub fn scan_signed(text: &str) -> Option<f64> {
    first_capture(&SIGNED_RE, text)
}

/// 末尾（後続空白は無視）の符号付き数値を抽出
pub fn scan_trailing_signed(text: &str) -> Option<f64> {
    first_capture(&TRAILING_SIGNED_RE, text.trim())
}

/// スプレッドシートの浮動小数点表記で文字列化
///
/// 整数値でも小数点を残す（22.0 → "22.0"）。ページ内検索のリテラルとフォーム入力値に使う。
pub fn format_decimal(value: f64) -> String {
    format!("{:?}", value)
}

fn first_capture(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
