use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarrettError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("データ読み込みエラー: {0}")]
    SheetRead(String),

    #[error("データ保存エラー: {0}")]
    ExcelWrite(String),

    #[error("ブラウザエラー: {0}")]
    Browser(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] barrett_common::Error),
}

impl From<calamine::Error> for BarrettError {
    fn from(e: calamine::Error) -> Self {
        BarrettError::SheetRead(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for BarrettError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        BarrettError::ExcelWrite(e.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for BarrettError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        BarrettError::Browser(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BarrettError>;
