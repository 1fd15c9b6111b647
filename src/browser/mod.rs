//! 計算サイトを操作するブラウザドライバ

mod chromium;

pub use chromium::ChromiumSession;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 計算ページの操作
///
/// 1バッチで1ページを使い回す。要素の検索は毎回ページから取り直す。
#[async_trait]
pub trait CalculatorPage: Send {
    /// URLを開いて読み込み完了を待つ
    async fn open(&mut self, url: &str) -> Result<()>;

    /// テキスト入力欄の数
    async fn text_input_count(&mut self) -> Result<usize>;

    /// `index` 番目のテキスト入力欄に値を設定
    async fn fill_text_input(&mut self, index: usize, value: &str) -> Result<()>;

    /// セレクタに一致する最初の要素をクリック（なければ `false`）
    async fn click_first(&mut self, selector: &str) -> Result<bool>;

    /// テキストを含む最初のリンクをクリック（なければ `false`）
    async fn click_link_containing(&mut self, text: &str) -> Result<bool>;

    /// ページ全体のHTML
    async fn content(&mut self) -> Result<String>;

    /// 名前付きフレーム内のHTML
    async fn frame_content(&mut self, name: &str) -> Result<String>;

    async fn pause(&mut self, duration: Duration);
}
