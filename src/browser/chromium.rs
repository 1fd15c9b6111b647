use super::CalculatorPage;
use crate::config::Config;
use crate::error::{BarrettError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

const TEXT_INPUTS: &str = r#"input[type="text"]"#;

/// Chromiumのセッション（ブラウザ1つ、ページ1つ）
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl ChromiumSession {
    pub async fn launch(config: &Config) -> Result<Self> {
        let viewport = Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            ..Default::default()
        };

        let mut builder = BrowserConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(viewport)
            .request_timeout(config.timing.navigation_timeout())
            .arg(format!("--user-agent={}", config.user_agent));
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(BarrettError::Browser)?;

        let (mut browser, mut events) = Browser::launch(browser_config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDPイベントエラー: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(e.into());
            }
        };

        tracing::info!(
            "ブラウザを起動しました (headless: {}, {}x{})",
            config.headless,
            config.viewport_width,
            config.viewport_height
        );

        Ok(Self {
            browser,
            page,
            handler,
            navigation_timeout: config.timing.navigation_timeout(),
        })
    }

    /// ブラウザを終了
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        let _ = self.handler.await;
        tracing::info!("ブラウザを終了しました");
        Ok(())
    }
}

#[async_trait]
impl CalculatorPage for ChromiumSession {
    async fn open(&mut self, url: &str) -> Result<()> {
        tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
            .await
            .map_err(|_| BarrettError::Timeout(format!("ページの読み込み: {}", url)))??;
        Ok(())
    }

    async fn text_input_count(&mut self) -> Result<usize> {
        Ok(self.page.find_elements(TEXT_INPUTS).await?.len())
    }

    async fn fill_text_input(&mut self, index: usize, value: &str) -> Result<()> {
        let inputs = self.page.find_elements(TEXT_INPUTS).await?;
        let input = inputs
            .get(index)
            .ok_or_else(|| BarrettError::ElementNotFound(format!("テキスト入力欄 {}", index)))?;

        let literal = serde_json::to_string(value)?;
        input
            .call_js_fn(
                format!(
                    "function() {{ this.value = {}; \
                     this.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                     this.dispatchEvent(new Event('change', {{ bubbles: true }})); }}",
                    literal
                ),
                false,
            )
            .await?;
        Ok(())
    }

    async fn click_first(&mut self, selector: &str) -> Result<bool> {
        let elements = self.page.find_elements(selector).await?;
        match elements.first() {
            Some(element) => {
                element.click().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn click_link_containing(&mut self, text: &str) -> Result<bool> {
        for link in self.page.find_elements("a").await? {
            let inner = link.inner_text().await?.unwrap_or_default();
            if inner.contains(text) {
                link.click().await?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn frame_content(&mut self, name: &str) -> Result<String> {
        let literal = serde_json::to_string(name)?;
        let script = format!(
            "(() => {{ \
               const frame = Array.from(document.querySelectorAll('iframe, frame')) \
                 .find(f => f.name === {}); \
               return frame && frame.contentDocument \
                 ? frame.contentDocument.documentElement.outerHTML : ''; \
             }})()",
            literal
        );
        let html: String = self.page.evaluate(script).await?.into_value()?;
        if html.is_empty() {
            return Err(BarrettError::ElementNotFound(format!("フレーム {}", name)));
        }
        Ok(html)
    }

    async fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
