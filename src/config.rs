use crate::error::{BarrettError, Result};
use barrett_common::TableLayout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://calc.apacrs.org/barrett_universal2105/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_RESULT_COLUMN: &str = "Refraction";
pub const LOG_FILE_NAME: &str = "barrett_calculator.log";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub url: String,
    pub headless: bool,
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// 出力列名（既存列があれば上書き、なければ追加）
    pub result_column: String,
    pub layout: TableLayout,
    /// 結果テーブルが表示されるiframeのname（未設定ならページ全体）
    pub result_frame: Option<String>,
    pub timing: Timing,
}

/// 待機時間（ミリ秒）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// ページ読み込み・入力後の待機
    pub settle_ms: u64,
    /// Calculateクリック後
    pub calculate_ms: u64,
    /// Universal Formulaタブ切替後
    pub tab_switch_ms: u64,
    /// 結果テーブル読み取り前
    pub table_ms: u64,
    /// 次の患者に進む前
    pub between_rows_ms: u64,
    /// ナビゲーションのタイムアウト
    pub navigation_timeout_ms: u64,
}

impl Timing {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn calculate(&self) -> Duration {
        Duration::from_millis(self.calculate_ms)
    }

    pub fn tab_switch(&self) -> Duration {
        Duration::from_millis(self.tab_switch_ms)
    }

    pub fn table(&self) -> Duration {
        Duration::from_millis(self.table_ms)
    }

    pub fn between_rows(&self) -> Duration {
        Duration::from_millis(self.between_rows_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// 待機なし（テスト用）
    pub fn immediate() -> Self {
        Self {
            settle_ms: 0,
            calculate_ms: 0,
            tab_switch_ms: 0,
            table_ms: 0,
            between_rows_ms: 0,
            navigation_timeout_ms: 1_000,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_ms: 1_000,
            calculate_ms: 3_000,
            tab_switch_ms: 3_000,
            table_ms: 1_000,
            between_rows_ms: 1_000,
            navigation_timeout_ms: 60_000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.into(),
            headless: false,
            user_agent: DEFAULT_USER_AGENT.into(),
            viewport_width: 1920,
            viewport_height: 1080,
            result_column: DEFAULT_RESULT_COLUMN.into(),
            layout: TableLayout::default(),
            result_frame: None,
            timing: Timing::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| BarrettError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("barrett-automate").join("config.json"))
    }

    pub fn set_headless(&mut self, headless: bool) -> Result<()> {
        self.headless = headless;
        self.save()
    }
}
