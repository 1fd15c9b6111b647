//! ログ出力の初期化（標準出力 + ログファイル）

use crate::error::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// 既定のフィルタ（`RUST_LOG` があればそちらを優先）
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// サブスクライバを登録
///
/// ログファイルは追記モードで開き、ANSIエスケープなしで書き込む。
pub fn init(verbose: bool, log_file: &Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let console = fmt::layer().with_target(false);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::error::BarrettError::Config(format!("ログ初期化エラー: {}", e)))?;

    Ok(())
}
