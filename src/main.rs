use anyhow::Context;
use barrett_automate::{batch, calculator, cli, config, logging};
use barrett_common::ExtractionResult;
use batch::ConsoleReporter;
use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, LOG_FILE_NAME};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, Path::new(LOG_FILE_NAME)).context("ログを初期化できません")?;
    let config = Config::load().context("設定を読み込めません")?;

    match cli.command {
        Commands::Run { input, output, headless, layout, url } => {
            println!("🩺 barrett - 一括計算\n");

            let mut config = config;
            if headless {
                config.headless = true;
            }
            if let Some(layout) = layout {
                config.layout = layout;
            }
            if let Some(url) = url {
                config.url = url;
            }

            let started = chrono::Local::now();
            let mut reporter = ConsoleReporter::new();
            let report = batch::run_workbook(&input, output.as_deref(), &config, &mut reporter)
                .await
                .map_err(|e| {
                    tracing::error!("一括処理エラー: {}", e);
                    e
                })?;
            let elapsed = chrono::Local::now() - started;

            println!("\n=== 処理結果 ===");
            println!("成功: {}件", report.summary.succeeded);
            println!("エラー: {}件", report.summary.failed);
            println!("元ファイル: {}", report.input.display());
            println!("結果ファイル: {}", report.output.display());
            if let Some(backup) = &report.backup {
                println!("バックアップ: {}", backup.display());
            }
            println!("所要時間: {}秒", elapsed.num_seconds());
        }

        Commands::Extract { html, power, layout } => {
            let layout = layout.unwrap_or(config.layout);
            match calculator::extract_saved_page(&html, power, layout)? {
                ExtractionResult::Found { value, source } => {
                    println!("✔ IOL Power {} → Refraction {} ({})", power, value, source);
                }
                ExtractionResult::NotFound => {
                    println!("✘ IOL Power {} に対応する値が見つかりません", power);
                }
            }
        }

        Commands::Config { show, headless } => {
            let mut config = config;

            if let Some(headless) = headless {
                config.set_headless(headless)?;
                println!("✔ ヘッドレスモードを{}にしました", if headless { "有効" } else { "無効" });
            }

            if show || headless.is_none() {
                println!("設定: {}", Config::config_path()?.display());
                println!("  URL: {}", config.url);
                println!("  ヘッドレス: {}", config.headless);
                println!("  テーブル構成: {}", config.layout);
                println!("  出力列: {}", config.result_column);
                println!(
                    "  結果フレーム: {}",
                    config.result_frame.as_deref().unwrap_or("（ページ全体）")
                );
                println!(
                    "  待機(ms): 読み込み {} / 計算 {} / タブ {} / テーブル {} / 次の行 {}",
                    config.timing.settle_ms,
                    config.timing.calculate_ms,
                    config.timing.tab_switch_ms,
                    config.timing.table_ms,
                    config.timing.between_rows_ms
                );
            }
        }
    }

    Ok(())
}
