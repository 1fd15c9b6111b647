use barrett_common::TableLayout;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "barrett")]
#[command(about = "Barrett Universal II 計算の一括自動化ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// スプレッドシートの全患者を計算サイトで処理
    Run {
        /// 患者データ（xlsx/xls/ods）
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ファイル（デフォルト: 入力ファイル名_results.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ブラウザを表示しない
        #[arg(long)]
        headless: bool,

        /// 結果テーブルの列構成 (with-optic/compact)
        #[arg(long)]
        layout: Option<TableLayout>,

        /// 計算サイトのURL
        #[arg(long)]
        url: Option<String>,
    },

    /// 保存済みの結果ページからRefractionを抽出
    Extract {
        /// 結果ページのHTMLファイル
        #[arg(required = true)]
        html: PathBuf,

        /// 検索するIOL Power
        #[arg(short, long, allow_hyphen_values = true)]
        power: f64,

        /// 結果テーブルの列構成 (with-optic/compact)
        #[arg(long)]
        layout: Option<TableLayout>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// ヘッドレスモードの既定値を設定
        #[arg(long)]
        headless: Option<bool>,
    },
}
