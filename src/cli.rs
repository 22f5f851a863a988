use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "receipt-ai")]
#[command(about = "レシートOCRテキストのAI構造化ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// OCRテキストファイルを構造化してJSONを出力
    Extract {
        /// OCRテキストファイル（`-` で標準入力）
        #[arg(required = true)]
        input: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// レシート画像をOCRしてから構造化
    Scan {
        /// レシート画像ファイル
        #[arg(required = true)]
        image: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// OCRテキストだけを出力
        #[arg(long)]
        ocr_only: bool,
    },

    /// 保存済みのAI応答を正規化（通信なし）
    Normalize {
        /// AI応答テキストファイル（`-` で標準入力）
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 保存済みの結果JSONを表示
    Show {
        /// 結果JSONファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// HTTP抽出エンドポイントを起動
    Serve {
        /// 待ち受けアドレス（省略時は設定値）
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
