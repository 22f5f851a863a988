use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use receipt_ai_common::{normalize, StructuredReceipt};
use receipt_ai_rust::ocr::{OcrEngine, TesseractCli};
use receipt_ai_rust::{cli, config, error, pipeline, report, server};
use cli::{Cli, Commands};
use config::Config;
use error::{ReceiptAiError, Result};
use pipeline::ReceiptPipeline;
use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✖ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Extract { input, output } => {
            eprintln!("🧾 receipt-ai - 構造化\n");

            let transcript = read_input(&input)?;
            pipeline::validate_transcript(&transcript)?;

            let config = Config::load()?;
            let pipeline = ReceiptPipeline::from_config(&config)?;
            eprintln!("[1/1] AI解析中...");
            let result = pipeline.run(&transcript).await?;

            write_result(&result, output.as_deref())?;
        }

        Commands::Scan { image, output, ocr_only } => {
            eprintln!("🧾 receipt-ai - 画像から構造化\n");

            if !image.exists() {
                return Err(ReceiptAiError::FileNotFound(image.display().to_string()).into());
            }
            let bytes = std::fs::read(&image)?;
            let config = Config::load()?;

            eprintln!("[1/2] OCR中...");
            let transcript = recognize_with_progress(&config, &bytes).await?;
            eprintln!("✔ {}文字を読み取り\n", transcript.chars().count());

            if ocr_only {
                println!("{}", transcript);
                return Ok(());
            }

            pipeline::validate_transcript(&transcript)
                .context("OCR結果が空のため解析できません")?;

            let pipeline = ReceiptPipeline::from_config(&config)?;
            eprintln!("[2/2] AI解析中...");
            let result = pipeline.run(&transcript).await?;

            write_result(&result, output.as_deref())?;
        }

        Commands::Normalize { input } => {
            let completion = read_input(&input)?;
            let result = normalize(&completion);
            println!("{}", serde_json::to_string_pretty(&result)?);
            eprint!("{}", report::render(&result));
        }

        Commands::Show { input } => {
            let content = read_input(&input)?;
            let result: StructuredReceipt = serde_json::from_str(&content)?;
            print!("{}", report::render(&result));
        }

        Commands::Serve { bind } => {
            let config = Config::load()?;
            let addr_str = bind.unwrap_or_else(|| config.bind_addr.clone());
            let addr: SocketAddr = addr_str
                .parse()
                .map_err(|e| ReceiptAiError::Config(format!("不正なアドレス {}: {}", addr_str, e)))?;

            let pipeline = ReceiptPipeline::from_config(&config)?;
            let router = server::build_router(pipeline, config.timeout_seconds);
            server::serve(router, addr).await?;
        }

        Commands::Config { set_api_key, show } => {
            let mut config = Config::load()?;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定: {}", Config::config_path()?.display());
                println!("  モデル: {}", config.model);
                println!("  API: {}", config.api_base_url);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  待ち受け: {}", config.bind_addr);
                println!("  OCR: {} (-l {})", config.ocr_command, config.ocr_language);
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

/// ファイルまたは標準入力（`-`）を読み込み
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    if !path.exists() {
        return Err(ReceiptAiError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}

async fn recognize_with_progress(config: &Config, image: &[u8]) -> Result<String> {
    let engine = TesseractCli::from_config(config);

    let pb = ProgressBar::new(100);
    let style = ProgressStyle::with_template("  OCR [{bar:30}] {percent}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);

    let on_progress = |p: f32| pb.set_position((p * 100.0).round() as u64);
    let result = engine.recognize(image, &on_progress).await;
    pb.finish_and_clear();

    result
}

/// 結果を保存（出力先なしなら標準出力にJSON）し、表示用テキストを出す
fn write_result(result: &StructuredReceipt, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            print!("{}", report::render(result));
            eprintln!("\n✔ 結果を保存: {}", display_path(path).display());
        }
        None => {
            eprint!("{}", report::render(result));
            println!("{}", json);
        }
    }

    if result.is_degraded() {
        eprintln!("⚠ 構造化できなかったため生テキストを保存しました");
    }
    Ok(())
}

fn display_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
