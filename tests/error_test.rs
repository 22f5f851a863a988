//! エラーケーステスト
//!
//! エラー種別ごとのステータスコードと表示を検証

use receipt_ai_rust::config::Config;
use receipt_ai_rust::error::ReceiptAiError;
use receipt_ai_rust::pipeline::validate_transcript;
use tempfile::tempdir;

/// 空白だけのテキストは入力エラー
#[test]
fn test_blank_transcript_is_validation_error() {
    let err = validate_transcript(" \n\t ").unwrap_err();
    assert!(matches!(err, ReceiptAiError::Validation(_)));
    assert_eq!(err.status_code(), 400);
    assert!(!err.is_upstream());
}

#[test]
fn test_valid_transcript_passes_through() {
    assert_eq!(validate_transcript("STORE A").unwrap(), "STORE A");
}

/// 上流のステータスはそのまま
#[test]
fn test_upstream_status_is_passed_through() {
    for status in [401u16, 429, 503] {
        let err = ReceiptAiError::Upstream {
            status,
            message: "nope".to_string(),
        };
        assert_eq!(err.status_code(), status);
        assert!(err.is_upstream());
        assert!(err.user_message().contains("nope"));
    }
}

#[test]
fn test_timeout_is_gateway_timeout() {
    let err = ReceiptAiError::Timeout(30);
    assert_eq!(err.status_code(), 504);
    assert!(err.to_string().contains("30"));
}

/// 通信エラーの詳細は利用者向けメッセージに出さない
#[test]
fn test_network_error_hides_detail() {
    let err = ReceiptAiError::Network("dns failure at 10.0.0.1".to_string());
    assert_eq!(err.status_code(), 500);
    assert!(err.to_string().contains("10.0.0.1"));
    assert!(!err.user_message().contains("10.0.0.1"));
}

#[test]
fn test_other_errors_are_internal() {
    let errors = [
        ReceiptAiError::MissingApiKey,
        ReceiptAiError::Config("bad".to_string()),
        ReceiptAiError::Ocr("tesseract".to_string()),
        ReceiptAiError::FileNotFound("/nope".to_string()),
    ];
    for err in errors {
        assert_eq!(err.status_code(), 500);
    }
}

#[test]
fn test_from_conversions() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: ReceiptAiError = json_err.into();
    assert!(matches!(err, ReceiptAiError::JsonParse(_)));

    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: ReceiptAiError = io_err.into();
    assert!(matches!(err, ReceiptAiError::Io(_)));

    let common = receipt_ai_common::Error::Parse("top-level value".to_string());
    let err: ReceiptAiError = common.into();
    assert_eq!(err.to_string(), "Parse error: top-level value");
}

/// 壊れた設定ファイル
#[test]
fn test_corrupt_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = Config::load_from(&path);
    assert!(result.is_err());
}

/// 存在しない設定ファイルは既定値
#[test]
fn test_missing_config_file_uses_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config.timeout_seconds, Config::default().timeout_seconds);
}
