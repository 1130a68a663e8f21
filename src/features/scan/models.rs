use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

use crate::shared::errors::{AppError, AppResult};

/// スキャンジョブの状態
///
/// プロバイダーの生のステータス文字列を分岐に使わず、明示的なタグ付きの
/// 状態として扱う。未知のステータスはエラー扱いになり、リトライされない。
#[derive(Debug, Clone, PartialEq)]
pub enum ScanJobStatus {
    /// 解析待ち（ポーリング継続）
    Pending,
    /// 解析完了（終端状態）
    Done,
    /// プロバイダーがエラーまたは未知のステータスを報告した（終端状態）
    Error(String),
}

impl ScanJobStatus {
    /// プロバイダーのレスポンスボディから状態を判定する
    pub fn from_body(body: &Value) -> Self {
        match body.get("status").and_then(Value::as_str) {
            Some("done") => ScanJobStatus::Done,
            Some("pending") => ScanJobStatus::Pending,
            Some(other) => {
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Provider returned unexpected status: {other}"));
                ScanJobStatus::Error(message)
            }
            None => ScanJobStatus::Error("Provider response is missing a status field".to_string()),
        }
    }

    /// 終端状態かどうかを判定する
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanJobStatus::Pending)
    }
}

/// 完了したスキャン結果から取り出すフィールド
///
/// フォームへのマージは「存在する項目のみ上書き」なので、各項目はOption。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanFields {
    /// 店名
    pub establishment: Option<String>,
    /// 合計金額
    pub total: Option<String>,
    /// 取引日
    pub date: Option<String>,
}

impl ScanFields {
    /// プロバイダーの完了レスポンスからフィールドを取り出す
    ///
    /// 金額は数値・文字列のどちらで返ってきても文字列として扱う。
    pub fn from_result_body(body: &Value) -> Self {
        let result = body.get("result").unwrap_or(&Value::Null);

        Self {
            establishment: value_to_string(result.get("establishment")),
            total: value_to_string(result.get("total")),
            date: value_to_string(result.get("date")),
        }
    }
}

fn value_to_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// data URLをデコードした画像
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// 宣言されたメディアタイプ（例: "image/jpeg"）
    pub media_type: String,
    /// デコード済みバイナリ
    pub bytes: Vec<u8>,
}

/// data URL文字列を解析してバイナリに復元する
///
/// # 引数
/// * `data_url` - `data:<media type>;base64,<payload>` 形式の文字列
pub fn parse_data_url(data_url: &str) -> AppResult<DecodedImage> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| AppError::validation("data URL形式ではありません"))?;

    let (media_type, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| AppError::validation("base64エンコードされたdata URLではありません"))?;

    if media_type.is_empty() {
        return Err(AppError::validation("data URLにメディアタイプがありません"));
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| AppError::validation(format!("base64のデコードに失敗しました: {e}")))?;

    Ok(DecodedImage {
        media_type: media_type.to_string(),
        bytes,
    })
}

/// バイナリをdata URL文字列にエンコードする
pub fn to_data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

/// メディアタイプからファイル拡張子を決定する
///
/// アップロードするマルチパートのファイル名 `receipt.<ext>` に使用する。
pub fn extension_for_media_type(media_type: &str) -> &str {
    media_type.split('/').nth(1).unwrap_or("bin")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_from_body_done() {
        let body = json!({"status": "done", "result": {}});
        assert_eq!(ScanJobStatus::from_body(&body), ScanJobStatus::Done);
        assert!(ScanJobStatus::Done.is_terminal());
    }

    #[test]
    fn test_status_from_body_pending() {
        let body = json!({"status": "pending"});
        assert_eq!(ScanJobStatus::from_body(&body), ScanJobStatus::Pending);
        assert!(!ScanJobStatus::Pending.is_terminal());
    }

    #[test]
    fn test_status_from_body_unknown_is_error() {
        let body = json!({"status": "failed", "message": "image unreadable"});
        match ScanJobStatus::from_body(&body) {
            ScanJobStatus::Error(message) => assert_eq!(message, "image unreadable"),
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn test_status_from_body_missing_status_is_error() {
        let body = json!({"result": {}});
        assert!(matches!(
            ScanJobStatus::from_body(&body),
            ScanJobStatus::Error(_)
        ));
    }

    #[test]
    fn test_scan_fields_from_result_body() {
        let body = json!({
            "status": "done",
            "result": {
                "establishment": "ローソン",
                "total": "12.34",
                "date": "2025-08-16 10:00:00"
            }
        });

        let fields = ScanFields::from_result_body(&body);
        assert_eq!(fields.establishment, Some("ローソン".to_string()));
        assert_eq!(fields.total, Some("12.34".to_string()));
        assert_eq!(fields.date, Some("2025-08-16 10:00:00".to_string()));
    }

    #[test]
    fn test_scan_fields_numeric_total() {
        let body = json!({"status": "done", "result": {"total": 12.34}});

        let fields = ScanFields::from_result_body(&body);
        assert_eq!(fields.total, Some("12.34".to_string()));
        assert_eq!(fields.establishment, None);
    }

    #[test]
    fn test_scan_fields_missing_result() {
        let body = json!({"status": "done"});

        let fields = ScanFields::from_result_body(&body);
        assert_eq!(fields, ScanFields::default());
    }

    #[test]
    fn test_parse_data_url_roundtrip() {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        let data_url = to_data_url("image/jpeg", &bytes);

        let decoded = parse_data_url(&data_url).unwrap();
        assert_eq!(decoded.media_type, "image/jpeg");
        assert_eq!(decoded.bytes, bytes);
    }

    #[test]
    fn test_parse_data_url_invalid() {
        assert!(parse_data_url("https://example.com/receipt.jpg").is_err());
        assert!(parse_data_url("data:image/png,AAAA").is_err()); // base64指定なし
        assert!(parse_data_url("data:;base64,AAAA").is_err()); // メディアタイプなし
        assert!(parse_data_url("data:image/png;base64,あいうえお").is_err());
    }

    #[test]
    fn test_extension_for_media_type() {
        assert_eq!(extension_for_media_type("image/jpeg"), "jpeg");
        assert_eq!(extension_for_media_type("image/png"), "png");
        assert_eq!(extension_for_media_type("invalid"), "bin");
    }
}
