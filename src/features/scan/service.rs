/// レシートスキャンのオーケストレーター
///
/// 画像の形式正規化、プロキシへのアップロード、ポーリング結果の取得、
/// フォームへのマージまでの一連の流れを担当する。
/// リトライはポーリングハンドラー内部のループのみで、ここでは行わない。
use crate::features::expenses::form::ExpenseForm;
use crate::features::scan::models::{to_data_url, ScanFields};
use crate::shared::errors::{AppError, AppResult};
use image::ImageFormat;
use log::{info, warn};
use reqwest::Client;
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// スキャンオーケストレーター
pub struct ScanService {
    client: Client,
    proxy_base_url: String,
}

impl ScanService {
    /// 新しいオーケストレーターを作成する
    ///
    /// # 引数
    /// * `proxy_base_url` - スキャンプロキシのベースURL（例: "http://127.0.0.1:8787"）
    pub fn new(proxy_base_url: impl Into<String>) -> AppResult<Self> {
        // ポーリングハンドラーは最悪30秒（15回 × 2000ms）応答を保留するため、
        // クライアント側のタイムアウトはそれより長く取る
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self {
            client,
            proxy_base_url: proxy_base_url.into(),
        })
    }

    /// 選択されたレシート画像をスキャンしてフォームへ反映する
    ///
    /// 成功・失敗にかかわらずスキャン中フラグを解除する。失敗時は
    /// 入力済みの値を保持したままエラーメッセージをフォームに設定する。
    pub async fn scan_into_form(&self, form: &mut ExpenseForm, image_bytes: Vec<u8>) {
        if form.is_scanning {
            // フォームインスタンスごとに同時スキャンは1件まで
            warn!("スキャン実行中のため新しいスキャンを開始しません");
            return;
        }

        form.is_scanning = true;

        match self.run_scan(image_bytes).await {
            Ok(fields) => {
                info!("スキャン成功: fields={fields:?}");
                form.error = None;
                form.apply_scan_fields(&fields);
            }
            Err(e) => {
                warn!("スキャン失敗: {e}");
                form.error = Some(e.user_message());
            }
        }

        form.is_scanning = false;
    }

    /// ファイルパスからレシート画像を読み込んでスキャンする
    pub async fn scan_file_into_form(&self, form: &mut ExpenseForm, path: &Path) {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("レシート画像の読み込みに失敗: path={}, error={e}", path.display());
                form.error = Some("レシート画像の読み込みに失敗しました".to_string());
                return;
            }
        };

        self.scan_into_form(form, bytes).await;
    }

    /// スキャンの一連の流れを実行する
    async fn run_scan(&self, image_bytes: Vec<u8>) -> AppResult<ScanFields> {
        let (bytes, media_type) = normalize_image(image_bytes)?;
        let data_url = to_data_url(media_type, &bytes);

        let token = self.upload(&data_url).await?;
        let body = self.poll(&token).await?;

        Ok(normalize_fields(ScanFields::from_result_body(&body)))
    }

    /// アップロードハンドラーへ画像を送信してトークンを取得する
    async fn upload(&self, data_url: &str) -> AppResult<String> {
        let url = format!("{}/api/scan/input", self.proxy_base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({"image": data_url}))
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("レシートのアップロードに失敗しました: {e}"))
            })?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("レシートのアップロードに失敗しました");
            return Err(AppError::ExternalService(format!(
                "レシートのアップロードに失敗しました: {message}"
            )));
        }

        body.get("token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::ExternalService(
                    "スキャン結果のトークンが取得できませんでした".to_string(),
                )
            })
    }

    /// ポーリングハンドラーから解析結果を取得する
    async fn poll(&self, token: &str) -> AppResult<Value> {
        let url = format!("{}/api/scan/result?token={token}", self.proxy_base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::ExternalService(format!("レシートの解析結果の取得に失敗しました: {e}"))
        })?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status == reqwest::StatusCode::GATEWAY_TIMEOUT {
            return Err(AppError::timeout("レシートの解析がタイムアウトしました"));
        }

        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("レシートの解析に失敗しました");
            return Err(AppError::ExternalService(format!(
                "レシートの解析に失敗しました: {message}"
            )));
        }

        Ok(body)
    }
}

/// 旧形式のレシート画像を標準的なラスタ形式へ変換する
///
/// JPEG・PNGはそのまま通し、バックエンドのパイプラインが受け付けない
/// BMP・TIFF・GIFはJPEGへ再エンコードする。
fn normalize_image(bytes: Vec<u8>) -> AppResult<(Vec<u8>, &'static str)> {
    let format = image::guess_format(&bytes)
        .map_err(|_| AppError::validation("対応していない画像形式です"))?;

    match format {
        ImageFormat::Jpeg => Ok((bytes, "image/jpeg")),
        ImageFormat::Png => Ok((bytes, "image/png")),
        ImageFormat::Bmp | ImageFormat::Tiff | ImageFormat::Gif => {
            info!("旧形式の画像をJPEGへ変換します: format={format:?}");

            let img = image::load_from_memory(&bytes)
                .map_err(|e| AppError::validation(format!("レシート画像の読み込みに失敗しました: {e}")))?;

            // JPEGはアルファチャンネルを持てないためRGBへ落とす
            let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());
            let mut buf = Vec::new();
            rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
                .map_err(|e| AppError::validation(format!("レシート画像の変換に失敗しました: {e}")))?;

            Ok((buf, "image/jpeg"))
        }
        _ => Err(AppError::validation("対応していない画像形式です")),
    }
}

/// スキャン結果のフィールドをフォーム入力用に正規化する
fn normalize_fields(fields: ScanFields) -> ScanFields {
    ScanFields {
        establishment: fields.establishment,
        total: fields.total.as_deref().map(normalize_scan_amount),
        date: fields.date.as_deref().map(normalize_scan_date),
    }
}

/// スキャン結果の金額を数字のみの文字列に正規化する
///
/// 小数点などの区切り文字を取り除く（例: "12.34" → "1234"）。
pub fn normalize_scan_amount(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// スキャン結果の日付から時刻部分を取り除く
///
/// 例: "2025-08-16 10:00:00" → "2025-08-16"
pub fn normalize_scan_date(raw: &str) -> String {
    raw.split([' ', 'T'])
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use quickcheck_macros::quickcheck;

    fn sample_image_bytes(format: ImageFormat) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(RgbImage::from_pixel(
            4,
            4,
            Rgb([200, 200, 200]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn test_normalize_image_passes_jpeg_through() {
        let bytes = sample_image_bytes(ImageFormat::Jpeg);
        let (normalized, media_type) = normalize_image(bytes.clone()).unwrap();

        assert_eq!(normalized, bytes);
        assert_eq!(media_type, "image/jpeg");
    }

    #[test]
    fn test_normalize_image_passes_png_through() {
        let bytes = sample_image_bytes(ImageFormat::Png);
        let (normalized, media_type) = normalize_image(bytes.clone()).unwrap();

        assert_eq!(normalized, bytes);
        assert_eq!(media_type, "image/png");
    }

    #[test]
    fn test_normalize_image_converts_bmp_to_jpeg() {
        let bytes = sample_image_bytes(ImageFormat::Bmp);
        let (normalized, media_type) = normalize_image(bytes).unwrap();

        assert_eq!(media_type, "image/jpeg");
        assert_eq!(
            image::guess_format(&normalized).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_normalize_image_rejects_unknown_bytes() {
        let result = normalize_image(vec![0x00, 0x01, 0x02, 0x03]);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_scan_amount() {
        assert_eq!(normalize_scan_amount("12.34"), "1234");
        assert_eq!(normalize_scan_amount("1,980"), "1980");
        assert_eq!(normalize_scan_amount("1980"), "1980");
        assert_eq!(normalize_scan_amount(""), "");
    }

    #[test]
    fn test_normalize_scan_date() {
        assert_eq!(normalize_scan_date("2025-08-16 10:00:00"), "2025-08-16");
        assert_eq!(normalize_scan_date("2025-08-16T10:00:00Z"), "2025-08-16");
        assert_eq!(normalize_scan_date("2025-08-16"), "2025-08-16");
        assert_eq!(normalize_scan_date(""), "");
    }

    #[quickcheck]
    fn prop_normalized_amount_is_digits_only(raw: String) -> bool {
        normalize_scan_amount(&raw).chars().all(|c| c.is_ascii_digit())
    }

    #[quickcheck]
    fn prop_normalized_date_has_no_time_separator(raw: String) -> bool {
        let normalized = normalize_scan_date(&raw);
        !normalized.contains(' ') && !normalized.contains('T')
    }
}
