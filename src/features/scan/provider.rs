// OCRプロバイダー（TabScanner）との通信を行うクライアント

use crate::features::scan::models::extension_for_media_type;
use crate::shared::config::environment::ProviderConfig;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info};
use reqwest::{multipart, Client};
use serde_json::Value;
use std::time::Duration;

/// プロバイダーからの応答
///
/// アップロードハンドラーはプロバイダーのステータスコードとボディを
/// そのまま呼び出し元へ鏡写しにするため、HTTPエラーステータスも
/// エラーではなく応答として返す。Errになるのは通信・解析の失敗のみ。
#[derive(Debug, Clone)]
pub struct ProviderReply {
    /// プロバイダーのHTTPステータスコード
    pub status: u16,
    /// プロバイダーのレスポンスボディ
    pub body: Value,
}

impl ProviderReply {
    /// HTTPステータスが成功かどうかを判定する
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// ボディの `success` フィールドがtrueかどうかを判定する
    pub fn body_reports_success(&self) -> bool {
        self.body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// ボディの `message` フィールドを取得する
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

/// OCRプロバイダーAPIクライアント
pub struct ProviderClient {
    client: Client,
    config: ProviderConfig,
}

impl ProviderClient {
    /// 新しいプロバイダークライアントを作成する
    pub fn new(config: ProviderConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// レシート画像をプロバイダーの取り込みエンドポイントへ送信する
    ///
    /// # 引数
    /// * `bytes` - 画像バイナリ
    /// * `media_type` - 画像のメディアタイプ（例: "image/jpeg"）
    ///
    /// # 戻り値
    /// トラッキングトークンを含むプロバイダーの応答
    pub async fn submit_receipt(
        &self,
        bytes: Vec<u8>,
        media_type: &str,
    ) -> AppResult<ProviderReply> {
        let filename = format!("receipt.{}", extension_for_media_type(media_type));
        info!("プロバイダーへ画像を送信: filename={filename}, size={}", bytes.len());

        let form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(bytes)
                .file_name(filename)
                .mime_str(media_type)
                .map_err(|e| AppError::validation(format!("MIMEタイプ設定エラー: {e}")))?,
        );

        let url = format!("{}/api/2/process", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("プロバイダーへの接続に失敗しました: {e}"))
            })?;

        self.into_reply(response).await
    }

    /// トラッキングトークンに対応する解析結果を1回取得する
    ///
    /// ポーリング中のキャッシュを避けるため `Cache-Control: no-store` を付与する。
    pub async fn fetch_result(&self, token: &str) -> AppResult<ProviderReply> {
        debug!("プロバイダーへ結果を問い合わせ: token={token}");

        let url = format!("{}/api/result/{token}", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.config.api_key)
            .header("Cache-Control", "no-store")
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("プロバイダーへの接続に失敗しました: {e}"))
            })?;

        self.into_reply(response).await
    }

    /// reqwestのレスポンスをProviderReplyへ変換する
    async fn into_reply(&self, response: reqwest::Response) -> AppResult<ProviderReply> {
        let status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("レスポンス解析エラー: {e}")))?;

        debug!("プロバイダー応答: status={status}");
        Ok(ProviderReply { status, body })
    }
}
