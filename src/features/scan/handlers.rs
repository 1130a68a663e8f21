/// スキャンプロキシのリクエストハンドラー
///
/// アップロードハンドラーとポーリングハンドラーはどちらもステートレスで、
/// 状態（トラッキングトークン）はすべて呼び出し元が持ち回る。
/// どのコードパスでも必ず明示的なステータスコード付きのJSONボディを
/// 生成し、エラーが変換されないままHTTP境界を越えることはない。
use crate::features::scan::models::{parse_data_url, ScanJobStatus};
use crate::features::scan::provider::ProviderClient;
use crate::shared::config::environment::ScanProxyConfig;
use crate::shared::errors::{AppError, AppResult};
use hyper::StatusCode;
use log::{debug, error, info, warn};
use serde_json::{json, Value};
use std::time::Duration;

/// ハンドラーが返すJSON応答
#[derive(Debug, Clone)]
pub struct JsonReply {
    pub status: StatusCode,
    pub body: Value,
}

impl JsonReply {
    fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }
}

/// スキャンプロキシのハンドラー群
///
/// 設定はコンストラクタで受け取り、ハンドラー内部では環境変数を読まない。
pub struct ScanHandlers {
    provider: ProviderClient,
    poll_max_attempts: u32,
    poll_interval: Duration,
}

impl ScanHandlers {
    /// 新しいハンドラー群を作成する
    pub fn new(provider: ProviderClient, config: &ScanProxyConfig) -> Self {
        Self {
            provider,
            poll_max_attempts: config.poll_max_attempts,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// アップロードハンドラー
    ///
    /// data URLで受け取った画像をデコードし、マルチパートでプロバイダーへ
    /// 転送する。成功時はトークンを含むプロバイダーの応答をそのまま返す。
    /// 想定外の失敗はすべて500の固定ボディに変換する。
    pub async fn handle_upload(&self, request_body: &[u8]) -> JsonReply {
        match self.upload_inner(request_body).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("アップロードハンドラーで想定外のエラー: {e}");
                JsonReply::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal Server Error"}),
                )
            }
        }
    }

    async fn upload_inner(&self, request_body: &[u8]) -> AppResult<JsonReply> {
        let payload: Value = serde_json::from_slice(request_body)?;
        let image = payload
            .get("image")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::validation("imageフィールドがありません"))?;

        let decoded = parse_data_url(image)?;
        let reply = self
            .provider
            .submit_receipt(decoded.bytes, &decoded.media_type)
            .await?;

        if reply.is_success() && reply.body_reports_success() {
            info!("アップロード成功: provider_status={}", reply.status);
            Ok(JsonReply::new(StatusCode::OK, reply.body))
        } else {
            // プロバイダーのステータスコードを鏡写しにして返す
            let message = reply.message().unwrap_or("Upload failed").to_string();
            warn!(
                "プロバイダーがアップロードを拒否: status={}, message={message}",
                reply.status
            );
            let status =
                StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            Ok(JsonReply::new(status, json!({"error": message})))
        }
    }

    /// ポーリングハンドラー
    ///
    /// 固定間隔・固定回数でプロバイダーの結果エンドポイントを照会する。
    /// 指数バックオフは使わず、最悪待ち時間を決定的に保つ。
    /// 最終試行の後には待機しない。
    pub async fn handle_poll(&self, token: Option<&str>) -> JsonReply {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => {
                return JsonReply::new(
                    StatusCode::BAD_REQUEST,
                    json!({"error": "Token is required"}),
                );
            }
        };

        info!(
            "ポーリング開始: token={token}, max_attempts={}, interval={:?}",
            self.poll_max_attempts, self.poll_interval
        );

        for attempt in 1..=self.poll_max_attempts {
            let reply = match self.provider.fetch_result(token).await {
                Ok(reply) => reply,
                Err(e) => {
                    // 通信レベルの失敗はリトライせず即座に打ち切る
                    error!("ポーリング中の通信エラー: attempt={attempt}, error={e}");
                    return JsonReply::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({
                            "error": "Failed to poll for results",
                            "details": e.to_string(),
                        }),
                    );
                }
            };

            if !reply.is_success() {
                error!(
                    "ポーリング中にプロバイダーがHTTPエラーを返却: attempt={attempt}, status={}",
                    reply.status
                );
                return JsonReply::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Failed to poll for results",
                        "details": format!("Failed to fetch result: {}", reply.status),
                    }),
                );
            }

            match ScanJobStatus::from_body(&reply.body) {
                ScanJobStatus::Done => {
                    info!("ポーリング完了: token={token}, attempt={attempt}");
                    return JsonReply::new(StatusCode::OK, reply.body);
                }
                ScanJobStatus::Error(message) => {
                    // プロバイダーが失敗を報告した場合もリトライしない
                    warn!("プロバイダーが失敗ステータスを報告: attempt={attempt}, message={message}");
                    return JsonReply::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({
                            "error": "Failed to poll for results",
                            "details": message,
                        }),
                    );
                }
                ScanJobStatus::Pending => {
                    debug!("解析待ち: token={token}, attempt={attempt}/{}", self.poll_max_attempts);
                    if attempt < self.poll_max_attempts {
                        tokio::time::sleep(self.poll_interval).await;
                    }
                }
            }
        }

        warn!("ポーリングの試行回数を使い切りました: token={token}");
        JsonReply::new(
            StatusCode::GATEWAY_TIMEOUT,
            json!({"error": "Polling timed out"}),
        )
    }
}
