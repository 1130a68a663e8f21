/// 汎用バックエンドAPIクライアント
///
/// 家計簿バックエンドとの通信を行う汎用的なクライアント。
/// セッションCookieを保持し、更新系リクエストにはCSRFトークンを付与する。
use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::{AppError, AppResult};
use log::{info, warn};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// APIクライアント設定
#[derive(Debug, Clone)]
pub struct BackendClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl Default for BackendClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
        }
    }
}

impl BackendClientConfig {
    /// 環境設定からAPIクライアント設定を作成
    pub fn from_env() -> AppResult<Self> {
        let api_config = ApiConfig::from_env()
            .map_err(|e| AppError::configuration(format!("バックエンドAPI設定の読み込み失敗: {e}")))?;
        Ok(Self {
            base_url: api_config.base_url,
            timeout_seconds: api_config.timeout_seconds,
            max_retries: api_config.max_retries,
        })
    }
}

/// CSRFトークン取得レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct CsrfResponse {
    pub csrf_token: String,
}

/// バックエンドからのエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// 汎用バックエンドAPIクライアント
pub struct BackendClient {
    client: Client,
    config: BackendClientConfig,
}

impl BackendClient {
    /// 設定を指定してAPIクライアントを作成
    ///
    /// セッションCookieの維持のためCookieストアを有効にする。
    pub fn new(config: BackendClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .cookie_store(true)
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// 環境変数の設定でAPIクライアントを作成
    pub fn from_env() -> AppResult<Self> {
        Self::new(BackendClientConfig::from_env()?)
    }

    /// CSRFトークンを取得する
    ///
    /// 更新系リクエストの前に呼び出し、X-CSRF-Tokenヘッダーとして付与する。
    pub async fn csrf_token(&self) -> AppResult<String> {
        let response: CsrfResponse = self.get("/csrf").await?;
        Ok(response.csrf_token)
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{endpoint}", self.config.base_url);
        let request = self.client.get(&url);

        self.send_request_with_retry(request, "GET", endpoint).await
    }

    /// POSTリクエストを送信（JSONボディ・JSONレスポンス）
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let request = self.mutation_request(reqwest::Method::POST, endpoint).await?;
        self.send_request_with_retry(request.json(body), "POST", endpoint)
            .await
    }

    /// POSTリクエストを送信（ボディなし・JSONレスポンス）
    pub async fn post_empty<T>(&self, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.mutation_request(reqwest::Method::POST, endpoint).await?;
        self.send_request_with_retry(request, "POST", endpoint)
            .await
    }

    /// POSTリクエストを送信（JSONボディ・ステータスのみ確認）
    pub async fn post_status<B>(&self, endpoint: &str, body: &B) -> AppResult<()>
    where
        B: Serialize,
    {
        let request = self.mutation_request(reqwest::Method::POST, endpoint).await?;
        self.send_status_with_retry(request.json(body), "POST", endpoint)
            .await
    }

    /// POSTリクエストを送信（ボディなし・ステータスのみ確認）
    pub async fn post_empty_status(&self, endpoint: &str) -> AppResult<()> {
        let request = self.mutation_request(reqwest::Method::POST, endpoint).await?;
        self.send_status_with_retry(request, "POST", endpoint).await
    }

    /// PUTリクエストを送信
    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let request = self.mutation_request(reqwest::Method::PUT, endpoint).await?;
        self.send_request_with_retry(request.json(body), "PUT", endpoint)
            .await
    }

    /// DELETEリクエストを送信
    ///
    /// DELETEリクエストは通常レスポンスボディがないため、成功ステータスのみチェック
    pub async fn delete(&self, endpoint: &str) -> AppResult<()> {
        let request = self.mutation_request(reqwest::Method::DELETE, endpoint).await?;
        self.send_status_with_retry(request, "DELETE", endpoint)
            .await
    }

    /// 更新系リクエストのビルダーを作成する
    ///
    /// CSRFトークンを取得し、X-CSRF-Tokenヘッダーを付与する。
    async fn mutation_request(
        &self,
        method: reqwest::Method,
        endpoint: &str,
    ) -> AppResult<reqwest::RequestBuilder> {
        let token = self.csrf_token().await?;
        let url = format!("{}{endpoint}", self.config.base_url);

        Ok(self
            .client
            .request(method, &url)
            .header("X-CSRF-Token", token))
    }

    /// リトライ機能付きでリクエストを送信し、JSONレスポンスを解析する
    async fn send_request_with_retry<T>(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send_with_retry(request, method, endpoint).await?;

        if response.status().is_success() {
            let result: T = response
                .json()
                .await
                .map_err(|e| AppError::ExternalService(format!("レスポンス解析エラー: {e}")))?;

            info!("{method}リクエスト成功: endpoint={endpoint}");
            Ok(result)
        } else {
            Err(self.handle_error_response(response).await)
        }
    }

    /// リトライ機能付きでリクエストを送信し、成功ステータスのみ確認する
    async fn send_status_with_retry(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> AppResult<()> {
        let response = self.send_with_retry(request, method, endpoint).await?;

        if response.status().is_success() {
            info!("{method}リクエスト成功: endpoint={endpoint}");
            Ok(())
        } else {
            Err(self.handle_error_response(response).await)
        }
    }

    /// 通信エラー時のみ指数バックオフでリトライして送信する
    ///
    /// HTTPエラーステータスはリトライ対象外（即座に呼び出し元へ返す）。
    async fn send_with_retry(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> AppResult<Response> {
        let mut attempts = 0;
        loop {
            match request.try_clone() {
                Some(cloned_request) => match cloned_request.send().await {
                    Ok(response) => return Ok(response),
                    Err(e) => {
                        if attempts < self.config.max_retries {
                            attempts += 1;
                            let delay = Duration::from_secs(2_u64.pow(attempts));
                            warn!(
                                "{method}リクエスト失敗、リトライします: endpoint={endpoint}, attempt={attempts}/{}, delay={delay:?}",
                                self.config.max_retries
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        } else {
                            return Err(AppError::ExternalService(format!(
                                "バックエンドAPIへの接続に失敗しました: {e}"
                            )));
                        }
                    }
                },
                None => {
                    return Err(AppError::ExternalService(
                        "リクエストのクローンに失敗しました".to_string(),
                    ));
                }
            }
        }
    }

    /// エラーレスポンスを処理し、バックエンドのエラーメッセージを取り出す
    async fn handle_error_response(&self, response: Response) -> AppError {
        let status = response.status();
        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "レスポンス読み取り失敗".to_string());

        // バックエンドの構造化エラーレスポンス（{"error": "..."}）の解析を試行
        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
            warn!(
                "バックエンドAPIエラー: status={}, message={}",
                status.as_u16(),
                error_response.error
            );
            AppError::ExternalService(error_response.error)
        } else {
            warn!(
                "バックエンドAPIから非構造化エラーレスポンス: status={}, body={response_text}",
                status.as_u16()
            );
            AppError::ExternalService(format!(
                "バックエンドAPIエラー: status={}",
                status.as_u16()
            ))
        }
    }
}
