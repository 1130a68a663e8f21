use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use url::Url;

use crate::features::scan::handlers::ScanHandlers;
use crate::features::scan::provider::ProviderClient;
use crate::shared::config::environment::{ProviderConfig, ScanProxyConfig};
use crate::shared::errors::AppResult;

/// レシートスキャンプロキシのHTTPサーバー
///
/// フロントエンドとOCRプロバイダーの間に立つ薄いプロキシ。
/// ハンドラーはリクエスト間で状態を共有しない。
pub struct ScanProxyServer {
    config: ScanProxyConfig,
    handlers: Arc<ScanHandlers>,
}

impl ScanProxyServer {
    /// 新しいスキャンプロキシサーバーを作成する
    pub fn new(config: ScanProxyConfig, provider_config: ProviderConfig) -> AppResult<Self> {
        let provider = ProviderClient::new(provider_config)?;
        let handlers = Arc::new(ScanHandlers::new(provider, &config));

        Ok(Self { config, handlers })
    }

    /// サーバーを開始する
    ///
    /// 接続の受け入れはバックグラウンドタスクで行う。
    ///
    /// # 戻り値
    /// バインドした実ポート番号（設定ポート0の場合は自動割り当て）
    pub async fn start(&self) -> AppResult<u16> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        log::info!("スキャンプロキシサーバーを開始しました: http://127.0.0.1:{port}");

        let handlers = Arc::clone(&self.handlers);
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        let handlers = Arc::clone(&handlers);
                        tokio::spawn(async move {
                            let io = TokioIo::new(stream);
                            let service = service_fn(move |req| {
                                handle_request(req, Arc::clone(&handlers))
                            });

                            if let Err(err) =
                                http1::Builder::new().serve_connection(io, service).await
                            {
                                log::error!("HTTP接続処理エラー: {err}");
                            }
                        });
                    }
                    Err(e) => {
                        log::error!("接続受け入れエラー: {e}");
                        break;
                    }
                }
            }
        });

        Ok(port)
    }
}

/// HTTPリクエストをルーティングして処理する
async fn handle_request(
    req: Request<Incoming>,
    handlers: Arc<ScanHandlers>,
) -> Result<Response<String>, Infallible> {
    log::debug!(
        "スキャンプロキシがリクエストを受信: {} {}",
        req.method(),
        req.uri()
    );

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    match (method, path.as_str()) {
        (Method::POST, "/api/scan/input") => {
            let body = match req.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    log::error!("リクエストボディの読み取りに失敗: {e}");
                    return Ok(json_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({"error": "Internal Server Error"}),
                    ));
                }
            };

            let reply = handlers.handle_upload(&body).await;
            Ok(json_response(reply.status, reply.body))
        }
        (Method::GET, "/api/scan/result") => {
            let token = parse_token_query(query.as_deref().unwrap_or(""));
            let reply = handlers.handle_poll(token.as_deref()).await;
            Ok(json_response(reply.status, reply.body))
        }
        _ => {
            log::debug!("未対応のリクエスト: {path}");
            Ok(json_response(
                StatusCode::NOT_FOUND,
                json!({"error": "Not Found"}),
            ))
        }
    }
}

/// クエリ文字列からtokenパラメータを取り出す
fn parse_token_query(query: &str) -> Option<String> {
    let url = Url::parse(&format!("http://localhost/?{query}")).ok()?;

    url.query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.to_string())
}

/// JSONレスポンスを作成する
fn json_response(status: StatusCode, body: Value) -> Response<String> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_query() {
        assert_eq!(
            parse_token_query("token=abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(
            parse_token_query("other=x&token=abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(parse_token_query("token="), Some("".to_string()));
        assert_eq!(parse_token_query("other=x"), None);
        assert_eq!(parse_token_query(""), None);
    }

    #[test]
    fn test_json_response() {
        let response = json_response(StatusCode::BAD_REQUEST, json!({"error": "Token is required"}));

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
        assert!(response.body().contains("Token is required"));
    }
}
