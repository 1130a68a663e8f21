// 機能モジュール構造
pub mod features;
pub mod shared;

use features::scan::server::ScanProxyServer;
use log::info;
use shared::config::environment::{
    initialize_logging_system, load_environment_variables, ProviderConfig, ScanProxyConfig,
};
use shared::errors::{AppError, AppResult};

/// レシートスキャンプロキシサーバーを起動する
///
/// # 処理内容
/// 1. 環境変数の読み込み（開発環境のみ.env）
/// 2. ログシステムの初期化
/// 3. プロバイダー設定・プロキシ設定の読み込みと検証
/// 4. サーバー起動、終了シグナルの待機
pub async fn run() -> AppResult<()> {
    eprintln!("=== スキャンプロキシ初期化開始 ===");

    // 環境に応じた.envファイルを読み込み（ログシステム初期化前に実行）
    load_environment_variables();

    // ログシステムを初期化（.envファイル読み込み後）
    initialize_logging_system();

    // プロバイダー設定を読み込み
    let provider_config = ProviderConfig::from_env().map_err(|e| {
        AppError::configuration(format!("プロバイダー設定の読み込みに失敗しました: {e}"))
    })?;
    if let Err(e) = provider_config.validate() {
        return Err(AppError::configuration(e));
    }

    let proxy_config = ScanProxyConfig::from_env();

    // サーバーを起動
    let server = ScanProxyServer::new(proxy_config, provider_config)?;
    let port = server.start().await?;
    info!("スキャンプロキシが待ち受け中です: port={port}");

    eprintln!("=== スキャンプロキシ初期化完了 ===");

    // 終了シグナルを待機
    tokio::signal::ctrl_c().await?;
    info!("終了シグナルを受信しました。サーバーを停止します");

    Ok(())
}
