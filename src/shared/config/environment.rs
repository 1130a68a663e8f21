/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境変数取得エラー
#[derive(Debug, Clone)]
pub struct EnvVarError {
    /// 変数名
    pub var_name: String,
    /// エラーメッセージ
    pub message: String,
}

impl std::fmt::Display for EnvVarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "環境変数 {} が見つかりません: {}",
            self.var_name, self.message
        )
    }
}

impl std::error::Error for EnvVarError {}

/// 環境変数を取得する（優先順位: 起動時 > コンパイル時 > エラー）
///
/// # 引数
/// * `var_name` - 環境変数名
///
/// # 戻り値
/// 環境変数の値、または見つからない場合はエラー
///
/// # 取得順序
/// 1. 起動時の環境変数（`std::env::var`）
/// 2. コンパイル時の環境変数（`option_env!`マクロ）
/// 3. どちらも見つからない場合はエラー
#[macro_export]
macro_rules! get_env_var {
    ($var_name:expr) => {{
        // 1. 起動時の環境変数を確認
        if let Ok(value) = std::env::var($var_name) {
            log::debug!("環境変数 {} を起動時の環境変数から取得しました", $var_name);
            Ok(value)
        }
        // 2. コンパイル時の環境変数を確認
        else if let Some(value) = option_env!($var_name) {
            log::debug!("環境変数 {} をコンパイル時の環境変数から取得しました", $var_name);
            Ok(value.to_string())
        }
        // 3. どちらも見つからない場合はエラー
        else {
            Err($crate::shared::config::environment::EnvVarError {
                var_name: $var_name.to_string(),
                message: format!(
                    "起動時の環境変数 {} もコンパイル時の環境変数も見つかりませんでした",
                    $var_name
                ),
            })
        }
    }};
}

/// 環境変数を取得する（デフォルト値付き）
///
/// # 引数
/// * `var_name` - 環境変数名
/// * `default_value` - デフォルト値
#[macro_export]
macro_rules! get_env_var_or_default {
    ($var_name:expr, $default_value:expr) => {{
        $crate::get_env_var!($var_name).unwrap_or_else(|_| {
            log::debug!(
                "環境変数 {} が見つからないため、デフォルト値を使用します: {}",
                $var_name,
                $default_value
            );
            $default_value.to_string()
        })
    }};
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. 実行時環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    // フォールバック: ビルド設定に基づく判定
    if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    }
}

/// 環境変数の読み込みを確認する
///
/// # 処理内容
/// 1. 開発環境の場合のみ.envファイルを読み込み
/// 2. 本番ビルドでは環境変数は実行時に設定されることを前提とする
///
/// # 注意
/// - 本番環境では.envファイルは読み込まれません（秘匿情報がバイナリに埋め込まれるのを防ぐため）
pub fn load_environment_variables() {
    let is_development = cfg!(debug_assertions);

    if is_development {
        eprintln!("開発環境: .envファイルを読み込みます");

        match dotenv::dotenv() {
            Ok(path) => {
                eprintln!("環境ファイルを読み込みました: {}", path.display());
            }
            Err(e) => {
                eprintln!("環境ファイルの読み込みに失敗: {e}");
                eprintln!("環境変数が設定されていることを確認してください");
            }
        }
    } else {
        eprintln!("本番環境: 環境変数は実行時に設定されます");
    }
}

/// ログシステムを初期化する
///
/// # 処理内容
/// 1. ログレベルを環境変数 LOG_LEVEL から取得（未設定時は環境に応じたデフォルト）
/// 2. env_loggerを初期化
pub fn initialize_logging_system() {
    let debug_mode = get_environment() == Environment::Development;
    let log_level_str = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if debug_mode {
            "debug".to_string()
        } else {
            "info".to_string()
        }
    });

    let log_level = match log_level_str.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .init();

    log::info!("ログシステムを初期化しました: level={log_level_str}");
}

/// バックエンドAPI設定を管理する構造体
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// バックエンドAPIサーバーのベースURL
    pub base_url: String,
    /// APIリクエストのタイムアウト（秒）
    pub timeout_seconds: u64,
    /// APIリクエストの最大リトライ回数
    pub max_retries: u32,
}

impl ApiConfig {
    /// 環境変数からAPI設定を読み込む
    ///
    /// # エラー
    /// 必須の環境変数 BACKEND_API_URL が見つからない場合はエラー
    pub fn from_env() -> Result<Self, EnvVarError> {
        let base_url = crate::get_env_var!("BACKEND_API_URL")?;

        let timeout_seconds = crate::get_env_var_or_default!("API_TIMEOUT_SECONDS", "30")
            .parse()
            .unwrap_or_else(|_| {
                log::warn!(
                    "API_TIMEOUT_SECONDSのパースに失敗しました。デフォルト値30秒を使用します"
                );
                30
            });

        let max_retries = crate::get_env_var_or_default!("API_MAX_RETRIES", "3")
            .parse()
            .unwrap_or_else(|_| {
                log::warn!("API_MAX_RETRIESのパースに失敗しました。デフォルト値3回を使用します");
                3
            });

        log::info!(
            "バックエンドAPI設定: base_url={base_url}, timeout={timeout_seconds}s, max_retries={max_retries}"
        );

        Ok(Self {
            base_url,
            timeout_seconds,
            max_retries,
        })
    }

    /// 設定を検証する
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("バックエンドAPIのベースURLが設定されていません".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("APIタイムアウトは0より大きい値である必要があります".to_string());
        }

        Ok(())
    }
}

/// OCRプロバイダー（TabScanner）設定を管理する構造体
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// プロバイダーAPIのベースURL
    pub base_url: String,
    /// 静的APIキー（apikeyヘッダーで送信）
    pub api_key: String,
    /// プロバイダーへのリクエストタイムアウト（秒）
    pub timeout_seconds: u64,
}

impl ProviderConfig {
    /// 環境変数からプロバイダー設定を読み込む
    ///
    /// # エラー
    /// 必須の環境変数 TABSCANNER_API_KEY が見つからない場合はエラー
    pub fn from_env() -> Result<Self, EnvVarError> {
        let api_key = crate::get_env_var!("TABSCANNER_API_KEY")?;
        let base_url = crate::get_env_var_or_default!(
            "TABSCANNER_API_URL",
            "https://api.tabscanner.com"
        );
        let timeout_seconds = crate::get_env_var_or_default!("TABSCANNER_TIMEOUT_SECONDS", "30")
            .parse()
            .unwrap_or(30);

        log::info!("OCRプロバイダー設定: base_url={base_url}, timeout={timeout_seconds}s");

        Ok(Self {
            base_url,
            api_key,
            timeout_seconds,
        })
    }

    /// 設定を検証する
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err("プロバイダーのAPIキーが設定されていません".to_string());
        }

        if self.base_url.is_empty() {
            return Err("プロバイダーのベースURLが設定されていません".to_string());
        }

        Ok(())
    }
}

/// スキャンプロキシサーバー設定を管理する構造体
///
/// ポーリングの試行回数と間隔は固定値運用（指数バックオフなし）。
/// 最悪待ち時間は (max_attempts - 1) × poll_interval_ms で決定的になる。
#[derive(Debug, Clone)]
pub struct ScanProxyConfig {
    /// サーバーのバインドポート（0で自動割り当て）
    pub port: u16,
    /// ポーリングの最大試行回数
    pub poll_max_attempts: u32,
    /// ポーリングの試行間隔（ミリ秒）
    pub poll_interval_ms: u64,
}

impl Default for ScanProxyConfig {
    fn default() -> Self {
        Self {
            port: 8787,
            poll_max_attempts: 15,
            poll_interval_ms: 2000,
        }
    }
}

impl ScanProxyConfig {
    /// 環境変数からスキャンプロキシ設定を読み込む
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = crate::get_env_var_or_default!("SCAN_PROXY_PORT", "8787")
            .parse()
            .unwrap_or_else(|_| {
                log::warn!("SCAN_PROXY_PORTのパースに失敗しました。デフォルト値8787を使用します");
                defaults.port
            });

        Self {
            port,
            poll_max_attempts: defaults.poll_max_attempts,
            poll_interval_ms: defaults.poll_interval_ms,
        }
    }
}
