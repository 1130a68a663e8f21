use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 外部サービス連携でのエラー（バックエンドAPI・OCRプロバイダー）
    #[error("外部サービスエラー: {0}")]
    ExternalService(String),

    /// ポーリングの試行回数を使い切った場合のエラー
    #[error("タイムアウト: {0}")]
    Timeout(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::ExternalService(msg) => msg.clone(),
            AppError::Timeout(msg) => msg.clone(),
            AppError::Configuration(_) => "設定エラーが発生しました".to_string(),
            AppError::Io(_) => "ファイル操作でエラーが発生しました".to_string(),
            AppError::Json(_) => "データ形式の解析でエラーが発生しました".to_string(),
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 外部サービスエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `service` - サービス名
    /// * `message` - エラーメッセージ
    pub fn external_service<S: Into<String>>(service: S, message: S) -> Self {
        AppError::ExternalService(format!("{}: {}", service.into(), message.into()))
    }

    /// タイムアウトエラーを作成するヘルパー関数
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        AppError::Timeout(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}

/// reqwest::ErrorからAppErrorへの変換
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::ExternalService(format!("HTTP通信エラー: {error}"))
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let validation_error = AppError::validation("金額が不正です");
        assert_eq!(validation_error.user_message(), "金額が不正です");

        let not_found_error = AppError::not_found("支出");
        assert_eq!(not_found_error.user_message(), "支出が見つかりません");

        let timeout_error = AppError::timeout("解析がタイムアウトしました");
        assert_eq!(timeout_error.user_message(), "解析がタイムアウトしました");
    }

    #[test]
    fn test_helper_functions() {
        let validation_error = AppError::validation("テストメッセージ");
        assert!(matches!(validation_error, AppError::Validation(_)));

        let external_error = AppError::external_service("TabScanner", "接続失敗");
        assert!(matches!(external_error, AppError::ExternalService(_)));

        let config_error = AppError::configuration("APIキー未設定");
        assert!(matches!(config_error, AppError::Configuration(_)));
    }

    #[test]
    fn test_error_display() {
        let error = AppError::validation("詳細テスト");
        assert!(format!("{error}").contains("詳細テスト"));
    }
}
