use serde::{Deserialize, Serialize};

/// ログインユーザーデータモデル
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub image: String,
    pub admin: bool,
    pub household_id: i64,
}

/// サインアップ用DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// ログイン用DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// ユーザー更新用DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub image: Option<String>,
}

/// LINE認証コールバックの結果ステータス
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineAuthStatus {
    /// 既存アカウントでログイン完了
    LoggedIn,
    /// 未登録（アカウント作成または連携が必要）
    Unregistered,
}

/// LINE認証コールバックレスポンス
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LineAuthCallbackResponse {
    pub message: Option<String>,
    pub status: LineAuthStatus,
    pub line_name: Option<String>,
    pub line_picture: Option<String>,
}

/// メッセージのみのレスポンス（LINEアカウント作成・連携）
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_user_serialization() {
        let user = LoginUser {
            id: 1,
            email: "taro@example.com".to_string(),
            name: "太郎".to_string(),
            image: "".to_string(),
            admin: false,
            household_id: 2,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"household_id\":2"));

        let deserialized: LoginUser = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, user.id);
        assert_eq!(deserialized.name, user.name);
    }

    #[test]
    fn test_line_auth_callback_logged_in() {
        let json = r#"{
            "message": "ログインしました",
            "status": "logged_in",
            "line_name": null,
            "line_picture": null
        }"#;

        let response: LineAuthCallbackResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, LineAuthStatus::LoggedIn);
        assert_eq!(response.message, Some("ログインしました".to_string()));
    }

    #[test]
    fn test_line_auth_callback_unregistered() {
        let json = r#"{
            "status": "unregistered",
            "line_name": "太郎",
            "line_picture": "https://example.com/picture.jpg"
        }"#;

        let response: LineAuthCallbackResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, LineAuthStatus::Unregistered);
        assert_eq!(response.line_name, Some("太郎".to_string()));
        assert!(response.message.is_none());
    }
}
