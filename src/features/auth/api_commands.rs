/// バックエンドAPI経由での認証操作
///
/// パスワード認証とLINEログインの両方をバックエンドに委譲する。
/// セッションはCookieで維持されるため、このモジュールはトークンを保持しない。
use crate::features::auth::models::*;
use crate::shared::api_client::BackendClient;
use crate::shared::errors::AppResult;
use log::info;

/// アカウントを新規作成する
pub async fn sign_up(client: &BackendClient, request: &SignUpRequest) -> AppResult<()> {
    client.post_status("/signup", request).await?;

    info!("サインアップ成功: email={}", request.email);
    Ok(())
}

/// メールアドレスとパスワードでログインする
///
/// 成功するとセッションCookieがクライアントに保存される。
pub async fn log_in(client: &BackendClient, request: &LoginRequest) -> AppResult<()> {
    client.post_status("/login", request).await?;

    info!("ログイン成功: email={}", request.email);
    Ok(())
}

/// ログアウトする
pub async fn log_out(client: &BackendClient) -> AppResult<()> {
    client.post_empty_status("/logout").await?;

    info!("ログアウト成功");
    Ok(())
}

/// ログイン中のユーザー情報を取得する
pub async fn fetch_login_user(client: &BackendClient) -> AppResult<LoginUser> {
    let user: LoginUser = client.get("/user").await?;

    info!("ログインユーザー取得成功: user_id={}", user.id);
    Ok(user)
}

/// ユーザー情報を更新する
pub async fn update_user(
    client: &BackendClient,
    request: &UpdateUserRequest,
) -> AppResult<LoginUser> {
    let user: LoginUser = client.put("/user", request).await?;

    info!("ユーザー更新成功: user_id={}", user.id);
    Ok(user)
}

/// ユーザーを削除する
pub async fn delete_user(client: &BackendClient, user_id: i64) -> AppResult<()> {
    let endpoint = format!("/user/{user_id}");
    client.delete(&endpoint).await?;

    info!("ユーザー削除成功: user_id={user_id}");
    Ok(())
}

/// LINE認証コールバックを処理する
///
/// # 引数
/// * `code` - LINEプラットフォームから受け取った認証コード
/// * `state` - CSRF対策のstateパラメータ
///
/// # 戻り値
/// ログイン完了または未登録（アカウント作成・連携が必要）のいずれか
pub async fn line_auth_callback(
    client: &BackendClient,
    code: &str,
    state: &str,
) -> AppResult<LineAuthCallbackResponse> {
    let endpoint = format!("/api/v1/auth/line/callback?code={code}&state={state}");
    let response: LineAuthCallbackResponse = client.get(&endpoint).await?;

    info!("LINE認証コールバック処理成功: status={:?}", response.status);
    Ok(response)
}

/// LINEアカウントで新規アカウントを作成する
pub async fn line_create_account(client: &BackendClient) -> AppResult<MessageResponse> {
    let response: MessageResponse = client.post_empty("/api/v1/auth/line/create").await?;

    info!("LINEアカウント作成成功");
    Ok(response)
}

/// 既存アカウントにLINEアカウントを連携する
pub async fn line_link_account(
    client: &BackendClient,
    email: &str,
    password: &str,
) -> AppResult<MessageResponse> {
    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    let response: MessageResponse = client.post("/api/v1/auth/line/link", &request).await?;

    info!("LINEアカウント連携成功");
    Ok(response)
}
