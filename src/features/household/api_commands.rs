/// バックエンドAPI経由での世帯操作
///
/// 世帯への参加は招待コードで行う。コードの発行・検証はバックエンドが担当する。
use crate::features::auth::models::LoginUser;
use crate::features::household::models::{InviteCodeResponse, JoinHouseholdRequest};
use crate::shared::api_client::BackendClient;
use crate::shared::errors::AppResult;
use log::info;

/// 世帯の招待コードを発行する
pub async fn generate_invite_code(client: &BackendClient) -> AppResult<String> {
    let response: InviteCodeResponse = client.post_empty("/household/invite-code").await?;

    info!("招待コード発行成功");
    Ok(response.invite_code)
}

/// 招待コードを使って世帯に参加する
pub async fn join_household(client: &BackendClient, invite_code: &str) -> AppResult<()> {
    let request = JoinHouseholdRequest {
        invite_code: invite_code.to_string(),
    };
    client.post_status("/household/join", &request).await?;

    info!("世帯参加成功");
    Ok(())
}

/// 世帯メンバーの一覧を取得する
pub async fn fetch_household_users(client: &BackendClient) -> AppResult<Vec<LoginUser>> {
    let users: Vec<LoginUser> = client.get("/household/users").await?;

    info!("世帯メンバー取得成功: count={}", users.len());
    Ok(users)
}
