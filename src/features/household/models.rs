use serde::{Deserialize, Serialize};

/// 招待コード発行レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct InviteCodeResponse {
    pub invite_code: String,
}

/// 世帯参加リクエスト
#[derive(Debug, Serialize, Deserialize)]
pub struct JoinHouseholdRequest {
    pub invite_code: String,
}
