use serde::{Deserialize, Serialize};

use crate::shared::utils::get_today_date_jst;

/// 支出データモデル
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub store_name: String,
    pub date: String,
    pub category: String,
    pub memo: String,
    pub created_at: String,
    pub payer_name: Option<String>,
}

/// 支出登録・更新用DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseRequest {
    pub amount: i64,
    pub store_name: String,
    pub date: String,
    pub category: String,
    pub memo: String,
    pub payer_id: i64,
}

/// 支出入力フォームの下書き状態
///
/// フォームの入力値はすべて文字列として保持し、送信時に数値へ変換する。
/// スキャン結果のマージ先でもある。
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub amount: String,
    pub store_name: String,
    pub date: String,
    pub category: String,
    pub memo: String,
    pub payer_id: String,
}

impl ExpenseDraft {
    /// 新しい下書きを作成する
    ///
    /// # 引数
    /// * `payer_id` - デフォルトの支払者（ログインユーザー）のID
    pub fn new(payer_id: i64) -> Self {
        Self {
            amount: String::new(),
            store_name: String::new(),
            date: get_today_date_jst(),
            category: String::new(),
            memo: String::new(),
            payer_id: payer_id.to_string(),
        }
    }
}
