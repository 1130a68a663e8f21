/// 支出入力フォームの状態管理
///
/// 入力値の検証・送信・リセットと、レシートスキャン結果の取り込みを担当する。
/// 所有者はフォームインスタンスのみで、コンポーネント間の共有はしない。
use crate::features::auth::models::LoginUser;
use crate::features::expenses::api_commands;
use crate::features::expenses::models::{Expense, ExpenseDraft, ExpenseRequest};
use crate::features::scan::models::ScanFields;
use crate::shared::api_client::BackendClient;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{formatted_date, validate_date, validate_required_field};
use log::{info, warn};

/// 支出入力フォーム
#[derive(Debug)]
pub struct ExpenseForm {
    /// 入力中の下書き
    pub draft: ExpenseDraft,
    /// フォームに表示するエラーメッセージ
    pub error: Option<String>,
    /// スキャン実行中フラグ（trueの間はファイル選択を無効化する）
    pub is_scanning: bool,
    /// リセット時に戻すデフォルト支払者ID
    default_payer_id: i64,
}

impl ExpenseForm {
    /// 新しいフォームを作成する
    ///
    /// 支払者はログインユーザーがデフォルトになる。
    pub fn new(login_user: &LoginUser) -> Self {
        Self {
            draft: ExpenseDraft::new(login_user.id),
            error: None,
            is_scanning: false,
            default_payer_id: login_user.id,
        }
    }

    /// 下書きを検証して支出登録リクエストを組み立てる
    fn build_request(&self) -> AppResult<ExpenseRequest> {
        let amount: i64 = self
            .draft
            .amount
            .trim()
            .parse()
            .map_err(|_| AppError::validation("金額は有効な数値である必要があります"))?;

        let payer_id: i64 = self
            .draft
            .payer_id
            .trim()
            .parse()
            .map_err(|_| AppError::validation("有効な支払者が選択されていません"))?;

        validate_required_field(&self.draft.store_name, "店名")?;
        validate_required_field(&self.draft.category, "カテゴリー")?;
        validate_date(&self.draft.date)?;

        Ok(ExpenseRequest {
            amount,
            store_name: self.draft.store_name.clone(),
            date: formatted_date(&self.draft.date)?,
            category: self.draft.category.clone(),
            memo: self.draft.memo.clone(),
            payer_id,
        })
    }

    /// フォームを送信する
    ///
    /// 成功時は下書きをリセットし、失敗時は入力値を保持したまま
    /// エラーメッセージをフォームに設定する。
    pub async fn submit(&mut self, client: &BackendClient) -> AppResult<Expense> {
        self.error = None;

        let request = match self.build_request() {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.user_message());
                return Err(e);
            }
        };

        match api_commands::create_expense(client, &request).await {
            Ok(expense) => {
                info!("フォーム送信成功: expense_id={}", expense.id);
                self.draft = ExpenseDraft::new(self.default_payer_id);
                Ok(expense)
            }
            Err(e) => {
                warn!("フォーム送信失敗: {e}");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// スキャン結果をフォームにマージする
    ///
    /// 空でないフィールドのみ上書きし、スキャンが返さなかった項目は
    /// 入力済みの値を保持する。
    pub fn apply_scan_fields(&mut self, fields: &ScanFields) {
        if let Some(establishment) = fields
            .establishment
            .as_deref()
            .filter(|s| !s.is_empty())
        {
            self.draft.store_name = establishment.to_string();
        }

        if let Some(total) = fields.total.as_deref().filter(|s| !s.is_empty()) {
            self.draft.amount = total.to_string();
        }

        if let Some(date) = fields.date.as_deref().filter(|s| !s.is_empty()) {
            self.draft.date = date.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> LoginUser {
        LoginUser {
            id: 1,
            email: "taro@example.com".to_string(),
            name: "太郎".to_string(),
            image: "".to_string(),
            admin: false,
            household_id: 1,
        }
    }

    fn filled_form() -> ExpenseForm {
        let mut form = ExpenseForm::new(&test_user());
        form.draft.amount = "1980".to_string();
        form.draft.store_name = "スーパーマルエツ".to_string();
        form.draft.date = "2025-08-16".to_string();
        form.draft.category = "食費".to_string();
        form
    }

    #[test]
    fn test_build_request_success() {
        let form = filled_form();
        let request = form.build_request().unwrap();

        assert_eq!(request.amount, 1980);
        assert_eq!(request.payer_id, 1);
        assert_eq!(request.date, "2025-08-16T00:00:00Z");
    }

    #[test]
    fn test_build_request_invalid_amount() {
        let mut form = filled_form();
        form.draft.amount = "千九百八十".to_string();

        let err = form.build_request().unwrap_err();
        assert_eq!(err.user_message(), "金額は有効な数値である必要があります");
    }

    #[test]
    fn test_build_request_invalid_payer() {
        let mut form = filled_form();
        form.draft.payer_id = "".to_string();

        let err = form.build_request().unwrap_err();
        assert_eq!(err.user_message(), "有効な支払者が選択されていません");
    }

    #[test]
    fn test_build_request_missing_store_name() {
        let mut form = filled_form();
        form.draft.store_name = "  ".to_string();

        assert!(form.build_request().is_err());
    }

    #[test]
    fn test_apply_scan_fields_merges_present_values() {
        let mut form = filled_form();
        let fields = ScanFields {
            establishment: Some("ローソン".to_string()),
            total: Some("1234".to_string()),
            date: Some("2025-08-16".to_string()),
        };

        form.apply_scan_fields(&fields);

        assert_eq!(form.draft.store_name, "ローソン");
        assert_eq!(form.draft.amount, "1234");
        assert_eq!(form.draft.date, "2025-08-16");
    }

    #[test]
    fn test_apply_scan_fields_keeps_missing_values() {
        let mut form = filled_form();
        let fields = ScanFields {
            establishment: None,
            total: Some("500".to_string()),
            date: None,
        };

        form.apply_scan_fields(&fields);

        // スキャンが返さなかった項目は入力済みの値を保持する
        assert_eq!(form.draft.store_name, "スーパーマルエツ");
        assert_eq!(form.draft.amount, "500");
        assert_eq!(form.draft.date, "2025-08-16");
    }

    #[test]
    fn test_apply_scan_fields_ignores_empty_strings() {
        let mut form = filled_form();
        let fields = ScanFields {
            establishment: Some("".to_string()),
            total: Some("".to_string()),
            date: Some("".to_string()),
        };

        form.apply_scan_fields(&fields);

        assert_eq!(form.draft.store_name, "スーパーマルエツ");
        assert_eq!(form.draft.amount, "1980");
    }
}
