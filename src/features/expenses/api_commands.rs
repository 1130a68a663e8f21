/// バックエンドAPI経由での支出操作
use crate::features::expenses::models::{Expense, ExpenseRequest};
use crate::shared::api_client::BackendClient;
use crate::shared::errors::AppResult;
use log::info;

/// 支出一覧を取得する
///
/// # 引数
/// * `year` - 対象年
/// * `month` - 対象月（1〜12）
/// * `category` - カテゴリフィルター（オプション）
///
/// # 戻り値
/// 指定月の支出一覧、または失敗時はエラー
pub async fn fetch_budget_list(
    client: &BackendClient,
    year: i32,
    month: u32,
    category: Option<&str>,
) -> AppResult<Vec<Expense>> {
    let mut endpoint = format!("/expenses?year={year}&month={month}");
    if let Some(c) = category {
        endpoint.push_str(&format!("&category={c}"));
    }

    let expenses: Vec<Expense> = client.get(&endpoint).await?;

    info!("支出一覧取得成功: year={year}, month={month}, count={}", expenses.len());
    Ok(expenses)
}

/// 支出を登録する
pub async fn create_expense(
    client: &BackendClient,
    request: &ExpenseRequest,
) -> AppResult<Expense> {
    let expense: Expense = client.post("/expenses", request).await?;

    info!("支出登録成功: expense_id={}", expense.id);
    Ok(expense)
}

/// 支出を更新する
pub async fn update_expense(
    client: &BackendClient,
    expense_id: i64,
    request: &ExpenseRequest,
) -> AppResult<Expense> {
    let endpoint = format!("/expenses/{expense_id}");
    let expense: Expense = client.put(&endpoint, request).await?;

    info!("支出更新成功: expense_id={expense_id}");
    Ok(expense)
}

/// 支出を削除する
pub async fn delete_expense(client: &BackendClient, expense_id: i64) -> AppResult<()> {
    let endpoint = format!("/expenses/{expense_id}");
    client.delete(&endpoint).await?;

    info!("支出削除成功: expense_id={expense_id}");
    Ok(())
}
