// 支出機能モジュール

pub mod api_commands;
pub mod form;
pub mod models;

pub use api_commands::{create_expense, delete_expense, fetch_budget_list, update_expense};
pub use form::ExpenseForm;
pub use models::{Expense, ExpenseDraft, ExpenseRequest};
