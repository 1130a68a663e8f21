// 世帯機能モジュール

pub mod api_commands;
pub mod models;

pub use api_commands::{fetch_household_users, generate_invite_code, join_household};
pub use models::{InviteCodeResponse, JoinHouseholdRequest};
