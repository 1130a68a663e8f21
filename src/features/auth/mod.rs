// 認証機能モジュール

pub mod api_commands;
pub mod models;

pub use api_commands::{
    delete_user, fetch_login_user, line_auth_callback, line_create_account, line_link_account,
    log_in, log_out, sign_up, update_user,
};
pub use models::{
    LineAuthCallbackResponse, LineAuthStatus, LoginRequest, LoginUser, MessageResponse,
    SignUpRequest, UpdateUserRequest,
};
