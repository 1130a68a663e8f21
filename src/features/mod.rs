/// 機能別モジュール
///
/// アプリケーションの機能を機能別に整理したモジュール群。
/// 各機能モジュールは、その機能に関連するコード（モデル、API操作、サービス）
/// を含む自己完結型のユニットです。
// 機能モジュールの宣言
pub mod auth;
pub mod expenses;
pub mod household;
pub mod scan;
