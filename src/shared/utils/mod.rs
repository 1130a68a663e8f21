use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Asia::Tokyo;

/// 日付文字列のバリデーション
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 有効な日付の場合はOk(())、無効な場合はエラー
///
/// # バリデーション規則
/// - YYYY-MM-DD形式であること
/// - 実在する日付であること
/// - 1900年以降、2100年以前であること
pub fn validate_date(date_str: &str) -> AppResult<()> {
    // 基本的な形式チェック
    if date_str.len() != 10 {
        return Err(AppError::validation(
            "日付はYYYY-MM-DD形式で入力してください",
        ));
    }

    // ハイフンの位置チェック
    if (date_str.chars().nth(4) != Some('-')) || (date_str.chars().nth(7) != Some('-')) {
        return Err(AppError::validation(
            "日付はYYYY-MM-DD形式で入力してください",
        ));
    }

    // 日付として解析可能かチェック
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::validation("無効な日付です"))?;

    // 年の範囲チェック
    let year = date.year();
    if !(1900..=2100).contains(&year) {
        return Err(AppError::validation(
            "日付は1900年から2100年の間で入力してください",
        ));
    }

    Ok(())
}

/// 必須フィールドのバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `field_name` - フィールド名（エラーメッセージ用）
pub fn validate_required_field(text: &str, field_name: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::validation(format!("{field_name}は必須項目です")));
    }
    Ok(())
}

/// 日付文字列をバックエンド送信用のワイヤー形式に変換
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// `YYYY-MM-DDT00:00:00Z` 形式の文字列、または変換失敗時はエラー
pub fn formatted_date(date_str: &str) -> AppResult<String> {
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::validation("日付の形式が正しくありません"))?;

    Ok(format!("{}T00:00:00Z", date.format("%Y-%m-%d")))
}

/// ISO形式の日付文字列を画面表示用にフォーマット
///
/// 解析に失敗した場合は入力文字列をそのまま返す。
///
/// # 引数
/// * `date_str` - ISO形式の日付文字列（例: "2025-08-16T10:00:00Z"）
///
/// # 戻り値
/// `YYYY/MM/DD` 形式の文字列
pub fn format_date_for_display(date_str: &str) -> String {
    match DateTime::parse_from_rfc3339(date_str) {
        Ok(parsed) => parsed.format("%Y/%m/%d").to_string(),
        Err(_) => {
            log::warn!("表示用日付の解析に失敗しました: date={date_str}");
            date_str.to_string()
        }
    }
}

/// 今日の日付をYYYY-MM-DD形式で取得（JST基準）
pub fn get_today_date_jst() -> String {
    let now_jst = Utc::now().with_timezone(&Tokyo);
    now_jst.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date() {
        // 有効な日付
        assert!(validate_date("2024-01-01").is_ok());
        assert!(validate_date("2024-12-31").is_ok());
        assert!(validate_date("2000-02-29").is_ok()); // うるう年

        // 無効な日付
        assert!(validate_date("2024-13-01").is_err()); // 無効な月
        assert!(validate_date("2024-02-30").is_err()); // 無効な日
        assert!(validate_date("2023-02-29").is_err()); // 非うるう年
        assert!(validate_date("24-01-01").is_err()); // 形式エラー
        assert!(validate_date("2024/01/01").is_err()); // 区切り文字エラー
        assert!(validate_date("1899-01-01").is_err()); // 年の範囲外
        assert!(validate_date("2101-01-01").is_err()); // 年の範囲外
    }

    #[test]
    fn test_validate_required_field() {
        assert!(validate_required_field("有効な値", "テスト").is_ok());
        assert!(validate_required_field("  有効な値  ", "テスト").is_ok()); // 前後の空白は許可

        assert!(validate_required_field("", "テスト").is_err());
        assert!(validate_required_field("   ", "テスト").is_err()); // 空白のみ
    }

    #[test]
    fn test_formatted_date() {
        assert_eq!(
            formatted_date("2025-08-16").unwrap(),
            "2025-08-16T00:00:00Z"
        );
        assert_eq!(
            formatted_date("2024-02-29").unwrap(),
            "2024-02-29T00:00:00Z"
        );

        assert!(formatted_date("2025/08/16").is_err());
        assert!(formatted_date("invalid").is_err());
    }

    #[test]
    fn test_format_date_for_display() {
        assert_eq!(
            format_date_for_display("2025-08-16T10:00:00Z"),
            "2025/08/16"
        );
        assert_eq!(
            format_date_for_display("2025-08-16T10:00:00+09:00"),
            "2025/08/16"
        );

        // 解析できない場合は入力をそのまま返す
        assert_eq!(format_date_for_display("不正な日付"), "不正な日付");
    }

    #[test]
    fn test_get_today_date_jst() {
        let today = get_today_date_jst();

        // YYYY-MM-DD形式であることを確認
        assert_eq!(today.len(), 10);
        assert!(validate_date(&today).is_ok());
    }
}
