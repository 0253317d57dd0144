// ==========================================
// 库存合并决策 - 批次号解析
// ==========================================
// 批次号格式: 前 2 位为前缀，倒数第 4~3 位为周号（可带空白/正号），末 2 位为年份 (20YY)
// 日期: 该年第 N 周的周一（周一为一周首日，首个周一之前为第 0 周）
// 红线: 解析失败不抛错，返回 Unknown
// ==========================================

use crate::domain::types::BatchDate;
use chrono::{Datelike, Duration, NaiveDate};

/// 批次号最小有效长度（字符数）
pub const MIN_BATCH_CODE_LEN: usize = 10;

/// 批次号解析结果
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedBatch {
    pub prefix: Option<String>,
    pub date: BatchDate,
}

impl ParsedBatch {
    fn unknown() -> Self {
        Self {
            prefix: None,
            date: BatchDate::Unknown,
        }
    }
}

/// 解析批次号
///
/// # 返回
/// - 长度不足 10: (None, Unknown)
/// - 年/周非数字或组合无效: (Some(prefix), Unknown)
/// - 否则: (Some(prefix), Known(周一日期))
pub fn parse_batch_code(code: &str) -> ParsedBatch {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() < MIN_BATCH_CODE_LEN {
        return ParsedBatch::unknown();
    }

    let prefix: String = chars[..2].iter().collect();
    let len = chars.len();

    let date = match (
        two_digits(&chars[len - 2..]),
        week_number(&chars[len - 4..len - 2]),
    ) {
        (Some(yy), Some(week)) => monday_of_week(2000 + yy as i32, week)
            .map(BatchDate::Known)
            .unwrap_or(BatchDate::Unknown),
        _ => BatchDate::Unknown,
    };

    ParsedBatch {
        prefix: Some(prefix),
        date,
    }
}

/// 年份: 严格两位数字
fn two_digits(chars: &[char]) -> Option<u32> {
    let tens = chars.first()?.to_digit(10)?;
    let ones = chars.get(1)?.to_digit(10)?;
    Some(tens * 10 + ones)
}

/// 周号: 允许前后空白与正号（如 " 3"、"+3"）
fn week_number(chars: &[char]) -> Option<u32> {
    let raw: String = chars.iter().collect();
    raw.trim().parse::<u32>().ok()
}

/// 计算 `year` 年第 `week` 周的周一
///
/// 第 1 周从当年第一个周一开始；第 0 周取 1 月 1 日当天或之前的周一
/// （可能落在上一年 12 月）。周号上限 53。
pub fn monday_of_week(year: i32, week: u32) -> Option<NaiveDate> {
    if week > 53 {
        return None;
    }

    let jan_first = NaiveDate::from_yo_opt(year, 1)?;
    let first_weekday = jan_first.weekday().num_days_from_monday() as i64;

    if week == 0 {
        return jan_first.checked_sub_signed(Duration::days(first_weekday));
    }

    // 第 0 周长度（1 月 1 日到首个周一之前的天数）
    let week_zero_len = (7 - first_weekday) % 7;
    let offset = week_zero_len + 7 * (week as i64 - 1);
    jan_first.checked_add_signed(Duration::days(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_short_code_is_unknown() {
        let parsed = parse_batch_code("AB0324W1");
        assert_eq!(parsed.prefix, None);
        assert_eq!(parsed.date, BatchDate::Unknown);
    }

    #[test]
    fn test_week_three_of_2024() {
        let parsed = parse_batch_code("AB12340324");
        assert_eq!(parsed.prefix.as_deref(), Some("AB"));

        let date = parsed.date.known().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(date.weekday(), Weekday::Mon);
        assert_eq!(date.iso_week().week(), 3);
        assert_eq!(date.iso_week().year(), 2024);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let code = "XY99991523";
        assert_eq!(parse_batch_code(code), parse_batch_code(code));
    }

    #[test]
    fn test_year_not_starting_on_monday() {
        // 2025-01-01 为周三，首个周一为 01-06
        assert_eq!(
            monday_of_week(2025, 1),
            NaiveDate::from_ymd_opt(2025, 1, 6)
        );
        assert_eq!(
            monday_of_week(2025, 10),
            NaiveDate::from_ymd_opt(2025, 3, 10)
        );
    }

    #[test]
    fn test_week_zero() {
        // 2024-01-01 为周一
        assert_eq!(monday_of_week(2024, 0), NaiveDate::from_ymd_opt(2024, 1, 1));
        // 2025 第 0 周的周一落在 2024 年
        assert_eq!(
            monday_of_week(2025, 0),
            NaiveDate::from_ymd_opt(2024, 12, 30)
        );

        let parsed = parse_batch_code("AB12340025");
        assert_eq!(parsed.prefix.as_deref(), Some("AB"));
        assert_eq!(
            parsed.date.known(),
            NaiveDate::from_ymd_opt(2024, 12, 30)
        );
    }

    #[test]
    fn test_week_out_of_range() {
        assert_eq!(monday_of_week(2024, 54), None);
        assert_eq!(parse_batch_code("AB12345424").date, BatchDate::Unknown);
    }

    #[test]
    fn test_week_allows_padding_and_sign() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_batch_code("AB1234 324").date.known(), expected);
        assert_eq!(parse_batch_code("AB1234+324").date.known(), expected);
        assert_eq!(parse_batch_code("AB1234-324").date, BatchDate::Unknown);
        // 年份不接受空白
        assert_eq!(parse_batch_code("AB123403 4").date, BatchDate::Unknown);
    }

    #[test]
    fn test_non_digit_year_or_week() {
        let parsed = parse_batch_code("ABCDEFGHIJ");
        assert_eq!(parsed.prefix.as_deref(), Some("AB"));
        assert_eq!(parsed.date, BatchDate::Unknown);
    }

    #[test]
    fn test_multibyte_characters_counted_as_chars() {
        // 9 个字符（字节数大于 10）仍视为过短
        assert_eq!(parse_batch_code("批次号230324").prefix, None);
        let parsed = parse_batch_code("批次号12340324");
        assert_eq!(parsed.prefix.as_deref(), Some("批次"));
        assert!(parsed.date.is_known());
    }
}
