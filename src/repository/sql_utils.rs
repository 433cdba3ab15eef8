// ==========================================
// MES 后端 - SQL 读写辅助
// ==========================================
// 时间统一按 UTC 文本存储: YYYY-MM-DD HH:MM:SS
// 读取时兼容 RFC 3339（历史数据/前端直接写入的 ISO 字符串）
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

/// 数据库时间格式
pub const DB_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 时刻格式（班次）
pub const DB_TIME_FORMAT: &str = "%H:%M:%S";

/// 日期格式
pub const DB_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.format(DB_TS_FORMAT).to_string()
}

pub fn format_ts_opt(ts: &Option<DateTime<Utc>>) -> Option<String> {
    ts.as_ref().map(format_ts)
}

/// 解析时间文本
pub fn parse_ts(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, DB_TS_FORMAT) {
        return Some(ndt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // 前端 datetime-local 控件可能不带秒
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ndt| ndt.and_utc())
}

/// 读取非空时间列
pub fn get_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw).ok_or_else(|| conversion_error(idx, &raw))
}

/// 读取可空时间列
pub fn get_ts_opt(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => parse_ts(&raw)
            .map(Some)
            .ok_or_else(|| conversion_error(idx, &raw)),
        None => Ok(None),
    }
}

/// 读取可空日期列
pub fn get_date_opt(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), DB_DATE_FORMAT)
            .map(Some)
            .map_err(|_| conversion_error(idx, &raw)),
        None => Ok(None),
    }
}

/// 读取班次时刻列
pub fn get_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    crate::domain::shift::parse_time_of_day(&raw).ok_or_else(|| conversion_error(idx, &raw))
}

fn conversion_error(idx: usize, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("无法解析时间字段: {}", raw).into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_round_trip_db_format() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap();
        assert_eq!(format_ts(&ts), "2025-01-15 08:30:00");
        assert_eq!(parse_ts("2025-01-15 08:30:00"), Some(ts));
    }

    #[test]
    fn test_parse_iso_strings() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap();
        assert_eq!(parse_ts("2025-01-15T08:30:00.000Z"), Some(ts));
        assert_eq!(parse_ts("2025-01-15T10:30:00+02:00"), Some(ts));
        assert_eq!(parse_ts("2025-01-15T08:30:00"), Some(ts));
        assert_eq!(parse_ts("2025-01-15T08:30"), Some(ts));
        assert_eq!(parse_ts("not a date"), None);
    }
}
