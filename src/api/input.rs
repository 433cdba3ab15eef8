// ==========================================
// MES 后端 - 请求字段解析
// ==========================================
// 职责: 兼容前端表单的宽松取值（空字符串、数字字符串等）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::shift::parse_time_of_day;
use crate::domain::types::MachineStatus;
use crate::repository::sql_utils::parse_ts;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// 可空数值：null / "" → None，数字或数字字符串 → Some
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(v)) => Ok(Some(v)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("不是合法的数值: {}", s))),
    }
}

/// 可空文本：null / 空白字符串 → None
pub fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// 必填文本字段
pub fn require_text(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// 必填状态字段，只接受 RUNNING / STOPPED
pub fn require_status(value: Option<&str>) -> ApiResult<MachineStatus> {
    let raw = value.ok_or_else(|| ApiError::InvalidInput("status is required".to_string()))?;
    MachineStatus::parse(raw).ok_or_else(|| {
        ApiError::InvalidInput(format!("status must be RUNNING or STOPPED: {}", raw))
    })
}

/// 必填时间戳字段
pub fn require_timestamp(field: &str, value: Option<&str>) -> ApiResult<DateTime<Utc>> {
    match value {
        Some(raw) => parse_ts(raw).ok_or_else(|| {
            ApiError::InvalidInput(format!("{} is not a valid timestamp: {}", field, raw))
        }),
        None => Err(ApiError::InvalidInput(format!("{} is required", field))),
    }
}

/// 可选时间戳字段
pub fn optional_timestamp(field: &str, value: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    value.map(|raw| require_timestamp(field, Some(raw))).transpose()
}

/// 必填班次时刻字段
pub fn require_time_of_day(field: &str, value: Option<&str>) -> ApiResult<NaiveTime> {
    match value {
        Some(raw) => parse_time_of_day(raw).ok_or_else(|| {
            ApiError::InvalidInput(format!("{} must be HH:MM or HH:MM:SS: {}", field, raw))
        }),
        None => Err(ApiError::InvalidInput(format!("{} is required", field))),
    }
}

/// 可选日期字段（YYYY-MM-DD）
pub fn optional_date(field: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                ApiError::InvalidInput(format!("{} must be YYYY-MM-DD: {}", field, raw))
            })
        })
        .transpose()
}
