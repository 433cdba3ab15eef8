// ==========================================
// MES 后端 - 班次管理 API
// ==========================================

use std::sync::Arc;

use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::input::{lenient_f64, non_empty_string, require_text, require_time_of_day};
use crate::domain::shift::Shift;
use crate::repository::error::RepositoryError;
use crate::repository::shift_repo::{ShiftDraft, ShiftRepository};

pub struct ShiftApi {
    shift_repo: Arc<ShiftRepository>,
}

impl ShiftApi {
    pub fn new(shift_repo: Arc<ShiftRepository>) -> Self {
        Self { shift_repo }
    }

    pub fn list_shifts(&self) -> ApiResult<Vec<Shift>> {
        Ok(self.shift_repo.list_all()?)
    }

    pub fn get_shift(&self, shift_id: i64) -> ApiResult<Shift> {
        self.shift_repo
            .find_by_id(shift_id)?
            .ok_or_else(|| RepositoryError::not_found("Shift", shift_id).into())
    }

    pub fn create_shift(&self, input: ShiftInput) -> ApiResult<i64> {
        let draft = input.into_draft()?;
        let id = self.shift_repo.insert(&draft)?;
        tracing::info!(shift_id = id, name = %draft.name, "班次已创建");
        Ok(id)
    }

    pub fn update_shift(&self, shift_id: i64, input: ShiftInput) -> ApiResult<()> {
        let draft = input.into_draft()?;
        if self.shift_repo.update(shift_id, &draft)? == 0 {
            return Err(RepositoryError::not_found("Shift", shift_id).into());
        }
        Ok(())
    }

    pub fn delete_shift(&self, shift_id: i64) -> ApiResult<()> {
        if self.shift_repo.delete(shift_id)? == 0 {
            return Err(RepositoryError::not_found("Shift", shift_id).into());
        }
        Ok(())
    }
}

/// 班次新增/修改请求（时刻格式 HH:MM 或 HH:MM:SS）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShiftInput {
    #[serde(default)]
    pub line_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub shift_quantity: i64,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub operator: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration: Option<f64>,
}

impl ShiftInput {
    fn into_draft(self) -> ApiResult<ShiftDraft> {
        let name = require_text("name", &self.name)?;
        let start_time = require_time_of_day("start_time", self.start_time.as_deref())?;
        let end_time = require_time_of_day("end_time", self.end_time.as_deref())?;
        if self.shift_quantity < 0 {
            return Err(ApiError::InvalidInput(
                "shift_quantity must be >= 0".to_string(),
            ));
        }
        Ok(ShiftDraft {
            line_id: self.line_id,
            name,
            start_time,
            end_time,
            shift_quantity: self.shift_quantity,
            operator: self.operator,
            duration: self.duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use std::sync::{Arc, Mutex};

    fn api() -> ShiftApi {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        ShiftApi::new(Arc::new(ShiftRepository::new(conn)))
    }

    fn input(start: Option<&str>, end: Option<&str>) -> ShiftInput {
        ShiftInput {
            name: "Morning".to_string(),
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_times_rejected() {
        let api = api();
        let err = api.create_shift(input(None, Some("14:00"))).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        let err = api.create_shift(input(Some("06:00"), None)).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn test_crud_cycle() {
        let api = api();
        let id = api.create_shift(input(Some("06:00"), Some("14:00"))).unwrap();
        assert_eq!(api.get_shift(id).unwrap().name, "Morning");

        let mut changed = input(Some("22:00"), Some("06:00"));
        changed.name = "Night".to_string();
        api.update_shift(id, changed).unwrap();
        assert_eq!(api.get_shift(id).unwrap().name, "Night");

        api.delete_shift(id).unwrap();
        assert_eq!(api.get_shift(id).unwrap_err().code(), "NOT_FOUND");
        assert_eq!(api.delete_shift(id).unwrap_err().code(), "NOT_FOUND");
    }
}
