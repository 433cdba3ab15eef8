// ==========================================
// MES 后端 - 停机记录 API
// ==========================================
// 说明: 结束时间为空表示停机仍在进行（计入 OEE 时截止到评估时刻）
// ==========================================

use std::sync::Arc;

use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::input::{non_empty_string, optional_timestamp, require_timestamp};
use crate::domain::stop::Stop;
use crate::repository::error::RepositoryError;
use crate::repository::stop_repo::{StopDraft, StopRepository};

pub struct StopApi {
    stop_repo: Arc<StopRepository>,
}

impl StopApi {
    pub fn new(stop_repo: Arc<StopRepository>) -> Self {
        Self { stop_repo }
    }

    pub fn list_stops(&self) -> ApiResult<Vec<Stop>> {
        Ok(self.stop_repo.list_all()?)
    }

    pub fn get_stop(&self, stop_id: i64) -> ApiResult<Stop> {
        self.stop_repo
            .find_by_id(stop_id)?
            .ok_or_else(|| RepositoryError::not_found("Stop", stop_id).into())
    }

    pub fn create_stop(&self, input: StopInput) -> ApiResult<i64> {
        let draft = input.into_draft()?;
        let id = self.stop_repo.insert(&draft)?;
        tracing::info!(stop_id = id, machine_id = draft.machine_id, "停机记录已创建");
        Ok(id)
    }

    /// 更新停机记录
    ///
    /// 请求未给出 resolved 时，按是否已有结束时间推断
    pub fn update_stop(&self, stop_id: i64, input: StopInput) -> ApiResult<()> {
        let draft = input.into_draft()?;
        if self.stop_repo.update(stop_id, &draft)? == 0 {
            return Err(RepositoryError::not_found("Stop", stop_id).into());
        }
        Ok(())
    }

    pub fn delete_stop(&self, stop_id: i64) -> ApiResult<()> {
        if self.stop_repo.delete(stop_id)? == 0 {
            return Err(RepositoryError::not_found("Stop", stop_id).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopInput {
    #[serde(default)]
    pub machine_id: Option<i64>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub resolved: Option<bool>,
}

impl StopInput {
    fn into_draft(self) -> ApiResult<StopDraft> {
        let machine_id = self
            .machine_id
            .ok_or_else(|| ApiError::InvalidInput("machine_id is required".to_string()))?;
        let start_time = require_timestamp("start_time", self.start_time.as_deref())?;
        let end_time = optional_timestamp("end_time", self.end_time.as_deref())?;
        if let Some(end) = end_time {
            if end < start_time {
                return Err(ApiError::ValidationError(
                    "end_time must not be before start_time".to_string(),
                ));
            }
        }
        Ok(StopDraft {
            machine_id,
            reason: self.reason,
            start_time,
            end_time,
            resolved: self.resolved.unwrap_or(end_time.is_some()),
        })
    }
}
