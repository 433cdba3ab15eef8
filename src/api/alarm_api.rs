// ==========================================
// MES 后端 - 告警 / 设备事件 API
// ==========================================

use std::sync::Arc;

use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::input::{non_empty_string, optional_timestamp, require_text, require_timestamp};
use crate::domain::alarm::{Alarm, MachineEvent};
use crate::repository::alarm_repo::{AlarmDraft, AlarmRepository};
use crate::repository::error::RepositoryError;
use crate::repository::event_repo::{EventDraft, EventRepository};

// ==========================================
// AlarmApi - 告警
// ==========================================
pub struct AlarmApi {
    alarm_repo: Arc<AlarmRepository>,
}

impl AlarmApi {
    pub fn new(alarm_repo: Arc<AlarmRepository>) -> Self {
        Self { alarm_repo }
    }

    pub fn list_alarms(&self) -> ApiResult<Vec<Alarm>> {
        Ok(self.alarm_repo.list_all()?)
    }

    pub fn get_alarm(&self, alarm_id: i64) -> ApiResult<Alarm> {
        self.alarm_repo
            .find_by_id(alarm_id)?
            .ok_or_else(|| RepositoryError::not_found("Alarm", alarm_id).into())
    }

    pub fn create_alarm(&self, input: AlarmInput) -> ApiResult<i64> {
        let draft = input.into_draft()?;
        let id = self.alarm_repo.insert(&draft)?;
        tracing::info!(alarm_id = id, machine_id = draft.machine_id, code = %draft.code, "告警已记录");
        Ok(id)
    }

    pub fn update_alarm(&self, alarm_id: i64, input: AlarmInput) -> ApiResult<()> {
        let draft = input.into_draft()?;
        if self.alarm_repo.update(alarm_id, &draft)? == 0 {
            return Err(RepositoryError::not_found("Alarm", alarm_id).into());
        }
        Ok(())
    }

    pub fn delete_alarm(&self, alarm_id: i64) -> ApiResult<()> {
        if self.alarm_repo.delete(alarm_id)? == 0 {
            return Err(RepositoryError::not_found("Alarm", alarm_id).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlarmInput {
    #[serde(default)]
    pub machine_id: Option<i64>,
    #[serde(default)]
    pub code: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub occurred_at: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub cleared_at: Option<String>,
}

impl AlarmInput {
    fn into_draft(self) -> ApiResult<AlarmDraft> {
        Ok(AlarmDraft {
            machine_id: require_machine_id(self.machine_id)?,
            code: require_text("code", &self.code)?,
            description: self.description,
            occurred_at: require_timestamp("occurred_at", self.occurred_at.as_deref())?,
            cleared_at: optional_timestamp("cleared_at", self.cleared_at.as_deref())?,
        })
    }
}

// ==========================================
// EventApi - 设备事件
// ==========================================
pub struct EventApi {
    event_repo: Arc<EventRepository>,
}

impl EventApi {
    pub fn new(event_repo: Arc<EventRepository>) -> Self {
        Self { event_repo }
    }

    pub fn list_events(&self) -> ApiResult<Vec<MachineEvent>> {
        Ok(self.event_repo.list_all()?)
    }

    pub fn get_event(&self, event_id: i64) -> ApiResult<MachineEvent> {
        self.event_repo
            .find_by_id(event_id)?
            .ok_or_else(|| RepositoryError::not_found("Event", event_id).into())
    }

    pub fn create_event(&self, input: EventInput) -> ApiResult<i64> {
        let draft = input.into_draft()?;
        let id = self.event_repo.insert(&draft)?;
        tracing::debug!(event_id = id, machine_id = draft.machine_id, event_type = %draft.event_type, "设备事件已记录");
        Ok(id)
    }

    pub fn update_event(&self, event_id: i64, input: EventInput) -> ApiResult<()> {
        let draft = input.into_draft()?;
        if self.event_repo.update(event_id, &draft)? == 0 {
            return Err(RepositoryError::not_found("Event", event_id).into());
        }
        Ok(())
    }

    pub fn delete_event(&self, event_id: i64) -> ApiResult<()> {
        if self.event_repo.delete(event_id)? == 0 {
            return Err(RepositoryError::not_found("Event", event_id).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
    #[serde(default)]
    pub machine_id: Option<i64>,
    #[serde(default)]
    pub work_order_id: Option<i64>,
    #[serde(default)]
    pub event_type: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub occurred_at: Option<String>,
}

impl EventInput {
    fn into_draft(self) -> ApiResult<EventDraft> {
        Ok(EventDraft {
            machine_id: require_machine_id(self.machine_id)?,
            work_order_id: self.work_order_id,
            event_type: require_text("event_type", &self.event_type)?,
            description: self.description,
            occurred_at: require_timestamp("occurred_at", self.occurred_at.as_deref())?,
        })
    }
}

fn require_machine_id(machine_id: Option<i64>) -> ApiResult<i64> {
    machine_id.ok_or_else(|| ApiError::InvalidInput("machine_id is required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use std::sync::{Arc, Mutex};

    fn setup() -> (AlarmApi, EventApi) {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        conn.lock()
            .unwrap()
            .execute("INSERT INTO machines (name) VALUES ('M1')", [])
            .unwrap();
        (
            AlarmApi::new(Arc::new(AlarmRepository::new(conn.clone()))),
            EventApi::new(Arc::new(EventRepository::new(conn))),
        )
    }

    #[test]
    fn test_alarm_crud() {
        let (alarms, _) = setup();
        let id = alarms
            .create_alarm(AlarmInput {
                machine_id: Some(1),
                code: "E42".to_string(),
                occurred_at: Some("2025-01-01 08:00:00".to_string()),
                ..Default::default()
            })
            .unwrap();
        let alarm = alarms.get_alarm(id).unwrap();
        assert_eq!(alarm.code, "E42");
        assert!(alarm.cleared_at.is_none());

        alarms
            .update_alarm(
                id,
                AlarmInput {
                    machine_id: Some(1),
                    code: "E42".to_string(),
                    occurred_at: Some("2025-01-01 08:00:00".to_string()),
                    cleared_at: Some("2025-01-01 08:05:00".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(alarms.get_alarm(id).unwrap().cleared_at.is_some());

        alarms.delete_alarm(id).unwrap();
        assert_eq!(alarms.list_alarms().unwrap().len(), 0);
    }

    #[test]
    fn test_event_requires_type_and_time() {
        let (_, events) = setup();
        let err = events
            .create_event(EventInput {
                machine_id: Some(1),
                occurred_at: Some("2025-01-01 08:00:00".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        let err = events
            .create_event(EventInput {
                machine_id: Some(1),
                event_type: "START".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        let id = events
            .create_event(EventInput {
                machine_id: Some(1),
                event_type: "START".to_string(),
                occurred_at: Some("2025-01-01 08:00:00".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(events.get_event(id).unwrap().event_type, "START");
    }
}
