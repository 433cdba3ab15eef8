// ==========================================
// MES 后端 - 停机记录仓储
// ==========================================
// 职责: stops 表 CRUD + 按窗口查询停机区间（供停机汇总使用）
// ==========================================

use crate::db::SharedConnection;
use crate::domain::stop::{Stop, StopInterval};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{format_ts, format_ts_opt, get_ts, get_ts_opt};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::MutexGuard;

/// 停机写入数据
#[derive(Debug, Clone, PartialEq)]
pub struct StopDraft {
    pub machine_id: i64,
    pub reason: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub resolved: bool,
}

const SELECT_COLUMNS: &str =
    "SELECT id, machine_id, reason, start_time, end_time, resolved FROM stops";

pub struct StopRepository {
    conn: SharedConnection,
}

impl StopRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Stop> {
        Ok(Stop {
            id: row.get(0)?,
            machine_id: row.get(1)?,
            reason: row.get(2)?,
            start_time: get_ts(row, 3)?,
            end_time: get_ts_opt(row, 4)?,
            resolved: row.get::<_, i64>(5)? != 0,
        })
    }

    fn map_interval(row: &Row<'_>) -> SqliteResult<(i64, StopInterval)> {
        Ok((
            row.get(0)?,
            StopInterval::new(get_ts(row, 1)?, get_ts_opt(row, 2)?),
        ))
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Stop>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY start_time DESC, id DESC", SELECT_COLUMNS))?;
        let stops = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(stops)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Stop>> {
        let conn = self.get_conn()?;
        let stop = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(stop)
    }

    pub fn insert(&self, draft: &StopDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO stops (machine_id, reason, start_time, end_time, resolved)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                draft.machine_id,
                draft.reason,
                format_ts(&draft.start_time),
                format_ts_opt(&draft.end_time),
                draft.resolved,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, draft: &StopDraft) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE stops
            SET machine_id = ?1, reason = ?2, start_time = ?3, end_time = ?4, resolved = ?5
            WHERE id = ?6
            "#,
            params![
                draft.machine_id,
                draft.reason,
                format_ts(&draft.start_time),
                format_ts_opt(&draft.end_time),
                draft.resolved,
                id,
            ],
        )?;
        Ok(affected)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM stops WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    // ==========================================
    // 停机区间查询
    // ==========================================

    /// 查询开始时间不早于 since 的停机区间
    ///
    /// # 参数
    /// - `machine_id`: 指定设备；None 表示全部设备
    ///
    /// # 返回
    /// (machine_id, StopInterval) 列表
    pub fn list_intervals_started_since(
        &self,
        machine_id: Option<i64>,
        since: DateTime<Utc>,
    ) -> RepositoryResult<Vec<(i64, StopInterval)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT machine_id, start_time, end_time
            FROM stops
            WHERE (?1 IS NULL OR machine_id = ?1) AND start_time >= ?2
            ORDER BY machine_id ASC, start_time ASC
            "#,
        )?;
        let intervals = stmt
            .query_map(params![machine_id, format_ts(&since)], Self::map_interval)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(intervals)
    }

    /// 查询与 [start, end) 相交的停机区间（含未结束停机）
    pub fn list_intervals_overlapping(
        &self,
        machine_id: Option<i64>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<(i64, StopInterval)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT machine_id, start_time, end_time
            FROM stops
            WHERE (?1 IS NULL OR machine_id = ?1)
              AND start_time < ?3
              AND (end_time IS NULL OR end_time > ?2)
            ORDER BY machine_id ASC, start_time ASC
            "#,
        )?;
        let intervals = stmt
            .query_map(
                params![machine_id, format_ts(&start), format_ts(&end)],
                Self::map_interval,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(intervals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::machine_repo::{MachineDraft, MachineRepository};
    use crate::domain::types::{CounterType, MachineStatus};
    use chrono::{Duration, TimeZone};
    use std::sync::{Arc, Mutex};

    fn setup() -> (StopRepository, i64, i64) {
        let conn = Arc::new(Mutex::new(crate::db::open_in_memory().unwrap()));
        let machines = MachineRepository::new(conn.clone());
        let mut ids = Vec::new();
        for name in ["M1", "M2"] {
            ids.push(
                machines
                    .insert(&MachineDraft {
                        name: name.to_string(),
                        line_id: None,
                        status: MachineStatus::Running,
                        machine_type: None,
                        counter_type: CounterType::Status,
                        avg_pieces_per_sec: None,
                        product_id: None,
                    })
                    .unwrap(),
            );
        }
        (StopRepository::new(conn), ids[0], ids[1])
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
    }

    fn stop(machine_id: i64, start_min: i64, end_min: Option<i64>) -> StopDraft {
        StopDraft {
            machine_id,
            reason: Some("Unplanned".to_string()),
            start_time: t0() + Duration::minutes(start_min),
            end_time: end_min.map(|m| t0() + Duration::minutes(m)),
            resolved: end_min.is_some(),
        }
    }

    #[test]
    fn test_insert_find_update_delete() {
        let (repo, m1, _) = setup();
        let id = repo.insert(&stop(m1, 0, None)).unwrap();

        let found = repo.find_by_id(id).unwrap().unwrap();
        assert!(found.end_time.is_none());
        assert!(!found.resolved);
        assert_eq!(found.start_time, t0());

        assert_eq!(repo.update(id, &stop(m1, 0, Some(15))).unwrap(), 1);
        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.end_time, Some(t0() + Duration::minutes(15)));
        assert!(found.resolved);

        assert_eq!(repo.delete(id).unwrap(), 1);
        assert!(repo.find_by_id(id).unwrap().is_none());
    }

    #[test]
    fn test_intervals_started_since_filters_machine_and_start() {
        let (repo, m1, m2) = setup();
        repo.insert(&stop(m1, -30, None)).unwrap(); // 窗口前开始
        repo.insert(&stop(m1, 10, Some(20))).unwrap();
        repo.insert(&stop(m2, 15, Some(25))).unwrap();

        let m1_only = repo.list_intervals_started_since(Some(m1), t0()).unwrap();
        assert_eq!(m1_only.len(), 1);
        assert_eq!(m1_only[0].0, m1);

        let all = repo.list_intervals_started_since(None, t0()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_intervals_overlapping_includes_carried_over_stop() {
        let (repo, m1, _) = setup();
        repo.insert(&stop(m1, -30, None)).unwrap();
        repo.insert(&stop(m1, -90, Some(-60))).unwrap(); // 窗口前已结束
        repo.insert(&stop(m1, 10, Some(20))).unwrap();

        let overlapping = repo
            .list_intervals_overlapping(Some(m1), t0(), t0() + Duration::hours(8))
            .unwrap();
        assert_eq!(overlapping.len(), 2);
    }

    #[test]
    fn test_stop_requires_existing_machine() {
        let (repo, _, _) = setup();
        let err = repo.insert(&stop(9999, 0, None)).unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
