// ==========================================
// 产线汇总集成测试
// ==========================================
// 覆盖: 产线状态推导、产线 OEE 平均、告警计数、最新批次与生产履历
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use mes_backend::api::{AlarmInput, ApiError};
use mes_backend::domain::MachineStatus;

#[test]
fn test_line_without_machines() {
    let env = ApiTestEnv::new().unwrap();
    let line_id = env.seed_line("一号线");

    let lines = env.state.production_line_api.list_lines_at(eval_now()).unwrap();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert_eq!(line.id, line_id);
    assert_eq!(line.status, MachineStatus::Stopped);
    assert_eq!(line.machines, 0);
    assert_eq!(line.oee, 0.0);
    assert_eq!(line.alarms, 0);
    assert_eq!(line.last_production, "-");
}

#[test]
fn test_line_rollup_from_machines() {
    let env = ApiTestEnv::new().unwrap();
    let line_id = env.seed_line("一号线");
    let other_line = env.seed_line("二号线");

    let healthy = env.seed_status_machine("冲压", Some(line_id), "RUNNING");
    let stopped = env.seed_status_machine("焊接", Some(line_id), "STOPPED");
    env.seed_status_machine("装配", Some(other_line), "STOPPED");
    env.seed_stop(stopped, minutes_before_now(120), Some(minutes_before_now(60)));

    env.state
        .alarm_api
        .create_alarm(AlarmInput {
            machine_id: Some(healthy),
            code: "E-101".to_string(),
            occurred_at: Some(minutes_before_now(5).to_rfc3339()),
            ..Default::default()
        })
        .unwrap();

    env.seed_history(line_id, "B-001", "批次 001", "120");
    env.seed_history(line_id, "B-002", "批次 002", "80");

    let lines = env.state.production_line_api.list_lines_at(eval_now()).unwrap();
    let line = lines.iter().find(|l| l.id == line_id).unwrap();
    assert_eq!(line.status, MachineStatus::Running);
    assert_eq!(line.machines, 2);
    // (100.0 + 76.6) / 2
    assert_eq!(line.oee, 88.3);
    assert_eq!(line.alarms, 1);
    assert_eq!(line.last_production, "批次 002");

    let other = lines.iter().find(|l| l.id == other_line).unwrap();
    assert_eq!(other.status, MachineStatus::Stopped);
    assert_eq!(other.alarms, 0);
}

#[test]
fn test_each_line_only_sees_its_own_machines() {
    let env = ApiTestEnv::new().unwrap();
    let first = env.seed_line("一号线");
    let second = env.seed_line("二号线");

    let slow = env.seed_status_machine("冲压", Some(first), "RUNNING");
    env.seed_status_machine("焊接", Some(second), "RUNNING");
    env.seed_status_machine("喷涂", Some(second), "STOPPED");
    let loose = env.seed_status_machine("备用机", None, "RUNNING");
    env.seed_stop(slow, minutes_before_now(120), Some(minutes_before_now(60)));
    env.seed_stop(loose, minutes_before_now(240), Some(minutes_before_now(30)));

    env.state
        .alarm_api
        .create_alarm(AlarmInput {
            machine_id: Some(loose),
            code: "E-900".to_string(),
            occurred_at: Some(minutes_before_now(5).to_rfc3339()),
            ..Default::default()
        })
        .unwrap();

    let lines = env.state.production_line_api.list_lines_at(eval_now()).unwrap();
    assert_eq!(lines.len(), 2);

    let a = lines.iter().find(|l| l.id == first).unwrap();
    assert_eq!(a.machines, 1);
    assert_eq!(a.oee, 76.6);
    assert_eq!(a.alarms, 0);

    let b = lines.iter().find(|l| l.id == second).unwrap();
    assert_eq!(b.machines, 2);
    assert_eq!(b.status, MachineStatus::Running);
    assert_eq!(b.oee, 100.0);
    assert_eq!(b.alarms, 0);

    // 详情与列表的产线 OEE 一致
    for summary in &lines {
        let detail = env
            .state
            .production_line_api
            .get_line_at(summary.id, eval_now())
            .unwrap();
        assert_eq!(detail.oee, summary.oee);
    }
}

#[test]
fn test_line_detail_includes_batch_and_history() {
    let env = ApiTestEnv::new().unwrap();
    let line_id = env.seed_line("一号线");
    env.seed_status_machine("冲压", Some(line_id), "RUNNING");
    env.line_repo
        .insert_batch(line_id, "批次 A", 40, 100, Some("01:20"))
        .unwrap();
    for i in 0..12 {
        env.seed_history(line_id, &format!("H-{:02}", i), &format!("记录 {}", i), "10");
    }

    let detail = env
        .state
        .production_line_api
        .get_line_at(line_id, eval_now())
        .unwrap();
    assert_eq!(detail.line.id, line_id);
    assert_eq!(detail.oee, 100.0);

    let batch = detail.batch.unwrap();
    assert_eq!(batch.name, "批次 A");
    assert_eq!(batch.current, 40);
    assert_eq!(batch.target, 100);

    assert_eq!(detail.history.len(), 10);
    assert_eq!(detail.history[0].code, "H-11");
}

#[test]
fn test_deleting_line_detaches_machines() {
    let env = ApiTestEnv::new().unwrap();
    let line_id = env.seed_line("一号线");
    let machine_id = env.seed_status_machine("冲压", Some(line_id), "RUNNING");

    env.state.production_line_api.delete_line(line_id).unwrap();

    let view = env.state.machine_api.get_machine_at(machine_id, eval_now()).unwrap();
    assert_eq!(view.machine.line_id, None);

    let err = env
        .state
        .production_line_api
        .get_line_at(line_id, eval_now())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
