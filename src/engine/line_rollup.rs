// ==========================================
// MES 后端 - 产线汇总
// ==========================================
// 职责: 由产线下属设备推导产线状态与 OEE
// 规则:
// - 任一设备 RUNNING → 产线 RUNNING，否则 STOPPED（含无设备）
// - 产线 OEE = 下属设备 OEE 的算术平均，无设备时为 0
// ==========================================

use crate::domain::types::MachineStatus;

/// 推导产线状态
pub fn derive_line_status<I>(machine_statuses: I) -> MachineStatus
where
    I: IntoIterator<Item = MachineStatus>,
{
    if machine_statuses
        .into_iter()
        .any(|s| s == MachineStatus::Running)
    {
        MachineStatus::Running
    } else {
        MachineStatus::Stopped
    }
}

/// 产线 OEE（百分比，保留 1 位小数）
pub fn average_oee(machine_oees: &[f64]) -> f64 {
    if machine_oees.is_empty() {
        return 0.0;
    }
    let mean = machine_oees.iter().sum::<f64>() / machine_oees.len() as f64;
    (mean * 10.0).round() / 10.0
}
