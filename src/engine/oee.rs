// ==========================================
// MES 后端 - OEE 计算引擎
// ==========================================
// 职责: 由计划时间与停机时间推导设备综合效率
// 输入: planned_time(秒) + downtime(秒) + 计数类型 + 平均节拍
// 输出: OeeResult（不落库，每次读取时重新计算）
// ==========================================
// 公式:
//   operating   = max(planned - downtime, 0)
//   status 型:   actual = operating,        theoretical = planned
//   counter 型:  actual = rate * operating, theoretical = rate * planned
//   availability = operating / planned      (planned <= 0 时为 0)
//   performance  = actual / theoretical     (theoretical <= 0 时为 0)
//   quality      = 1（暂无质量损失模型）
//   oee          = availability * performance * quality * 100
// 所有除零分支返回 0，不报错
// ==========================================

use crate::domain::types::CounterType;
use serde::{Deserialize, Serialize};

/// 质量率（无报废模型，恒为 100%）
pub const QUALITY_RATE: f64 = 1.0;

/// OEE 计算结果
///
/// availability / performance / quality / oee 均为百分比（0-100），
/// 前三者保留 2 位小数，oee 保留 1 位小数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OeeResult {
    pub planned_time: f64,
    pub downtime: f64,
    pub operating_time: f64,
    pub actual_output: f64,
    pub theoretical_output: f64,
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
    pub oee: f64,
}

/// 计算 OEE（纯函数）
///
/// # 参数
/// - `planned_time`: 计划生产时间（秒）
/// - `downtime`: 窗口内停机时间（秒）
/// - `counter_type`: 计数类型
/// - `avg_pieces_per_sec`: 平均节拍，counter 型缺失时按 0 处理
pub fn compute_oee(
    planned_time: f64,
    downtime: f64,
    counter_type: CounterType,
    avg_pieces_per_sec: Option<f64>,
) -> OeeResult {
    let operating_time = (planned_time - downtime).max(0.0);

    let (actual_output, theoretical_output) = match counter_type {
        CounterType::Status => (operating_time, planned_time),
        CounterType::Counter => {
            let rate = avg_pieces_per_sec.unwrap_or(0.0);
            (rate * operating_time, rate * planned_time)
        }
    };

    let availability = if planned_time > 0.0 {
        operating_time / planned_time
    } else {
        0.0
    };
    let performance = if theoretical_output > 0.0 {
        actual_output / theoretical_output
    } else {
        0.0
    };
    let oee = availability * performance * QUALITY_RATE * 100.0;

    tracing::debug!(
        planned_time,
        downtime,
        operating_time,
        actual_output,
        theoretical_output,
        availability,
        performance,
        oee,
        "OEE 计算"
    );

    OeeResult {
        planned_time,
        downtime,
        operating_time,
        actual_output,
        theoretical_output,
        availability: round_to(availability * 100.0, 2),
        performance: round_to(performance * 100.0, 2),
        quality: round_to(QUALITY_RATE * 100.0, 2),
        oee: round_to(oee, 1),
    }
}

/// 四舍五入到指定小数位
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIFT: f64 = 28800.0;

    #[test]
    fn test_no_downtime_full_availability() {
        for planned in [1.0, 60.0, SHIFT, 86400.0] {
            let r = compute_oee(planned, 0.0, CounterType::Counter, Some(1.5));
            assert_eq!(r.availability, 100.0);
        }
    }

    #[test]
    fn test_downtime_exceeding_planned_time_clamps_to_zero() {
        for downtime in [SHIFT, SHIFT + 1.0, 30000.0] {
            let r = compute_oee(SHIFT, downtime, CounterType::Status, None);
            assert_eq!(r.operating_time, 0.0);
            assert_eq!(r.availability, 0.0);
            assert_eq!(r.oee, 0.0);
        }
    }

    #[test]
    fn test_status_machine_without_downtime_is_perfect() {
        let r = compute_oee(SHIFT, 0.0, CounterType::Status, None);
        assert_eq!(r.performance, 100.0);
        assert_eq!(r.quality, 100.0);
        assert_eq!(r.oee, 100.0);
    }

    #[test]
    fn test_status_machine_ignores_rate() {
        let with_rate = compute_oee(SHIFT, 3600.0, CounterType::Status, Some(5.0));
        let without_rate = compute_oee(SHIFT, 3600.0, CounterType::Status, None);
        assert_eq!(with_rate, without_rate);
    }

    #[test]
    fn test_counter_machine_without_rate_has_zero_performance() {
        for downtime in [0.0, 3600.0, 30000.0] {
            assert_eq!(compute_oee(SHIFT, downtime, CounterType::Counter, None).performance, 0.0);
            assert_eq!(
                compute_oee(SHIFT, downtime, CounterType::Counter, Some(0.0)).performance,
                0.0
            );
        }
    }

    #[test]
    fn test_one_hour_stop_on_status_machine() {
        let r = compute_oee(SHIFT, 3600.0, CounterType::Status, None);
        assert_eq!(r.operating_time, 25200.0);
        assert_eq!(r.availability, 87.5);
        assert_eq!(r.performance, 87.5);
        // 87.5% * 87.5% * 100% = 76.5625 → 76.6
        assert_eq!(r.oee, 76.6);
    }

    #[test]
    fn test_counter_machine_at_full_rate() {
        let r = compute_oee(SHIFT, 0.0, CounterType::Counter, Some(2.0));
        assert_eq!(r.actual_output, 57600.0);
        assert_eq!(r.theoretical_output, 57600.0);
        assert_eq!(r.performance, 100.0);
        assert_eq!(r.oee, 100.0);
    }

    #[test]
    fn test_zero_planned_time_is_degenerate_not_error() {
        let r = compute_oee(0.0, 0.0, CounterType::Status, None);
        assert_eq!(r.availability, 0.0);
        assert_eq!(r.performance, 0.0);
        assert_eq!(r.oee, 0.0);
    }

    #[test]
    fn test_rounding() {
        // availability = 2/3 → 66.67, oee = 4/9*100 = 44.44.. → 44.4
        let r = compute_oee(3.0, 1.0, CounterType::Status, None);
        assert_eq!(r.availability, 66.67);
        assert_eq!(r.performance, 66.67);
        assert_eq!(r.oee, 44.4);
    }
}
