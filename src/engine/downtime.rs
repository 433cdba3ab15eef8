// ==========================================
// MES 后端 - 停机汇总
// ==========================================
// 职责: 汇总评估窗口内的停机时长（秒）
// 输入: 单台设备的停机区间 + 评估窗口 + 窗口口径
// 输出: downtime >= 0
// ==========================================
// 口径:
// - STARTED_IN_WINDOW（默认）: 只统计 start >= window.start 的停机，
//   窗口开始前就已发生、至今未结束的停机不计入
// - OVERLAPS_WINDOW: 统计与窗口相交的停机，start 截断到 window.start
// 两种口径下，未结束停机的终点都按 window.end 计，
// 已结束停机的终点截断到 window.end
// ==========================================

use crate::domain::stop::StopInterval;
use crate::domain::types::DowntimeWindowPolicy;
use crate::engine::shift_window::ShiftWindow;
use chrono::{DateTime, Utc};

/// 停机汇总（历史口径）
///
/// 等价于 `compute_downtime_with_policy(.., StartedInWindow)`
pub fn compute_downtime(intervals: &[StopInterval], window: &ShiftWindow) -> f64 {
    compute_downtime_with_policy(intervals, window, DowntimeWindowPolicy::StartedInWindow)
}

/// 按指定口径汇总停机时长（秒）
pub fn compute_downtime_with_policy(
    intervals: &[StopInterval],
    window: &ShiftWindow,
    policy: DowntimeWindowPolicy,
) -> f64 {
    intervals
        .iter()
        .filter_map(|interval| contribution(interval, window, policy))
        .sum()
}

/// 单个停机区间对窗口的贡献；不计入时返回 None
fn contribution(
    interval: &StopInterval,
    window: &ShiftWindow,
    policy: DowntimeWindowPolicy,
) -> Option<f64> {
    let start = match policy {
        DowntimeWindowPolicy::StartedInWindow => {
            if interval.start < window.start {
                return None;
            }
            interval.start
        }
        DowntimeWindowPolicy::OverlapsWindow => {
            let end = interval.end.unwrap_or(window.end);
            if end <= window.start || interval.start >= window.end {
                return None;
            }
            interval.start.max(window.start)
        }
    };

    let end = interval.end.unwrap_or(window.end).min(window.end);
    Some(seconds_between(start, end).max(0.0))
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
    }

    fn window() -> ShiftWindow {
        ShiftWindow::new(t0(), t0() + Duration::hours(8))
    }

    fn closed(start_min: i64, end_min: i64) -> StopInterval {
        StopInterval::new(
            t0() + Duration::minutes(start_min),
            Some(t0() + Duration::minutes(end_min)),
        )
    }

    fn open(start_min: i64) -> StopInterval {
        StopInterval::new(t0() + Duration::minutes(start_min), None)
    }

    #[test]
    fn test_no_intervals_is_zero() {
        assert_eq!(compute_downtime(&[], &window()), 0.0);
    }

    #[test]
    fn test_closed_intervals_sum() {
        let intervals = [closed(10, 20), closed(60, 90)];
        assert_eq!(compute_downtime(&intervals, &window()), 40.0 * 60.0);
    }

    #[test]
    fn test_open_interval_clipped_to_window_end() {
        // 开始于 T，评估时刻 T+100s，贡献恰好 100 秒
        let start = t0();
        let w = ShiftWindow::new(start, start + Duration::seconds(100));
        let intervals = [StopInterval::new(start, None)];
        assert_eq!(compute_downtime(&intervals, &w), 100.0);
    }

    #[test]
    fn test_closed_interval_end_clipped_to_window_end() {
        let intervals = [closed(7 * 60, 9 * 60)];
        assert_eq!(compute_downtime(&intervals, &window()), 3600.0);
    }

    #[test]
    fn test_started_before_window_is_not_counted_by_default() {
        // 窗口开始前 1 小时发生、至今未结束
        let intervals = [open(-60)];
        assert_eq!(compute_downtime(&intervals, &window()), 0.0);
    }

    #[test]
    fn test_overlaps_policy_counts_carried_over_stop() {
        let intervals = [open(-60)];
        let downtime = compute_downtime_with_policy(
            &intervals,
            &window(),
            DowntimeWindowPolicy::OverlapsWindow,
        );
        assert_eq!(downtime, 8.0 * 3600.0);
    }

    #[test]
    fn test_overlaps_policy_excludes_stop_finished_before_window() {
        let intervals = [closed(-120, -60)];
        let downtime = compute_downtime_with_policy(
            &intervals,
            &window(),
            DowntimeWindowPolicy::OverlapsWindow,
        );
        assert_eq!(downtime, 0.0);
    }

    #[test]
    fn test_future_stop_never_negative() {
        let intervals = [open(9 * 60)];
        assert_eq!(compute_downtime(&intervals, &window()), 0.0);
    }

    #[test]
    fn test_downtime_monotonic_in_intervals() {
        let mut intervals = Vec::new();
        let mut last = compute_downtime(&intervals, &window());
        for i in 0..6 {
            intervals.push(closed(i * 30, i * 30 + 10 + i));
            let next = compute_downtime(&intervals, &window());
            assert!(next >= last, "downtime 不应随停机增加而减少");
            last = next;
        }

        // 拉长某段停机时长同样不减少
        let mut longer = intervals.clone();
        longer[0] = closed(0, 25);
        assert!(compute_downtime(&longer, &window()) >= last);
    }
}
