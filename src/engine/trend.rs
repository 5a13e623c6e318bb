// ==========================================
// 水泥窑配料优化系统 - 指标趋势
// ==========================================
// 趋势由调用方显式传入上一快照计算，不保留任何全局状态
// ==========================================

use crate::domain::snapshot::ProductionSnapshot;
use serde::{Deserialize, Serialize};

/// 相对上一快照的变化百分比
///
/// 无上一快照或上一值为 0 时对应字段为 None
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricTrends {
    pub kiln_temperature_pct: Option<f64>,
    pub feed_rate_pct: Option<f64>,
    pub lsf_pct: Option<f64>,
}

/// 计算趋势
pub fn compute_trends(
    current: &ProductionSnapshot,
    previous: Option<&ProductionSnapshot>,
) -> MetricTrends {
    let Some(prev) = previous else {
        return MetricTrends::default();
    };

    MetricTrends {
        kiln_temperature_pct: pct_change(prev.kiln_temperature, current.kiln_temperature),
        feed_rate_pct: pct_change(prev.feed_rate, current.feed_rate),
        lsf_pct: pct_change(prev.lsf, current.lsf),
    }
}

fn pct_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}
