// ==========================================
// 水泥窑配料优化系统 - LSF 预测模型
// ==========================================
// 策略: 确定性线性代理模型（不重新计算成分）
// 石灰石 (CaO 来源) 提高 LSF；粘土/页岩 (SiO2/Al2O3 来源) 降低 LSF
// ==========================================

/// 预测 LSF 下限 (%)
pub const PREDICTED_LSF_MIN: f64 = 85.0;
/// 预测 LSF 上限 (%)
pub const PREDICTED_LSF_MAX: f64 = 105.0;

/// 每 1% 石灰石调整带来的 LSF 变化
pub const LIMESTONE_LSF_GAIN: f64 = 1.5;
/// 每 1% 粘土调整带来的 LSF 变化（取负）
pub const CLAY_LSF_GAIN: f64 = 0.5;

/// 预测调整后的 LSF
///
/// `result = current + 1.5*limestone - 0.5*clay`，截断到 [85, 105]
///
/// 非有限的调整量按 0 处理；当前 LSF 非有限时以下限为基准
pub fn predict_lsf(current_lsf: f64, limestone_adj_pct: f64, clay_adj_pct: f64) -> f64 {
    let base = if current_lsf.is_finite() {
        current_lsf
    } else {
        PREDICTED_LSF_MIN
    };
    let limestone = finite_or_zero(limestone_adj_pct);
    let clay = finite_or_zero(clay_adj_pct);

    let result = base + LIMESTONE_LSF_GAIN * limestone - CLAY_LSF_GAIN * clay;
    result.clamp(PREDICTED_LSF_MIN, PREDICTED_LSF_MAX)
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limestone_raises_lsf() {
        assert_eq!(predict_lsf(96.0, 2.0, 0.0), 99.0);
    }

    #[test]
    fn test_prediction_is_clamped() {
        assert_eq!(predict_lsf(96.0, 10.0, 0.0), 105.0);
        assert_eq!(predict_lsf(90.0, 0.0, 40.0), 85.0);
    }

    #[test]
    fn test_clay_lowers_lsf() {
        assert_eq!(predict_lsf(100.0, 0.0, 4.0), 98.0);
        assert_eq!(predict_lsf(96.0, 1.0, 3.0), 96.0);
    }

    #[test]
    fn test_non_finite_inputs_stay_in_range() {
        assert_eq!(predict_lsf(96.0, f64::NAN, 0.0), 96.0);
        let v = predict_lsf(f64::NAN, 0.0, 0.0);
        assert!((PREDICTED_LSF_MIN..=PREDICTED_LSF_MAX).contains(&v));
    }
}
