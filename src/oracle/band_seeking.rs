// ==========================================
// 水泥窑配料优化系统 - 本地确定性建议生成方
// ==========================================
// 用途: 离线/无外部服务时的替代实现
// 规则: 反解线性代理模型，使预测 LSF 回到目标值（默认区间中心 96%）
// - LSF 偏低: 只加石灰石
// - LSF 偏高: 只加粘土
// ==========================================

use crate::engine::prediction::{CLAY_LSF_GAIN, LIMESTONE_LSF_GAIN};
use crate::oracle::parse::MAX_ADJUSTMENT_PCT;
use crate::oracle::{OracleError, OracleRequest, RawSuggestion, RecommendationOracle};
use async_trait::async_trait;
use serde_json::json;

/// 默认目标 LSF
pub const DEFAULT_TARGET_LSF: f64 = 96.0;

/// 目标区间内的容差（不调整）
const DEADBAND: f64 = 0.25;

pub struct BandSeekingOracle {
    target_lsf: f64,
}

impl BandSeekingOracle {
    pub fn new() -> Self {
        Self {
            target_lsf: DEFAULT_TARGET_LSF,
        }
    }

    pub fn with_target(target_lsf: f64) -> Self {
        Self { target_lsf }
    }

    /// 计算 (石灰石%, 粘土%)
    fn solve(&self, current_lsf: f64) -> (f64, f64) {
        let gap = self.target_lsf - current_lsf;
        if !gap.is_finite() || gap.abs() <= DEADBAND {
            return (0.0, 0.0);
        }

        if gap > 0.0 {
            (round1((gap / LIMESTONE_LSF_GAIN).min(MAX_ADJUSTMENT_PCT)), 0.0)
        } else {
            (0.0, round1((-gap / CLAY_LSF_GAIN).min(MAX_ADJUSTMENT_PCT)))
        }
    }
}

impl Default for BandSeekingOracle {
    fn default() -> Self {
        Self::new()
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[async_trait]
impl RecommendationOracle for BandSeekingOracle {
    async fn suggest(&self, request: &OracleRequest) -> Result<RawSuggestion, OracleError> {
        let (limestone, clay) = self.solve(request.lsf);

        let explanation = if limestone == 0.0 && clay == 0.0 {
            format!("当前 LSF {:.1}% 已接近目标 {:.1}%，维持现有配比", request.lsf, self.target_lsf)
        } else if limestone > 0.0 {
            format!(
                "当前 LSF {:.1}% 低于目标 {:.1}%，增加石灰石 {:.1}% 以提高 CaO",
                request.lsf, self.target_lsf, limestone
            )
        } else {
            format!(
                "当前 LSF {:.1}% 高于目标 {:.1}%，增加粘土/页岩 {:.1}% 以提高 SiO2/Al2O3",
                request.lsf, self.target_lsf, clay
            )
        };

        Ok(RawSuggestion {
            limestone_adj_pct: json!(limestone),
            clay_adj_pct: json!(clay),
            feed_rate_setpoint: json!(request.feed_rate),
            explanation: Some(explanation),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ingestion::baseline_snapshot;
    use crate::engine::prediction::predict_lsf;
    use crate::oracle::parse::validate_suggestion;
    use chrono::Utc;

    fn request_with_lsf(lsf: f64) -> OracleRequest {
        let mut s = baseline_snapshot("poc_plant_01", Utc::now());
        s.lsf = lsf;
        OracleRequest::from_snapshot(&s, vec![])
    }

    #[tokio::test]
    async fn test_low_lsf_adds_limestone_toward_target() {
        let oracle = BandSeekingOracle::new();
        let req = request_with_lsf(92.0);
        let v = validate_suggestion(&oracle.suggest(&req).await.unwrap(), req.feed_rate);

        assert!(v.limestone_adj_pct > 0.0);
        assert_eq!(v.clay_adj_pct, 0.0);
        let predicted = predict_lsf(req.lsf, v.limestone_adj_pct, v.clay_adj_pct);
        assert!((predicted - 96.0).abs() < 0.2);
    }

    #[tokio::test]
    async fn test_high_lsf_adds_clay() {
        let oracle = BandSeekingOracle::new();
        let req = request_with_lsf(99.0);
        let v = validate_suggestion(&oracle.suggest(&req).await.unwrap(), req.feed_rate);

        assert_eq!(v.limestone_adj_pct, 0.0);
        assert_eq!(v.clay_adj_pct, 6.0);
        assert_eq!(predict_lsf(req.lsf, v.limestone_adj_pct, v.clay_adj_pct), 96.0);
    }

    #[tokio::test]
    async fn test_in_band_holds() {
        let oracle = BandSeekingOracle::new();
        let req = request_with_lsf(96.1);
        let v = validate_suggestion(&oracle.suggest(&req).await.unwrap(), req.feed_rate);

        assert_eq!((v.limestone_adj_pct, v.clay_adj_pct), (0.0, 0.0));
        assert!(v.warnings.is_empty());
    }
}
