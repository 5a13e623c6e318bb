// ==========================================
// 水泥窑配料优化系统 - 调整应用状态转换
// ==========================================
// 职责: 由当前快照 + 调整建议构造新快照（纯函数部分）
// 说明: 持久化与串行化由 PlantApi::apply_adjustment 负责
// 红线: 相同输入必须得到完全相同的输出
// ==========================================

use crate::domain::recommendation::AdjustmentRecommendation;
use crate::domain::snapshot::{Composition, ProductionSnapshot};
use crate::domain::types::SnapshotSource;
use crate::engine::alert_rules::{LSF_IDEAL_MAX, LSF_IDEAL_MIN};
use crate::engine::chemistry::{compute_bogue, FREE_LIME_PCT};
use chrono::{DateTime, Utc};

/// 预测 LSF 越界时的窑温修正步长 (°C)
pub const KILN_TEMP_STEP: f64 = 5.0;

/// 应用配料调整，构造新快照
///
/// ```text
/// newCaO   = CaO   * (1 + limestone/100)
/// newSiO2  = SiO2  * (1 - clay/200)
/// newAl2O3 = Al2O3 * (1 - clay/200)
/// newFe2O3 = Fe2O3
/// newKiln  = kiln + (predicted > 98 ? -5 : predicted < 94 ? +5 : 0)
/// newLSF   = predicted (沿用建议值，不重新计算)
/// ```
///
/// # 参数
/// - `current`: 当前快照
/// - `recommendation`: 调整建议
/// - `at`: 新快照时间戳（由调用方提供，保证确定性）
pub fn apply_adjustment(
    current: &ProductionSnapshot,
    recommendation: &AdjustmentRecommendation,
    at: DateTime<Utc>,
) -> ProductionSnapshot {
    let limestone_factor = 1.0 + recommendation.limestone_adj_pct / 100.0;
    let clay_factor = 1.0 - recommendation.clay_adj_pct / 200.0;

    let composition = Composition {
        cao: current.composition.cao * limestone_factor,
        sio2: current.composition.sio2 * clay_factor,
        al2o3: current.composition.al2o3 * clay_factor,
        fe2o3: current.composition.fe2o3,
    };

    let predicted_lsf = recommendation.predicted_lsf;
    let kiln_delta = if predicted_lsf > LSF_IDEAL_MAX {
        -KILN_TEMP_STEP
    } else if predicted_lsf < LSF_IDEAL_MIN {
        KILN_TEMP_STEP
    } else {
        0.0
    };

    let feed_rate = if recommendation.feed_rate_setpoint.is_finite()
        && recommendation.feed_rate_setpoint > 0.0
    {
        recommendation.feed_rate_setpoint
    } else {
        current.feed_rate
    };

    let bogue = compute_bogue(
        composition.cao,
        composition.sio2,
        composition.al2o3,
        composition.fe2o3,
        FREE_LIME_PCT,
    );

    ProductionSnapshot {
        snapshot_id: None,
        plant_id: current.plant_id.clone(),
        timestamp: at,
        kiln_temperature: current.kiln_temperature + kiln_delta,
        feed_rate,
        composition,
        lsf: predicted_lsf,
        bogue,
        source: SnapshotSource::Adjustment {
            recommendation_id: recommendation.recommendation_id.clone(),
        },
    }
}
