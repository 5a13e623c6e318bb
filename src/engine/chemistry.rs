// ==========================================
// 水泥窑配料优化系统 - 生料化学计算
// ==========================================
// 职责: 由氧化物成分计算 LSF 与 Bogue 矿物相
// 红线: 纯函数，不抛错；非法输入降级为 0 / 截断值
// ==========================================

use crate::domain::snapshot::{BoguePhases, Composition};

/// Bogue 计算中扣除的游离氧化钙 (%)
///
/// 取熟料典型游离钙含量 1.5%。C3S 按 `CaO - FREE_LIME_PCT` 计算，
/// 采样入库与应用调整两条路径统一使用此常量。
pub const FREE_LIME_PCT: f64 = 1.5;

// LSF 分母系数
const LSF_SIO2_FACTOR: f64 = 2.8;
const LSF_AL2O3_FACTOR: f64 = 1.18;
const LSF_FE2O3_FACTOR: f64 = 0.65;

/// 计算石灰饱和系数 LSF (%)
///
/// `LSF = 100 * CaO / (2.8*SiO2 + 1.18*Al2O3 + 0.65*Fe2O3)`
///
/// # 降级规则
/// - 分母为 0: 返回 0
/// - 结果非有限或为负: 返回 0
pub fn compute_lsf(cao: f64, sio2: f64, al2o3: f64, fe2o3: f64) -> f64 {
    let denominator =
        LSF_SIO2_FACTOR * sio2 + LSF_AL2O3_FACTOR * al2o3 + LSF_FE2O3_FACTOR * fe2o3;
    if denominator == 0.0 {
        return 0.0;
    }

    let lsf = (cao / denominator) * 100.0;
    if lsf.is_finite() && lsf >= 0.0 {
        lsf
    } else {
        tracing::debug!(cao, sio2, al2o3, fe2o3, lsf, "LSF 计算结果非法，降级为 0");
        0.0
    }
}

/// 计算 Bogue 熟料矿物相 (%)
///
/// ```text
/// caoAdj = cao - freeLime
/// C4AF = 3.043 * fe2o3
/// C3A  = 2.650 * al2o3 - 1.692 * fe2o3
/// C3S  = 4.071 * caoAdj - 7.602 * sio2 - 6.719 * al2o3 - 1.430 * fe2o3
/// C2S  = 2.867 * sio2 - 0.754 * C3S
/// ```
///
/// 负值在噪声输入下属正常现象，各相截断为 >= 0
pub fn compute_bogue(cao: f64, sio2: f64, al2o3: f64, fe2o3: f64, free_lime: f64) -> BoguePhases {
    let cao_adj = cao - free_lime;

    let c4af = 3.043 * fe2o3;
    let c3a = 2.650 * al2o3 - 1.692 * fe2o3;
    let c3s = 4.071 * cao_adj - 7.602 * sio2 - 6.719 * al2o3 - 1.430 * fe2o3;
    let c2s = 2.867 * sio2 - 0.754 * c3s;

    BoguePhases {
        c3s: non_negative(c3s),
        c2s: non_negative(c2s),
        c3a: non_negative(c3a),
        c4af: non_negative(c4af),
    }
}

/// 截断为非负有限值
fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl Composition {
    /// 按本成分计算 LSF
    pub fn lsf(&self) -> f64 {
        compute_lsf(self.cao, self.sio2, self.al2o3, self.fe2o3)
    }

    /// 按本成分计算 Bogue 矿物相（使用 FREE_LIME_PCT）
    pub fn bogue(&self) -> BoguePhases {
        compute_bogue(self.cao, self.sio2, self.al2o3, self.fe2o3, FREE_LIME_PCT)
    }
}
