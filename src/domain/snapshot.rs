// ==========================================
// 水泥窑配料优化系统 - 生产快照领域模型
// ==========================================
// 职责: 定义生产快照、生料成分、熟料矿物相、原始采样读数
// 红线: 快照创建后不可变更，历史只追加
// ==========================================

use crate::domain::types::SnapshotSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Composition - 生料氧化物成分 (%)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub cao: f64,   // CaO
    pub sio2: f64,  // SiO2
    pub al2o3: f64, // Al2O3
    pub fe2o3: f64, // Fe2O3
}

impl Composition {
    pub fn new(cao: f64, sio2: f64, al2o3: f64, fe2o3: f64) -> Self {
        Self {
            cao,
            sio2,
            al2o3,
            fe2o3,
        }
    }

    /// 成分是否全部为 [0, 100] 内的有限数
    pub fn is_valid(&self) -> bool {
        [self.cao, self.sio2, self.al2o3, self.fe2o3]
            .iter()
            .all(|v| v.is_finite() && (0.0..=100.0).contains(v))
    }

    /// 非有限/负值降级为 0，超过 100 的截断为 100
    pub fn sanitized(&self) -> Self {
        fn clean(v: f64) -> f64 {
            if v.is_finite() {
                v.clamp(0.0, 100.0)
            } else {
                0.0
            }
        }
        Self {
            cao: clean(self.cao),
            sio2: clean(self.sio2),
            al2o3: clean(self.al2o3),
            fe2o3: clean(self.fe2o3),
        }
    }
}

// ==========================================
// BoguePhases - 熟料矿物相 (%)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoguePhases {
    pub c3s: f64,  // 硅酸三钙
    pub c2s: f64,  // 硅酸二钙
    pub c3a: f64,  // 铝酸三钙
    pub c4af: f64, // 铁铝酸四钙
}

// ==========================================
// ProductionSnapshot - 生产快照
// ==========================================
// 用途: 历史记录单元，告警与调整逻辑的输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSnapshot {
    pub snapshot_id: Option<i64>, // 入库后由存储分配
    pub plant_id: String,         // 工厂ID
    pub timestamp: DateTime<Utc>, // 采样时间

    // ===== 工况 =====
    pub kiln_temperature: f64, // 窑温 (°C)
    pub feed_rate: f64,        // 喂料量 (t/h)

    // ===== 成分与派生指标 =====
    pub composition: Composition,
    pub lsf: f64,           // 石灰饱和系数 (%)
    pub bogue: BoguePhases, // 矿物相

    // ===== 元数据 =====
    pub source: SnapshotSource,
}

impl ProductionSnapshot {
    /// 返回带存储ID的副本（快照本身不可变）
    pub fn with_snapshot_id(&self, id: i64) -> Self {
        Self {
            snapshot_id: Some(id),
            ..self.clone()
        }
    }
}

// ==========================================
// RawReading - 原始采样读数
// ==========================================
// 来源: 定时采样 / CSV 化验数据导入 / 模拟器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub plant_id: String,
    pub timestamp: Option<DateTime<Utc>>, // 缺省时使用入库时间
    pub kiln_temperature: f64,
    pub feed_rate: f64,
    pub composition: Composition,
}

// ==========================================
// 基准工况（历史为空时的回退值）
// ==========================================
pub const BASELINE_KILN_TEMPERATURE: f64 = 1450.0;
pub const BASELINE_FEED_RATE: f64 = 220.0;
pub const BASELINE_LSF: f64 = 96.0;
pub const BASELINE_COMPOSITION: Composition = Composition {
    cao: 44.0,
    sio2: 14.0,
    al2o3: 3.5,
    fe2o3: 2.5,
};
