// ==========================================
// 水泥窑配料优化系统 - 优化建议领域模型
// ==========================================
// 状态: 建议生成后为 Pending，被应用一次后即消费
// 策略: 同一建议重复应用将被拒绝
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 默认约束: LSF 目标区间 94~98
pub const DEFAULT_CONSTRAINT: &str = "TARGET_LSF_94_98";

// ==========================================
// Constraint - 运行约束标签
// ==========================================
// 核心不解释约束语义，仅透传给建议生成方
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constraint(String);

impl Constraint {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 解析逗号分隔的约束列表
    ///
    /// 空输入返回默认约束 `TARGET_LSF_94_98`
    pub fn parse_list(input: Option<&str>) -> Vec<Constraint> {
        let parsed: Vec<Constraint> = input
            .unwrap_or("")
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Constraint::new)
            .collect();

        if parsed.is_empty() {
            vec![Constraint::new(DEFAULT_CONSTRAINT)]
        } else {
            parsed
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==========================================
// AdjustmentRecommendation - 配料调整建议
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRecommendation {
    pub recommendation_id: String,          // 唯一ID (UUID)
    pub plant_id: String,                   // 工厂ID
    pub based_on_snapshot_id: Option<i64>,  // 生成时参照的快照

    // ===== 调整量 =====
    pub limestone_adj_pct: f64,  // 石灰石调整 (±%)
    pub clay_adj_pct: f64,       // 粘土/页岩调整 (±%)
    pub feed_rate_setpoint: f64, // 喂料量设定 (t/h)

    // ===== 预测与解释 =====
    pub predicted_lsf: f64,
    pub explanation: String,
    pub constraints: Vec<Constraint>,
    pub parse_warnings: Vec<String>, // 被降级为默认值的字段说明

    pub created_at: DateTime<Utc>,
}
