// ==========================================
// 水泥窑配料优化系统 - 领域类型定义
// ==========================================
// 职责: 告警级别、告警类别、快照来源等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 告警级别 (Alert Severity)
// ==========================================
// 顺序: Info < Warning < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Info,     // 信息
    Warning,  // 警告
    Critical, // 严重
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "INFO",
            AlertSeverity::Warning => "WARNING",
            AlertSeverity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 告警类别 (Alert Category)
// ==========================================
// 窑温与 LSF 为相互独立的检查项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertCategory {
    KilnTemperature, // 窑温
    Lsf,             // 石灰饱和系数
    DataQuality,     // 数据不可用
    Nominal,         // 运行正常
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertCategory::KilnTemperature => write!(f, "KILN_TEMPERATURE"),
            AlertCategory::Lsf => write!(f, "LSF"),
            AlertCategory::DataQuality => write!(f, "DATA_QUALITY"),
            AlertCategory::Nominal => write!(f, "NOMINAL"),
        }
    }
}

// ==========================================
// 快照来源 (Snapshot Source)
// ==========================================
// Ingestion: 采样入库
// Adjustment: 应用优化建议后生成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotSource {
    Ingestion,
    Adjustment { recommendation_id: String },
}

impl SnapshotSource {
    /// 数据库存储用的类别字符串
    pub fn kind_str(&self) -> &'static str {
        match self {
            SnapshotSource::Ingestion => "INGESTION",
            SnapshotSource::Adjustment { .. } => "ADJUSTMENT",
        }
    }

    /// 关联的优化建议ID（仅 Adjustment 有）
    pub fn recommendation_id(&self) -> Option<&str> {
        match self {
            SnapshotSource::Ingestion => None,
            SnapshotSource::Adjustment { recommendation_id } => Some(recommendation_id),
        }
    }

    /// 从数据库字段还原
    pub fn from_parts(kind: &str, recommendation_id: Option<String>) -> Self {
        match (kind, recommendation_id) {
            ("ADJUSTMENT", Some(id)) => SnapshotSource::Adjustment {
                recommendation_id: id,
            },
            _ => SnapshotSource::Ingestion,
        }
    }
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSource::Ingestion => write!(f, "INGESTION"),
            SnapshotSource::Adjustment { recommendation_id } => {
                write!(f, "ADJUSTMENT({})", recommendation_id)
            }
        }
    }
}
