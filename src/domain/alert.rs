// ==========================================
// 水泥窑配料优化系统 - 告警领域模型
// ==========================================
// 告警为临时对象: 每次评估从最新快照重新计算，不单独持久化
// ==========================================

use crate::domain::types::{AlertCategory, AlertSeverity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 规则引擎输出（未编号）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertFinding {
    pub severity: AlertSeverity,
    pub category: AlertCategory,
    pub message: String,
}

impl AlertFinding {
    pub fn new(severity: AlertSeverity, category: AlertCategory, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
        }
    }
}

/// 面向调用方的告警（评估时由调用方分配ID与时间戳）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
    pub category: AlertCategory,
    pub message: String,
}

impl Alert {
    /// 为一组告警结果分配ID与时间戳
    ///
    /// ID 格式: `alert-{epoch_millis}-{index}`
    pub fn stamp_all(findings: Vec<AlertFinding>, at: DateTime<Utc>) -> Vec<Alert> {
        let millis = at.timestamp_millis();
        findings
            .into_iter()
            .enumerate()
            .map(|(index, finding)| Alert {
                id: format!("alert-{}-{}", millis, index),
                timestamp: at,
                severity: finding.severity,
                category: finding.category,
                message: finding.message,
            })
            .collect()
    }
}
