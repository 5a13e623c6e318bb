// ==========================================
// 水泥窑配料优化系统 - 告警规则引擎
// ==========================================
// 职责: 将快照指标分级为告警列表
// 输入: 窑温 + LSF
// 输出: Vec<AlertFinding> (可为空)
// 红线: 永不抛错；输入缺失时仅返回一条"数据不可用"警告
// ==========================================

use crate::domain::alert::AlertFinding;
use crate::domain::snapshot::ProductionSnapshot;
use crate::domain::types::{AlertCategory, AlertSeverity};
use serde::{Deserialize, Serialize};

// ===== 窑温阈值 (°C) =====
pub const KILN_TEMP_CRITICAL_HIGH: f64 = 1480.0;
pub const KILN_TEMP_CRITICAL_LOW: f64 = 1420.0;
pub const KILN_TEMP_IDEAL_MAX: f64 = 1470.0;
pub const KILN_TEMP_IDEAL_MIN: f64 = 1430.0;

// ===== LSF 理想区间 (%) =====
pub const LSF_IDEAL_MIN: f64 = 94.0;
pub const LSF_IDEAL_MAX: f64 = 98.0;

/// 告警评估配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertConfig {
    /// 全部指标正常时是否输出一条 INFO "运行正常"
    pub emit_nominal_info: bool,
}

/// 告警评估输入
///
/// 字段为 Option: 上游读数缺失时为 None
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertMetrics {
    pub kiln_temperature: Option<f64>,
    pub lsf: Option<f64>,
}

impl AlertMetrics {
    pub fn new(kiln_temperature: f64, lsf: f64) -> Self {
        Self {
            kiln_temperature: Some(kiln_temperature),
            lsf: Some(lsf),
        }
    }
}

impl From<&ProductionSnapshot> for AlertMetrics {
    fn from(snapshot: &ProductionSnapshot) -> Self {
        Self::new(snapshot.kiln_temperature, snapshot.lsf)
    }
}

/// 评估告警
///
/// # 规则（按优先级）
/// 1. 窑温 > 1480 或 < 1420 → CRITICAL
/// 2. 窑温 ∈ (1470, 1480] 或 [1420, 1430) → WARNING
/// 3. LSF < 94 或 > 98 → WARNING（独立于窑温检查）
/// 4. 均未触发: emit_nominal_info=true 时输出一条 INFO，否则为空列表
pub fn evaluate_alerts(metrics: &AlertMetrics, config: &AlertConfig) -> Vec<AlertFinding> {
    let (kiln_temp, lsf) = match (metrics.kiln_temperature, metrics.lsf) {
        (Some(t), Some(l)) if t.is_finite() && l.is_finite() => (t, l),
        _ => {
            tracing::warn!(?metrics, "告警评估输入缺失或非法");
            return vec![data_unavailable()];
        }
    };

    let mut findings = Vec::new();

    if let Some(finding) = evaluate_kiln_temperature(kiln_temp) {
        findings.push(finding);
    }

    if lsf < LSF_IDEAL_MIN || lsf > LSF_IDEAL_MAX {
        let direction = if lsf < LSF_IDEAL_MIN { "偏低" } else { "偏高" };
        findings.push(AlertFinding::new(
            AlertSeverity::Warning,
            AlertCategory::Lsf,
            format!(
                "LSF {}: {:.1}%，超出目标区间 {:.0}~{:.0}%，可能影响熟料质量",
                direction, lsf, LSF_IDEAL_MIN, LSF_IDEAL_MAX
            ),
        ));
    }

    if findings.is_empty() && config.emit_nominal_info {
        findings.push(AlertFinding::new(
            AlertSeverity::Info,
            AlertCategory::Nominal,
            format!("运行正常: 窑温 {:.1}°C，LSF {:.1}%", kiln_temp, lsf),
        ));
    }

    findings
}

fn evaluate_kiln_temperature(kiln_temp: f64) -> Option<AlertFinding> {
    if kiln_temp > KILN_TEMP_CRITICAL_HIGH {
        Some(AlertFinding::new(
            AlertSeverity::Critical,
            AlertCategory::KilnTemperature,
            format!(
                "窑温过高: {:.1}°C，超过临界上限 {:.0}°C",
                kiln_temp, KILN_TEMP_CRITICAL_HIGH
            ),
        ))
    } else if kiln_temp < KILN_TEMP_CRITICAL_LOW {
        Some(AlertFinding::new(
            AlertSeverity::Critical,
            AlertCategory::KilnTemperature,
            format!(
                "窑温过低: {:.1}°C，低于临界下限 {:.0}°C",
                kiln_temp, KILN_TEMP_CRITICAL_LOW
            ),
        ))
    } else if kiln_temp > KILN_TEMP_IDEAL_MAX {
        Some(AlertFinding::new(
            AlertSeverity::Warning,
            AlertCategory::KilnTemperature,
            format!(
                "窑温偏高: {:.1}°C，超出理想区间 {:.0}~{:.0}°C",
                kiln_temp, KILN_TEMP_IDEAL_MIN, KILN_TEMP_IDEAL_MAX
            ),
        ))
    } else if kiln_temp < KILN_TEMP_IDEAL_MIN {
        Some(AlertFinding::new(
            AlertSeverity::Warning,
            AlertCategory::KilnTemperature,
            format!(
                "窑温偏低: {:.1}°C，低于理想区间 {:.0}~{:.0}°C",
                kiln_temp, KILN_TEMP_IDEAL_MIN, KILN_TEMP_IDEAL_MAX
            ),
        ))
    } else {
        None
    }
}

/// 数据不可用时的合成警告
pub fn data_unavailable() -> AlertFinding {
    AlertFinding::new(
        AlertSeverity::Warning,
        AlertCategory::DataQuality,
        "数据不可用: 无法获取有效的窑温/LSF 读数",
    )
}

// ==========================================
// AlertRuleEngine - 绑定配置的规则引擎
// ==========================================
pub struct AlertRuleEngine {
    config: AlertConfig,
}

impl AlertRuleEngine {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// 评估快照
    pub fn evaluate_snapshot(&self, snapshot: &ProductionSnapshot) -> Vec<AlertFinding> {
        evaluate_alerts(&AlertMetrics::from(snapshot), &self.config)
    }
}
