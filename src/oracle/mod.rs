// ==========================================
// 水泥窑配料优化系统 - 建议生成方边界
// ==========================================
// 职责: 定义外部建议生成方接口、调用超时、输出解析
// 说明: 建议生成方为外部协作者（非确定、可失败、有延迟）
// 红线: 调用必须有超时；输出必须经 parse 校验后才能使用
// ==========================================

pub mod band_seeking;
pub mod error;
pub mod parse;

use crate::domain::recommendation::Constraint;
use crate::domain::snapshot::{Composition, ProductionSnapshot};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub use band_seeking::BandSeekingOracle;
pub use error::{AdjustmentParseError, OracleError};
pub use parse::{parse_numeric_value, validate_suggestion, ValidatedSuggestion, MAX_ADJUSTMENT_PCT};

/// 默认调用超时（毫秒）
pub const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 30_000;

// ==========================================
// 请求/响应
// ==========================================

/// 建议请求: 当前指标 + 约束
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleRequest {
    pub plant_id: String,
    pub kiln_temperature: f64,
    pub feed_rate: f64,
    pub lsf: f64,
    pub composition: Composition,
    pub constraints: Vec<Constraint>,
}

impl OracleRequest {
    pub fn from_snapshot(snapshot: &ProductionSnapshot, constraints: Vec<Constraint>) -> Self {
        Self {
            plant_id: snapshot.plant_id.clone(),
            kiln_temperature: snapshot.kiln_temperature,
            feed_rate: snapshot.feed_rate,
            lsf: snapshot.lsf,
            composition: snapshot.composition,
            constraints,
        }
    }
}

/// 建议原始输出（字段类型不可信）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSuggestion {
    #[serde(default, alias = "limestoneAdjustment")]
    pub limestone_adj_pct: Value,
    #[serde(default, alias = "clayAdjustment")]
    pub clay_adj_pct: Value,
    #[serde(default)]
    pub feed_rate_setpoint: Value,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl RawSuggestion {
    /// 从 JSON 文本解析（生成式服务通常返回 JSON）
    pub fn from_json(raw: &str) -> Result<Self, OracleError> {
        serde_json::from_str(raw).map_err(|e| OracleError::InvalidResponse(e.to_string()))
    }
}

// ==========================================
// 建议生成方 Trait
// ==========================================

/// 外部建议生成方
#[async_trait]
pub trait RecommendationOracle: Send + Sync {
    async fn suggest(&self, request: &OracleRequest) -> Result<RawSuggestion, OracleError>;
}

// ==========================================
// BoundedOracle - 带超时的调用包装
// ==========================================
// 调用与计时器竞争；超时返回 OracleError::Timeout，不回退到旧数据
pub struct BoundedOracle {
    inner: Arc<dyn RecommendationOracle>,
    timeout: Duration,
}

impl BoundedOracle {
    pub fn new(inner: Arc<dyn RecommendationOracle>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 带超时调用
    pub async fn suggest(&self, request: &OracleRequest) -> Result<RawSuggestion, OracleError> {
        let timeout_ms = self.timeout.as_millis() as u64;

        match tokio::time::timeout(self.timeout, self.inner.suggest(request)).await {
            Ok(Ok(raw)) => {
                tracing::debug!(plant_id = %request.plant_id, "建议生成成功");
                Ok(raw)
            }
            Ok(Err(e)) => {
                tracing::warn!(plant_id = %request.plant_id, error = %e, "建议生成失败");
                Err(e)
            }
            Err(_) => {
                tracing::warn!(plant_id = %request.plant_id, timeout_ms, "建议生成超时");
                Err(OracleError::Timeout { timeout_ms })
            }
        }
    }
}
