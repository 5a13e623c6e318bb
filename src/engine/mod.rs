// ==========================================
// 水泥窑配料优化系统 - 引擎层
// ==========================================
// 职责: 化学计算、告警规则、LSF 预测、调整状态转换
// 红线: Engine 不拼 SQL；除 events 外均为纯函数，可并发调用
// ==========================================

pub mod alert_rules;
pub mod chemistry;
pub mod events;
pub mod ingestion;
pub mod prediction;
pub mod simulator;
pub mod transition;
pub mod trend;

// 重导出核心引擎
pub use alert_rules::{evaluate_alerts, AlertConfig, AlertMetrics, AlertRuleEngine};
pub use chemistry::{compute_bogue, compute_lsf, FREE_LIME_PCT};
pub use events::{
    BroadcastEventPublisher, NoOpEventPublisher, OptionalEventPublisher, SnapshotEvent, SnapshotEventPublisher,
    SnapshotEventType,
};
pub use ingestion::{baseline_snapshot, build_ingested_snapshot};
pub use prediction::predict_lsf;
pub use simulator::ReadingSimulator;
pub use transition::apply_adjustment;
pub use trend::{compute_trends, MetricTrends};
