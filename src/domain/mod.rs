// ==========================================
// 水泥窑配料优化系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod alert;
pub mod recommendation;
pub mod snapshot;
pub mod types;

// 重导出核心类型
pub use alert::{Alert, AlertFinding};
pub use recommendation::{AdjustmentRecommendation, Constraint, DEFAULT_CONSTRAINT};
pub use snapshot::{BoguePhases, Composition, ProductionSnapshot, RawReading};
pub use types::{AlertCategory, AlertSeverity, SnapshotSource};
