// ==========================================
// 水泥窑配料优化系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统（调整建议由操作员确认后应用）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 化学计算与规则
pub mod engine;

// 建议生成方边界
pub mod oracle;

// 导入层 - 化验数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    AdjustmentRecommendation, Alert, AlertFinding, AlertSeverity, BoguePhases, Composition,
    Constraint, ProductionSnapshot, RawReading,
};

pub use engine::{apply_adjustment, compute_bogue, compute_lsf, evaluate_alerts, predict_lsf};

pub use api::{ApiError, ApiResult, PlantApi};

pub use oracle::{RecommendationOracle, RawSuggestion};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "水泥窑配料优化系统";
