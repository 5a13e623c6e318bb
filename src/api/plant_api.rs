// ==========================================
// 水泥窑配料优化系统 - 工厂运行 API
// ==========================================
// 职责:
// - 采样入库 / CSV 化验数据导入
// - 实时指标（含趋势）、历史查询、告警轮询
// - 生成调整建议（外部建议生成方，带超时）
// - 应用调整建议（同工厂串行，原子追加）
// 红线: 告警轮询永不返回错误；建议生成失败不产生任何写入
// ==========================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::config::PlantSettings;
use crate::domain::alert::Alert;
use crate::domain::recommendation::{AdjustmentRecommendation, Constraint};
use crate::domain::snapshot::{ProductionSnapshot, RawReading};
use crate::engine::alert_rules::{data_unavailable, AlertRuleEngine};
use crate::engine::events::{OptionalEventPublisher, SnapshotEvent, SnapshotEventPublisher};
use crate::engine::ingestion::{baseline_snapshot, build_ingested_snapshot};
use crate::engine::prediction::predict_lsf;
use crate::engine::simulator::ReadingSimulator;
use crate::engine::transition::apply_adjustment;
use crate::engine::trend::{compute_trends, MetricTrends};
use crate::importer::read_readings_file;
use crate::oracle::{validate_suggestion, BoundedOracle, OracleRequest, RecommendationOracle};
use crate::repository::SnapshotStore;

/// 实时指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub snapshot: ProductionSnapshot,
    pub trends: MetricTrends,
    /// 历史为空，返回的是基准工况
    pub is_baseline: bool,
}

// ==========================================
// PlantApi
// ==========================================
pub struct PlantApi {
    store: Arc<dyn SnapshotStore>,
    oracle: BoundedOracle,
    alert_engine: AlertRuleEngine,
    settings: PlantSettings,
    // 每个工厂一把写锁：同工厂写入串行，不同工厂并行
    plant_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    event_publisher: OptionalEventPublisher,
}

impl PlantApi {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        oracle: Arc<dyn RecommendationOracle>,
        settings: PlantSettings,
    ) -> Self {
        Self {
            store,
            oracle: BoundedOracle::new(oracle, settings.oracle_timeout),
            alert_engine: AlertRuleEngine::new(settings.alert_config()),
            settings,
            plant_locks: Mutex::new(HashMap::new()),
            event_publisher: OptionalEventPublisher::none(),
        }
    }

    /// 配置快照事件发布器
    pub fn with_event_publisher(mut self, publisher: Arc<dyn SnapshotEventPublisher>) -> Self {
        self.event_publisher = OptionalEventPublisher::with_publisher(publisher);
        self
    }

    pub fn settings(&self) -> &PlantSettings {
        &self.settings
    }

    fn plant_lock(&self, plant_id: &str) -> ApiResult<Arc<Mutex<()>>> {
        let mut locks = self
            .plant_locks
            .lock()
            .map_err(|e| ApiError::InternalError(format!("工厂锁表获取失败: {}", e)))?;
        Ok(locks
            .entry(plant_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    fn require_plant_id(plant_id: &str) -> ApiResult<()> {
        if plant_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("plant_id 不能为空".to_string()));
        }
        Ok(())
    }

    // ==========================================
    // 采样入库
    // ==========================================

    /// 入库一条原始读数
    ///
    /// # 返回
    /// - `Ok(snapshot)`: 已入库快照（带 snapshot_id）
    /// - `Err(InvalidInput)`: plant_id 为空，或窑温/喂料量非有限
    pub fn ingest_reading(&self, reading: RawReading) -> ApiResult<ProductionSnapshot> {
        Self::require_plant_id(&reading.plant_id)?;
        if !reading.kiln_temperature.is_finite() || !reading.feed_rate.is_finite() {
            return Err(ApiError::InvalidInput(format!(
                "窑温/喂料量必须为有限数值: kiln_temperature={}, feed_rate={}",
                reading.kiln_temperature, reading.feed_rate
            )));
        }

        let snapshot = build_ingested_snapshot(&reading, Utc::now());

        let lock = self.plant_lock(&snapshot.plant_id)?;
        let _guard = lock
            .lock()
            .map_err(|e| ApiError::InternalError(format!("工厂写锁获取失败: {}", e)))?;

        let id = self.store.append(&snapshot)?;
        let persisted = snapshot.with_snapshot_id(id);

        tracing::info!(
            plant_id = %persisted.plant_id,
            snapshot_id = id,
            lsf = persisted.lsf,
            kiln_temperature = persisted.kiln_temperature,
            "采样入库"
        );
        self.event_publisher
            .publish(SnapshotEvent::ingested(persisted.plant_id.clone(), id));

        Ok(persisted)
    }

    /// 模拟一次采样并入库
    pub fn simulate_tick(
        &self,
        simulator: &mut ReadingSimulator,
        plant_id: &str,
    ) -> ApiResult<ProductionSnapshot> {
        let reading = simulator.next_reading(plant_id, Utc::now());
        self.ingest_reading(reading)
    }

    /// 导入化验读数 CSV，逐行入库
    ///
    /// 解析失败时不写入任何行
    ///
    /// # 返回
    /// - `Ok(count)`: 入库行数
    pub fn import_readings_csv(&self, path: &Path) -> ApiResult<usize> {
        let readings = read_readings_file(path, &self.settings.default_plant_id)?;

        let mut count = 0;
        for reading in readings {
            self.ingest_reading(reading)?;
            count += 1;
        }

        tracing::info!(path = %path.display(), count, "化验读数导入完成");
        Ok(count)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 最新指标与相对上一快照的趋势
    ///
    /// 历史为空时返回基准工况（is_baseline = true）
    pub fn live_metrics(&self, plant_id: &str) -> ApiResult<LiveMetrics> {
        Self::require_plant_id(plant_id)?;

        let recent = self.store.recent(plant_id, 2)?;
        let metrics = match recent.first() {
            Some(current) => LiveMetrics {
                snapshot: current.clone(),
                trends: compute_trends(current, recent.get(1)),
                is_baseline: false,
            },
            None => {
                tracing::debug!(plant_id, "历史为空，返回基准工况");
                LiveMetrics {
                    snapshot: baseline_snapshot(plant_id, Utc::now()),
                    trends: MetricTrends::default(),
                    is_baseline: true,
                }
            }
        };
        Ok(metrics)
    }

    /// 最近的历史快照（新→旧），条数由 history_limit 控制
    pub fn history(&self, plant_id: &str) -> ApiResult<Vec<ProductionSnapshot>> {
        Self::require_plant_id(plant_id)?;
        Ok(self.store.recent(plant_id, self.settings.history_limit)?)
    }

    /// 告警轮询
    ///
    /// 永不返回错误：读取失败时返回一条合成的“数据不可用” WARNING
    pub fn current_alerts(&self, plant_id: &str) -> Vec<Alert> {
        let now = Utc::now();
        let findings = match self.store.latest(plant_id) {
            Ok(Some(snapshot)) => self.alert_engine.evaluate_snapshot(&snapshot),
            Ok(None) => self
                .alert_engine
                .evaluate_snapshot(&baseline_snapshot(plant_id, now)),
            Err(e) => {
                tracing::warn!(plant_id, error = %e, "读取最新快照失败，返回数据不可用告警");
                vec![data_unavailable()]
            }
        };
        Alert::stamp_all(findings, now)
    }

    // ==========================================
    // 建议生成
    // ==========================================

    /// 生成调整建议
    ///
    /// # 参数
    /// - `plant_id`: 工厂ID
    /// - `constraints`: 逗号分隔的约束；为空时使用配置的默认约束
    ///
    /// # 返回
    /// - `Err(OracleTimeout / OracleUnavailable)`: 建议生成失败，无任何写入
    pub async fn recommend(
        &self,
        plant_id: &str,
        constraints: Option<&str>,
    ) -> ApiResult<AdjustmentRecommendation> {
        Self::require_plant_id(plant_id)?;

        let constraints = match constraints.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Constraint::parse_list(Some(raw)),
            None => self.settings.default_constraints.clone(),
        };

        let current = match self.store.latest(plant_id)? {
            Some(s) => s,
            None => baseline_snapshot(plant_id, Utc::now()),
        };

        let request = OracleRequest::from_snapshot(&current, constraints.clone());
        let raw = self.oracle.suggest(&request).await?;
        let validated = validate_suggestion(&raw, current.feed_rate);

        let predicted_lsf = predict_lsf(
            current.lsf,
            validated.limestone_adj_pct,
            validated.clay_adj_pct,
        );

        let recommendation = AdjustmentRecommendation {
            recommendation_id: Uuid::new_v4().to_string(),
            plant_id: plant_id.to_string(),
            based_on_snapshot_id: current.snapshot_id,
            limestone_adj_pct: validated.limestone_adj_pct,
            clay_adj_pct: validated.clay_adj_pct,
            feed_rate_setpoint: validated.feed_rate_setpoint,
            predicted_lsf,
            explanation: validated.explanation,
            constraints,
            parse_warnings: validated.warnings,
            created_at: Utc::now(),
        };

        tracing::info!(
            plant_id,
            recommendation_id = %recommendation.recommendation_id,
            limestone_adj_pct = recommendation.limestone_adj_pct,
            clay_adj_pct = recommendation.clay_adj_pct,
            predicted_lsf,
            warnings = recommendation.parse_warnings.len(),
            "调整建议已生成"
        );
        Ok(recommendation)
    }

    // ==========================================
    // 应用调整
    // ==========================================

    /// 应用调整建议，追加新快照
    ///
    /// 流程: 获取工厂写锁 → 读取最新快照（无则基准） → 构造新快照 → 事务内校验并追加
    ///
    /// # 返回
    /// - `Ok(snapshot)`: 新快照（带 snapshot_id）
    /// - `Err(RecommendationAlreadyApplied)`: 同一建议重复应用
    /// - `Err(StoreWriteConflict)`: 读取后最新快照被其他写入方改变
    pub fn apply_adjustment(
        &self,
        recommendation: &AdjustmentRecommendation,
    ) -> ApiResult<ProductionSnapshot> {
        Self::require_plant_id(&recommendation.plant_id)?;
        let adjustments = [
            recommendation.limestone_adj_pct,
            recommendation.clay_adj_pct,
            recommendation.feed_rate_setpoint,
            recommendation.predicted_lsf,
        ];
        if adjustments.iter().any(|v| !v.is_finite()) {
            return Err(ApiError::InvalidInput(format!(
                "调整建议包含非有限数值: recommendation_id={}",
                recommendation.recommendation_id
            )));
        }

        let plant_id = recommendation.plant_id.as_str();
        let lock = self.plant_lock(plant_id)?;
        let _guard = lock
            .lock()
            .map_err(|e| ApiError::InternalError(format!("工厂写锁获取失败: {}", e)))?;

        let now = Utc::now();
        let latest = self.store.latest(plant_id)?;
        let expected_latest_id = latest.as_ref().and_then(|s| s.snapshot_id);

        if recommendation.based_on_snapshot_id != expected_latest_id {
            tracing::warn!(
                plant_id,
                recommendation_id = %recommendation.recommendation_id,
                based_on = ?recommendation.based_on_snapshot_id,
                latest = ?expected_latest_id,
                "建议生成后已有新快照，基于最新快照应用"
            );
        }

        let current = latest.unwrap_or_else(|| baseline_snapshot(plant_id, now));
        let next = apply_adjustment(&current, recommendation, now);

        let id = self.store.append_adjustment(
            &next,
            expected_latest_id,
            &recommendation.recommendation_id,
        )?;
        let persisted = next.with_snapshot_id(id);

        self.event_publisher.publish(SnapshotEvent::adjustment_applied(
            plant_id.to_string(),
            id,
            recommendation.recommendation_id.clone(),
        ));

        Ok(persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::domain::snapshot::Composition;
    use crate::domain::types::{AlertSeverity, SnapshotSource};
    use crate::oracle::BandSeekingOracle;
    use crate::repository::{RepositoryError, RepositoryResult, SnapshotRepository};
    use rusqlite::Connection;

    fn api() -> PlantApi {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let store = Arc::new(SnapshotRepository::new(Arc::new(Mutex::new(conn))));
        PlantApi::new(store, Arc::new(BandSeekingOracle::new()), PlantSettings::default())
    }

    fn reading(plant: &str, kiln: f64, cao: f64) -> RawReading {
        RawReading {
            plant_id: plant.to_string(),
            timestamp: None,
            kiln_temperature: kiln,
            feed_rate: 220.0,
            composition: Composition::new(cao, 14.0, 3.5, 2.5),
        }
    }

    struct BrokenStore;

    impl SnapshotStore for BrokenStore {
        fn latest(&self, _plant_id: &str) -> RepositoryResult<Option<ProductionSnapshot>> {
            Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()))
        }
        fn append(&self, _snapshot: &ProductionSnapshot) -> RepositoryResult<i64> {
            Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()))
        }
        fn recent(&self, _plant_id: &str, _limit: usize) -> RepositoryResult<Vec<ProductionSnapshot>> {
            Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()))
        }
        fn append_adjustment(
            &self,
            _snapshot: &ProductionSnapshot,
            _expected_latest_id: Option<i64>,
            _recommendation_id: &str,
        ) -> RepositoryResult<i64> {
            Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()))
        }
    }

    #[test]
    fn test_ingest_derives_chemistry() {
        let api = api();
        let s = api.ingest_reading(reading("p1", 1450.0, 44.0)).unwrap();

        assert!(s.snapshot_id.is_some());
        assert!(s.lsf > 0.0);
        assert_eq!(s.source, SnapshotSource::Ingestion);
    }

    #[test]
    fn test_ingest_rejects_empty_plant_and_nan_temperature() {
        let api = api();
        assert!(matches!(
            api.ingest_reading(reading("  ", 1450.0, 44.0)),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.ingest_reading(reading("p1", f64::NAN, 44.0)),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_live_metrics_falls_back_to_baseline() {
        let m = api().live_metrics("p1").unwrap();
        assert!(m.is_baseline);
        assert_eq!(m.snapshot.lsf, 96.0);
        assert_eq!(m.trends, MetricTrends::default());
    }

    #[test]
    fn test_live_metrics_trend_against_previous() {
        let api = api();
        api.ingest_reading(reading("p1", 1450.0, 44.0)).unwrap();
        api.ingest_reading(reading("p1", 1479.0, 44.0)).unwrap();

        let m = api.live_metrics("p1").unwrap();
        assert!(!m.is_baseline);
        assert!((m.trends.kiln_temperature_pct.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_current_alerts_critical_temperature() {
        let api = api();
        api.ingest_reading(reading("p1", 1502.5, 44.0)).unwrap();

        let alerts = api.current_alerts("p1");
        assert!(alerts
            .iter()
            .any(|a| a.severity == AlertSeverity::Critical));
        assert!(alerts[0].id.starts_with("alert-"));
    }

    #[test]
    fn test_current_alerts_on_store_failure() {
        let api = PlantApi::new(
            Arc::new(BrokenStore),
            Arc::new(BandSeekingOracle::new()),
            PlantSettings::default(),
        );

        let alerts = api.current_alerts("p1");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
    }

    #[tokio::test]
    async fn test_recommend_then_apply_once() {
        let api = api();
        let before = api.ingest_reading(reading("p1", 1450.0, 42.0)).unwrap();

        let rec = api.recommend("p1", None).await.unwrap();
        assert_eq!(rec.based_on_snapshot_id, before.snapshot_id);
        assert_eq!(rec.constraints, vec![Constraint::new("TARGET_LSF_94_98")]);

        let after = api.apply_adjustment(&rec).unwrap();
        assert!(after.snapshot_id > before.snapshot_id);
        assert_eq!(after.lsf, rec.predicted_lsf);
        assert_eq!(
            after.source.recommendation_id(),
            Some(rec.recommendation_id.as_str())
        );

        assert!(matches!(
            api.apply_adjustment(&rec),
            Err(ApiError::RecommendationAlreadyApplied(_))
        ));
        assert_eq!(api.history("p1").unwrap().len(), 2);
    }

    #[test]
    fn test_apply_on_empty_history_uses_baseline() {
        let api = api();
        let rec = AdjustmentRecommendation {
            recommendation_id: "rec-1".to_string(),
            plant_id: "p1".to_string(),
            based_on_snapshot_id: None,
            limestone_adj_pct: 2.0,
            clay_adj_pct: 0.0,
            feed_rate_setpoint: 225.0,
            predicted_lsf: 99.0,
            explanation: String::new(),
            constraints: vec![],
            parse_warnings: vec![],
            created_at: Utc::now(),
        };

        let s = api.apply_adjustment(&rec).unwrap();
        assert!((s.composition.cao - 44.0 * 1.02).abs() < 1e-6);
        assert_eq!(s.kiln_temperature, 1445.0);
        assert_eq!(s.feed_rate, 225.0);
    }
}
