// ==========================================
// 水泥窑配料优化系统 - 生产快照数据仓储
// ==========================================
// 存储: production_metrics 表（只追加）+ applied_recommendation 表
// 红线: Repository 不做业务逻辑，只做数据映射
// 红线: 快照行写入后不更新、不删除
// ==========================================

use crate::domain::snapshot::{BoguePhases, Composition, ProductionSnapshot};
use crate::domain::types::SnapshotSource;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SnapshotStore Trait
// ==========================================
// 实现者: SnapshotRepository（使用 rusqlite）
pub trait SnapshotStore: Send + Sync {
    /// 最新快照；无历史时返回 None
    fn latest(&self, plant_id: &str) -> RepositoryResult<Option<ProductionSnapshot>>;

    /// 追加快照，返回存储分配的 snapshot_id
    fn append(&self, snapshot: &ProductionSnapshot) -> RepositoryResult<i64>;

    /// 最近 limit 条快照（新→旧）
    fn recent(&self, plant_id: &str, limit: usize) -> RepositoryResult<Vec<ProductionSnapshot>>;

    /// 原子追加调整快照
    ///
    /// # 参数
    /// - `snapshot`: 调整后的新快照
    /// - `expected_latest_id`: 读取时看到的最新快照ID（历史为空时为 None）
    /// - `recommendation_id`: 被消费的建议ID
    ///
    /// # 返回
    /// - `Ok(snapshot_id)`: 成功
    /// - `Err(StoreWriteConflict)`: 最新快照已被其他写入方改变
    /// - `Err(RecommendationAlreadyApplied)`: 建议已被消费
    fn append_adjustment(
        &self,
        snapshot: &ProductionSnapshot,
        expected_latest_id: Option<i64>,
        recommendation_id: &str,
    ) -> RepositoryResult<i64>;
}

// ==========================================
// SnapshotRepository - SQLite 实现
// ==========================================
pub struct SnapshotRepository {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = "id, plant_id, timestamp, kiln_temperature, feed_rate, \
     cao, sio2, al2o3, fe2o3, lsf, c3s, c2s, c3a, c4af, source_kind, recommendation_id";

const INSERT_SQL: &str = r#"
    INSERT INTO production_metrics (
        plant_id, timestamp, kiln_temperature, feed_rate,
        cao, sio2, al2o3, fe2o3, lsf, c3s, c2s, c3a, c4af,
        source_kind, recommendation_id
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
"#;

impl SnapshotRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 建议是否已被消费
    pub fn is_recommendation_applied(&self, recommendation_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM applied_recommendation WHERE recommendation_id = ?1",
                params![recommendation_id],
                |_row| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// 工厂快照总数
    pub fn count(&self, plant_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row(
            "SELECT COUNT(*) FROM production_metrics WHERE plant_id = ?1",
            params![plant_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    fn insert_row(conn: &Connection, s: &ProductionSnapshot) -> RepositoryResult<i64> {
        conn.execute(
            INSERT_SQL,
            params![
                s.plant_id,
                s.timestamp,
                s.kiln_temperature,
                s.feed_rate,
                s.composition.cao,
                s.composition.sio2,
                s.composition.al2o3,
                s.composition.fe2o3,
                s.lsf,
                s.bogue.c3s,
                s.bogue.c2s,
                s.bogue.c3a,
                s.bogue.c4af,
                s.source.kind_str(),
                s.source.recommendation_id(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn latest_id(conn: &Connection, plant_id: &str) -> RepositoryResult<Option<i64>> {
        let id = conn.query_row(
            "SELECT MAX(id) FROM production_metrics WHERE plant_id = ?1",
            params![plant_id],
            |row| row.get::<_, Option<i64>>(0),
        )?;
        Ok(id)
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ProductionSnapshot> {
        let kind: String = row.get(14)?;
        let recommendation_id: Option<String> = row.get(15)?;
        let timestamp: DateTime<Utc> = row.get(2)?;

        Ok(ProductionSnapshot {
            snapshot_id: Some(row.get(0)?),
            plant_id: row.get(1)?,
            timestamp,
            kiln_temperature: row.get(3)?,
            feed_rate: row.get(4)?,
            composition: Composition::new(row.get(5)?, row.get(6)?, row.get(7)?, row.get(8)?),
            lsf: row.get(9)?,
            bogue: BoguePhases {
                c3s: row.get(10)?,
                c2s: row.get(11)?,
                c3a: row.get(12)?,
                c4af: row.get(13)?,
            },
            source: SnapshotSource::from_parts(&kind, recommendation_id),
        })
    }
}

impl SnapshotStore for SnapshotRepository {
    fn latest(&self, plant_id: &str) -> RepositoryResult<Option<ProductionSnapshot>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM production_metrics WHERE plant_id = ?1 ORDER BY id DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let snapshot = conn
            .query_row(&sql, params![plant_id], Self::map_row)
            .optional()?;
        Ok(snapshot)
    }

    fn append(&self, snapshot: &ProductionSnapshot) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let id = Self::insert_row(&conn, snapshot)?;
        tracing::debug!(plant_id = %snapshot.plant_id, snapshot_id = id, source = %snapshot.source, "快照已追加");
        Ok(id)
    }

    fn recent(&self, plant_id: &str, limit: usize) -> RepositoryResult<Vec<ProductionSnapshot>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM production_metrics WHERE plant_id = ?1 ORDER BY id DESC LIMIT ?2",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![plant_id, limit as i64], Self::map_row)?;

        let mut snapshots = Vec::new();
        for row in rows {
            snapshots.push(row?);
        }
        Ok(snapshots)
    }

    fn append_adjustment(
        &self,
        snapshot: &ProductionSnapshot,
        expected_latest_id: Option<i64>,
        recommendation_id: &str,
    ) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // 乐观校验: 最新快照必须仍是读取时的那一条
        let actual = Self::latest_id(&tx, &snapshot.plant_id)?;
        if actual != expected_latest_id {
            return Err(RepositoryError::StoreWriteConflict {
                plant_id: snapshot.plant_id.clone(),
                expected: expected_latest_id,
                actual,
            });
        }

        let already: Option<String> = tx
            .query_row(
                "SELECT plant_id FROM applied_recommendation WHERE recommendation_id = ?1",
                params![recommendation_id],
                |row| row.get(0),
            )
            .optional()?;
        if already.is_some() {
            return Err(RepositoryError::RecommendationAlreadyApplied(
                recommendation_id.to_string(),
            ));
        }

        let id = Self::insert_row(&tx, snapshot)?;

        tx.execute(
            "INSERT INTO applied_recommendation (recommendation_id, plant_id, snapshot_id, applied_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![recommendation_id, snapshot.plant_id, id, Utc::now()],
        )
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::UniqueConstraintViolation(_) => {
                RepositoryError::RecommendationAlreadyApplied(recommendation_id.to_string())
            }
            other => other,
        })?;

        tx.commit()?;

        tracing::info!(
            plant_id = %snapshot.plant_id,
            snapshot_id = id,
            recommendation_id,
            "调整快照已追加"
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::engine::ingestion::baseline_snapshot;

    fn repo() -> SnapshotRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        SnapshotRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn adjusted(plant: &str, rec: &str) -> ProductionSnapshot {
        let mut s = baseline_snapshot(plant, Utc::now());
        s.source = SnapshotSource::Adjustment {
            recommendation_id: rec.to_string(),
        };
        s
    }

    #[test]
    fn test_latest_on_empty_history() {
        assert!(repo().latest("poc_plant_01").unwrap().is_none());
    }

    #[test]
    fn test_append_and_read_back() {
        let repo = repo();
        let s = baseline_snapshot("poc_plant_01", Utc::now());

        let id1 = repo.append(&s).unwrap();
        let id2 = repo.append(&s).unwrap();
        assert!(id2 > id1);

        let latest = repo.latest("poc_plant_01").unwrap().unwrap();
        assert_eq!(latest.snapshot_id, Some(id2));
        assert_eq!(latest.composition, s.composition);
        assert_eq!(latest.source, SnapshotSource::Ingestion);

        let recent = repo.recent("poc_plant_01", 10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].snapshot_id, Some(id2));
        assert!(repo.recent("other_plant", 10).unwrap().is_empty());
    }

    #[test]
    fn test_append_adjustment_detects_conflict() {
        let repo = repo();
        let first = repo.append(&baseline_snapshot("p1", Utc::now())).unwrap();
        repo.append(&baseline_snapshot("p1", Utc::now())).unwrap();

        let err = repo
            .append_adjustment(&adjusted("p1", "rec-1"), Some(first), "rec-1")
            .unwrap_err();
        assert!(matches!(err, RepositoryError::StoreWriteConflict { .. }));
        assert_eq!(repo.count("p1").unwrap(), 2);
        assert!(!repo.is_recommendation_applied("rec-1").unwrap());
    }

    #[test]
    fn test_append_adjustment_rejects_reapply() {
        let repo = repo();

        let id = repo
            .append_adjustment(&adjusted("p1", "rec-1"), None, "rec-1")
            .unwrap();
        let latest = repo.latest("p1").unwrap().unwrap();
        assert_eq!(latest.source.recommendation_id(), Some("rec-1"));

        let err = repo
            .append_adjustment(&adjusted("p1", "rec-1"), Some(id), "rec-1")
            .unwrap_err();
        assert!(matches!(err, RepositoryError::RecommendationAlreadyApplied(_)));
        assert_eq!(repo.count("p1").unwrap(), 1);
    }
}
