// ==========================================
// 水泥窑配料优化系统 - 采样入库快照构造
// ==========================================
// 职责: 原始读数 → 派生 LSF/Bogue → 快照
// 非法成分（负值/非有限/超过 100）降级后计算，不拒收
// ==========================================

use crate::domain::snapshot::{
    ProductionSnapshot, RawReading, BASELINE_COMPOSITION, BASELINE_FEED_RATE,
    BASELINE_KILN_TEMPERATURE, BASELINE_LSF,
};
use crate::domain::types::SnapshotSource;
use chrono::{DateTime, Utc};

/// 由原始读数构造采样快照
///
/// # 参数
/// - `reading`: 原始读数
/// - `received_at`: 入库时间（读数未带时间戳时使用）
pub fn build_ingested_snapshot(reading: &RawReading, received_at: DateTime<Utc>) -> ProductionSnapshot {
    let composition = if reading.composition.is_valid() {
        reading.composition
    } else {
        tracing::warn!(
            plant_id = %reading.plant_id,
            composition = ?reading.composition,
            "成分数据非法 (InvalidComposition)，降级处理"
        );
        reading.composition.sanitized()
    };

    ProductionSnapshot {
        snapshot_id: None,
        plant_id: reading.plant_id.clone(),
        timestamp: reading.timestamp.unwrap_or(received_at),
        kiln_temperature: reading.kiln_temperature,
        feed_rate: reading.feed_rate,
        composition,
        lsf: composition.lsf(),
        bogue: composition.bogue(),
        source: SnapshotSource::Ingestion,
    }
}

/// 历史为空时的基准快照
///
/// LSF 沿用基准值 96%，矿物相按基准成分计算
pub fn baseline_snapshot(plant_id: &str, at: DateTime<Utc>) -> ProductionSnapshot {
    ProductionSnapshot {
        snapshot_id: None,
        plant_id: plant_id.to_string(),
        timestamp: at,
        kiln_temperature: BASELINE_KILN_TEMPERATURE,
        feed_rate: BASELINE_FEED_RATE,
        composition: BASELINE_COMPOSITION,
        lsf: BASELINE_LSF,
        bogue: BASELINE_COMPOSITION.bogue(),
        source: SnapshotSource::Ingestion,
    }
}
