// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、API 装配、读数构造
// ==========================================
#![allow(dead_code)]

use kiln_optimizer::api::PlantApi;
use kiln_optimizer::config::PlantSettings;
use kiln_optimizer::db::open_and_init;
use kiln_optimizer::domain::{Composition, RawReading};
use kiln_optimizer::oracle::{BandSeekingOracle, RecommendationOracle};
use kiln_optimizer::repository::SnapshotRepository;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    open_and_init(&db_path)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared(db_path: &str) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(open_and_init(db_path).unwrap()))
}

/// 装配 PlantApi（本地确定性建议生成方）
pub fn build_api(db_path: &str, settings: PlantSettings) -> PlantApi {
    build_api_with_oracle(db_path, settings, Arc::new(BandSeekingOracle::new()))
}

pub fn build_api_with_oracle(
    db_path: &str,
    settings: PlantSettings,
    oracle: Arc<dyn RecommendationOracle>,
) -> PlantApi {
    let store = Arc::new(SnapshotRepository::new(open_shared(db_path)));
    PlantApi::new(store, oracle, settings)
}

/// 构造原始读数
pub fn reading(plant_id: &str, kiln_temperature: f64, cao: f64) -> RawReading {
    RawReading {
        plant_id: plant_id.to_string(),
        timestamp: None,
        kiln_temperature,
        feed_rate: 220.0,
        composition: Composition::new(cao, 14.0, 3.5, 2.5),
    }
}
