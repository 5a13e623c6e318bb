// ==========================================
// 水泥窑配料优化系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 配置管理器与快照仓储共享同一 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::PlantApi;
use crate::config::ConfigManager;
use crate::db::open_and_init;
use crate::engine::BroadcastEventPublisher;
use crate::oracle::{BandSeekingOracle, RecommendationOracle};
use crate::repository::SnapshotRepository;

/// 快照事件广播通道容量
pub const SNAPSHOT_EVENT_CAPACITY: usize = 64;

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 快照事件广播（看板刷新订阅）
    pub snapshot_events: Arc<BroadcastEventPublisher>,

    /// 工厂运行API
    pub plant_api: Arc<PlantApi>,
}

impl AppState {
    /// 使用本地确定性建议生成方创建
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::with_oracle(db_path, Arc::new(BandSeekingOracle::new()))
    }

    /// 使用指定建议生成方创建
    ///
    /// # 参数
    /// - `db_path`: 数据库文件路径
    /// - `oracle`: 建议生成方实现
    pub fn with_oracle(
        db_path: String,
        oracle: Arc<dyn RecommendationOracle>,
    ) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_and_init(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let settings = config_manager
            .load_settings()
            .map_err(|e| format!("无法加载配置: {}", e))?;
        tracing::debug!(?settings, "运行配置已加载");

        let store = Arc::new(SnapshotRepository::new(conn));
        let snapshot_events = Arc::new(BroadcastEventPublisher::new(SNAPSHOT_EVENT_CAPACITY));
        let plant_api = Arc::new(
            PlantApi::new(store, oracle, settings).with_event_publisher(snapshot_events.clone()),
        );

        Ok(Self {
            db_path,
            config_manager,
            snapshot_events,
            plant_api,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 KILN_OPTIMIZER_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("KILN_OPTIMIZER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./kiln_optimizer.db");

    if let Some(data_dir) = dirs::data_local_dir() {
        let dir = data_dir.join("kiln-optimizer");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("kiln_optimizer.db"),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "无法创建数据目录，使用当前目录"),
        }
    }

    path.to_string_lossy().to_string()
}
