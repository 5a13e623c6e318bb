// ==========================================
// 水泥窑配料优化系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// 规则: 配置缺失 → 默认值；配置格式错误 → 默认值 + warn 日志
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::recommendation::{Constraint, DEFAULT_CONSTRAINT};
use crate::engine::alert_rules::AlertConfig;
use crate::oracle::DEFAULT_ORACLE_TIMEOUT_MS;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 配置键常量
pub mod config_keys {
    pub const EMIT_NOMINAL_INFO: &str = "emit_nominal_info";
    pub const ORACLE_TIMEOUT_MS: &str = "oracle_timeout_ms";
    pub const HISTORY_LIMIT: &str = "history_limit";
    pub const DEFAULT_PLANT_ID: &str = "default_plant_id";
    pub const DEFAULT_CONSTRAINTS: &str = "default_constraints";
}

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const DEFAULT_PLANT_ID: &str = "poc_plant_01";

// ==========================================
// PlantSettings - 运行期配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PlantSettings {
    pub emit_nominal_info: bool,
    pub oracle_timeout: Duration,
    pub history_limit: usize,
    pub default_plant_id: String,
    pub default_constraints: Vec<Constraint>,
}

impl PlantSettings {
    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            emit_nominal_info: self.emit_nominal_info,
        }
    }
}

impl Default for PlantSettings {
    fn default() -> Self {
        Self {
            emit_nominal_info: false,
            oracle_timeout: Duration::from_millis(DEFAULT_ORACLE_TIMEOUT_MS),
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_plant_id: DEFAULT_PLANT_ID.to_string(),
            default_constraints: vec![Constraint::new(DEFAULT_CONSTRAINT)],
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;

        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 读取并解析配置；缺失或格式错误时返回默认值
    fn get_parsed_or_default<T: FromStr>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>> {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "配置值格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }

    /// 是否在指标正常时输出 INFO 告警
    pub fn get_emit_nominal_info(&self) -> Result<bool, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::EMIT_NOMINAL_INFO, false)
    }

    /// 建议生成超时
    pub fn get_oracle_timeout(&self) -> Result<Duration, Box<dyn Error>> {
        let ms = self.get_parsed_or_default(config_keys::ORACLE_TIMEOUT_MS, DEFAULT_ORACLE_TIMEOUT_MS)?;
        if ms == 0 {
            tracing::warn!("oracle_timeout_ms 为 0，使用默认值");
            return Ok(Duration::from_millis(DEFAULT_ORACLE_TIMEOUT_MS));
        }
        Ok(Duration::from_millis(ms))
    }

    pub fn get_history_limit(&self) -> Result<usize, Box<dyn Error>> {
        let limit = self.get_parsed_or_default(config_keys::HISTORY_LIMIT, DEFAULT_HISTORY_LIMIT)?;
        Ok(limit.max(1))
    }

    pub fn get_default_plant_id(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_global_config_value(config_keys::DEFAULT_PLANT_ID)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PLANT_ID.to_string()))
    }

    pub fn get_default_constraints(&self) -> Result<Vec<Constraint>, Box<dyn Error>> {
        let raw = self.get_global_config_value(config_keys::DEFAULT_CONSTRAINTS)?;
        Ok(Constraint::parse_list(raw.as_deref()))
    }

    /// 一次性加载全部运行期配置
    pub fn load_settings(&self) -> Result<PlantSettings, Box<dyn Error>> {
        Ok(PlantSettings {
            emit_nominal_info: self.get_emit_nominal_info()?,
            oracle_timeout: self.get_oracle_timeout()?,
            history_limit: self.get_history_limit()?,
            default_plant_id: self.get_default_plant_id()?,
            default_constraints: self.get_default_constraints()?,
        })
    }
}
