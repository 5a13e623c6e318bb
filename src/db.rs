// ==========================================
// 水泥窑配料优化系统 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表幂等（CREATE TABLE IF NOT EXISTS）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS production_metrics (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    plant_id         TEXT    NOT NULL,
    timestamp        TEXT    NOT NULL,
    kiln_temperature REAL    NOT NULL,
    feed_rate        REAL    NOT NULL,
    cao              REAL    NOT NULL,
    sio2             REAL    NOT NULL,
    al2o3            REAL    NOT NULL,
    fe2o3            REAL    NOT NULL,
    lsf              REAL    NOT NULL,
    c3s              REAL    NOT NULL,
    c2s              REAL    NOT NULL,
    c3a              REAL    NOT NULL,
    c4af             REAL    NOT NULL,
    source_kind      TEXT    NOT NULL DEFAULT 'INGESTION',
    recommendation_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_production_metrics_plant
    ON production_metrics (plant_id, id DESC);

CREATE TABLE IF NOT EXISTS applied_recommendation (
    recommendation_id TEXT    PRIMARY KEY,
    plant_id          TEXT    NOT NULL,
    snapshot_id       INTEGER NOT NULL REFERENCES production_metrics(id),
    applied_at        TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key      TEXT NOT NULL,
    value    TEXT NOT NULL,
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS schema_version (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表并写入 schema_version（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 打开连接 + 建表
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;

    match read_schema_version(&conn)? {
        Some(v) if v > CURRENT_SCHEMA_VERSION => {
            tracing::warn!(db_path, found = v, expected = CURRENT_SCHEMA_VERSION, "数据库 schema 版本高于当前程序");
        }
        _ => {}
    }

    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
