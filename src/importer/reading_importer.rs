// ==========================================
// 水泥窑配料优化系统 - 化验读数 CSV 导入
// ==========================================
// 表头: timestamp,plant_id,kiln_temp,feed_rate,cao,sio2,al2o3,fe2o3
// - timestamp 为空 → 入库时间
// - plant_id 为空 → 调用方给定的默认工厂
// - 完全空白的行跳过
// 成分越界不在此处拒绝，由入库流程降级处理
// ==========================================

use crate::domain::snapshot::{Composition, RawReading};
use crate::importer::error::ImportError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const REQUIRED_COLUMNS: [&str; 6] = ["kiln_temp", "feed_rate", "cao", "sio2", "al2o3", "fe2o3"];

/// 从文件读取
pub fn read_readings_file(path: &Path, default_plant_id: &str) -> Result<Vec<RawReading>, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return Err(ImportError::UnsupportedFormat(path.display().to_string()));
    }

    let file = File::open(path)?;
    let readings = read_readings(file, default_plant_id)?;

    tracing::info!(path = %path.display(), count = readings.len(), "化验读数解析完成");
    Ok(readings)
}

/// 从任意 Reader 读取
pub fn read_readings<R: Read>(source: R, default_plant_id: &str) -> Result<Vec<RawReading>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(ImportError::MissingColumn(col.to_string()));
        }
    }

    let mut readings = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        // 行号按文件行计（表头为第 1 行）
        let row = idx + 2;

        let mut row_map: HashMap<&str, &str> = HashMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row_map.insert(header.as_str(), value.trim());
            }
        }

        if row_map.values().all(|v| v.is_empty()) {
            tracing::debug!(row, "跳过空白行");
            continue;
        }

        readings.push(map_row(row, &row_map, default_plant_id)?);
    }

    Ok(readings)
}

fn map_row(row: usize, map: &HashMap<&str, &str>, default_plant_id: &str) -> Result<RawReading, ImportError> {
    let field = |name: &str| -> Result<f64, ImportError> {
        let raw = map.get(name).copied().unwrap_or("");
        raw.parse::<f64>().map_err(|e| ImportError::TypeConversionError {
            row,
            field: name.to_string(),
            message: format!("{:?}: {}", raw, e),
        })
    };

    let plant_id = map
        .get("plant_id")
        .copied()
        .filter(|v| !v.is_empty())
        .unwrap_or(default_plant_id)
        .to_string();

    let timestamp = match map.get("timestamp").copied().filter(|v| !v.is_empty()) {
        Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| ImportError::TimestampFormatError {
            row,
            value: raw.to_string(),
        })?),
        None => None,
    };

    // 窑温/喂料量入库时要求有限数值，在解析阶段拦截，保证整批不落库
    let finite_field = |name: &str| -> Result<f64, ImportError> {
        let value = field(name)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ImportError::TypeConversionError {
                row,
                field: name.to_string(),
                message: format!("非有限数值: {}", value),
            })
        }
    };

    Ok(RawReading {
        plant_id,
        timestamp,
        kiln_temperature: finite_field("kiln_temp")?,
        feed_rate: finite_field("feed_rate")?,
        composition: Composition::new(field("cao")?, field("sio2")?, field("al2o3")?, field("fe2o3")?),
    })
}

/// 支持 RFC3339 与 `YYYY-MM-DD HH:MM:SS`（按 UTC）
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
