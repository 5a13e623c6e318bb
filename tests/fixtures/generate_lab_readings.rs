// ==========================================
// 化验读数测试数据生成器
// ==========================================
// 用途: 生成可导入的化验读数 CSV
// 输出: tests/fixtures/datasets/lab_readings_*.csv
// 用法: generate_lab_readings [行数] [工厂ID]
// ==========================================

use chrono::{Duration, TimeZone, Utc};
use csv::Writer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::fs;

const CSV_HEADER: &[&str] = &[
    "timestamp",
    "plant_id",
    "kiln_temp",
    "feed_rate",
    "cao",
    "sio2",
    "al2o3",
    "fe2o3",
];

const OUTPUT_DIR: &str = "tests/fixtures/datasets";

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 正常工况（LSF 约 94~98）
fn nominal_row(rng: &mut StdRng) -> [f64; 6] {
    [
        rng.gen_range(1432.0..1468.0),
        rng.gen_range(212.0..228.0),
        rng.gen_range(43.5..44.5),
        rng.gen_range(13.6..14.0),
        rng.gen_range(3.4..3.6),
        rng.gen_range(2.3..2.6),
    ]
}

/// 异常工况（窑温越限或 LSF 偏离）
fn upset_row(rng: &mut StdRng) -> [f64; 6] {
    let kiln = if rng.gen_bool(0.5) {
        rng.gen_range(1481.0..1500.0)
    } else {
        rng.gen_range(1400.0..1419.0)
    };
    [
        kiln,
        rng.gen_range(205.0..235.0),
        rng.gen_range(41.0..47.0),
        rng.gen_range(12.5..15.0),
        rng.gen_range(3.3..3.7),
        rng.gen_range(1.8..2.2),
    ]
}

fn write_dataset(name: &str, plant_id: &str, rows: usize, upset_ratio: f64, seed: u64) -> Result<(), Box<dyn Error>> {
    let path = format!("{}/lab_readings_{}.csv", OUTPUT_DIR, name);
    let mut writer = Writer::from_path(&path)?;
    writer.write_record(CSV_HEADER)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).single().ok_or("无效的起始时间")?;

    for i in 0..rows {
        let values = if rng.gen_bool(upset_ratio) {
            upset_row(&mut rng)
        } else {
            nominal_row(&mut rng)
        };

        let ts = start + Duration::minutes(15 * i as i64);
        let mut record = vec![ts.to_rfc3339(), plant_id.to_string()];
        record.extend(values.iter().map(|v| round2(*v).to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    println!("生成 {} ({} 行)", path, rows);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    let rows = args.get(1).and_then(|v| v.parse::<usize>().ok()).unwrap_or(96);
    let plant_id = args.get(2).cloned().unwrap_or_else(|| "poc_plant_01".to_string());

    fs::create_dir_all(OUTPUT_DIR)?;

    write_dataset("nominal", &plant_id, rows, 0.0, 1)?;
    write_dataset("mixed", &plant_id, rows, 0.2, 2)?;
    write_dataset("upset", &plant_id, rows, 1.0, 3)?;

    Ok(())
}
