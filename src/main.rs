// ==========================================
// 水泥窑配料优化系统 - 命令行入口
// ==========================================
// 子命令: ingest / import / metrics / history / alerts / recommend / apply / config
// 输出: JSON（stdout），日志走 stderr
// ==========================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use kiln_optimizer::app::{get_default_db_path, AppState};
use kiln_optimizer::engine::ReadingSimulator;
use kiln_optimizer::logging;

#[derive(Debug, Parser)]
#[command(name = "kiln-optimizer", version, about = "水泥窑生料化学计算、告警与配料优化")]
struct Cli {
    /// 数据库路径
    #[arg(long, env = "KILN_OPTIMIZER_DB_PATH")]
    db: Option<String>,

    /// 工厂ID（缺省使用配置 default_plant_id）
    #[arg(long, short)]
    plant: Option<String>,

    /// 日志输出 JSON 格式
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 模拟采样并入库
    Ingest {
        /// 采样次数
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// 随机种子（可复现）
        #[arg(long)]
        seed: Option<u64>,
    },
    /// 导入化验读数 CSV
    Import { file: PathBuf },
    /// 最新指标与趋势
    Metrics,
    /// 历史快照
    History,
    /// 当前告警
    Alerts,
    /// 生成调整建议
    Recommend {
        /// 逗号分隔的约束
        #[arg(long)]
        constraints: Option<String>,
    },
    /// 生成调整建议并立即应用
    Apply {
        #[arg(long)]
        constraints: Option<String>,
    },
    /// 写入配置项
    Config { key: String, value: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    tracing::info!("{} v{}", kiln_optimizer::APP_NAME, kiln_optimizer::VERSION);

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    let api = state.plant_api.clone();

    let plant_id = cli
        .plant
        .clone()
        .unwrap_or_else(|| api.settings().default_plant_id.clone());

    match cli.command {
        Command::Ingest { count, seed } => {
            let mut simulator = match seed {
                Some(seed) => ReadingSimulator::with_seed(seed),
                None => ReadingSimulator::new(),
            };
            let mut snapshots = Vec::with_capacity(count);
            for _ in 0..count {
                snapshots.push(api.simulate_tick(&mut simulator, &plant_id)?);
            }
            print_json(&snapshots)?;
        }
        Command::Import { file } => {
            let count = api
                .import_readings_csv(&file)
                .with_context(|| format!("导入失败: {}", file.display()))?;
            print_json(&serde_json::json!({ "imported": count }))?;
        }
        Command::Metrics => print_json(&api.live_metrics(&plant_id)?)?,
        Command::History => print_json(&api.history(&plant_id)?)?,
        Command::Alerts => print_json(&api.current_alerts(&plant_id))?,
        Command::Recommend { constraints } => {
            let rec = api.recommend(&plant_id, constraints.as_deref()).await?;
            print_json(&rec)?;
        }
        Command::Apply { constraints } => {
            let rec = api.recommend(&plant_id, constraints.as_deref()).await?;
            let snapshot = api.apply_adjustment(&rec)?;
            print_json(&serde_json::json!({
                "recommendation": rec,
                "snapshot": snapshot,
            }))?;
        }
        Command::Config { key, value } => {
            state
                .config_manager
                .set_global_value(&key, &value)
                .map_err(|e| anyhow::anyhow!("配置写入失败: {}", e))?;
            print_json(&serde_json::json!({ "key": key, "value": value }))?;
        }
    }

    Ok(())
}
