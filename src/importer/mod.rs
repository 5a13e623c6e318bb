// ==========================================
// 水泥窑配料优化系统 - 数据导入层
// ==========================================
// 职责: 化验读数 CSV 解析为 RawReading
// 红线: 只做解析与映射，不写库（写库由 PlantApi 完成）
// ==========================================

pub mod error;
pub mod reading_importer;

pub use error::ImportError;
pub use reading_importer::{read_readings, read_readings_file};
