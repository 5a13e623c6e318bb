// ==========================================
// 水泥窑配料优化系统 - 采样模拟器
// ==========================================
// 职责: 无真实传感器时生成带波动的采样读数（开发/演示用）
// 波动范围:
// - 窑温 1415~1485°C, 喂料量 210~230 t/h
// - CaO 43.5±1.5, SiO2 13.5±1.0, Al2O3 3.5±0.2, Fe2O3 2.0±0.2
// ==========================================

use crate::domain::snapshot::{Composition, RawReading};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const KILN_TEMP_RANGE: (f64, f64) = (1415.0, 1485.0);
const FEED_RATE_RANGE: (f64, f64) = (210.0, 230.0);

const BASE_CAO: f64 = 43.5;
const BASE_SIO2: f64 = 13.5;
const BASE_AL2O3: f64 = 3.5;
const BASE_FE2O3: f64 = 2.0;

/// 采样模拟器
pub struct ReadingSimulator {
    rng: StdRng,
}

impl ReadingSimulator {
    /// 使用系统熵源
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// 固定种子（测试可复现）
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 生成一条读数
    pub fn next_reading(&mut self, plant_id: &str, at: DateTime<Utc>) -> RawReading {
        let kiln_temperature = self.sample(KILN_TEMP_RANGE.0, KILN_TEMP_RANGE.1);
        let feed_rate = self.sample(FEED_RATE_RANGE.0, FEED_RATE_RANGE.1);

        let composition = Composition {
            cao: self.sample(BASE_CAO - 1.5, BASE_CAO + 1.5),
            sio2: self.sample(BASE_SIO2 - 1.0, BASE_SIO2 + 1.0),
            al2o3: self.sample(BASE_AL2O3 - 0.2, BASE_AL2O3 + 0.2),
            fe2o3: self.sample(BASE_FE2O3 - 0.2, BASE_FE2O3 + 0.2),
        };

        RawReading {
            plant_id: plant_id.to_string(),
            timestamp: Some(at),
            kiln_temperature,
            feed_rate,
            composition,
        }
    }

    /// 区间均匀采样，保留两位小数
    fn sample(&mut self, min: f64, max: f64) -> f64 {
        let v: f64 = self.rng.gen_range(min..=max);
        (v * 100.0).round() / 100.0
    }
}

impl Default for ReadingSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readings_stay_in_ranges() {
        let mut sim = ReadingSimulator::with_seed(42);
        for _ in 0..200 {
            let r = sim.next_reading("poc_plant_01", Utc::now());
            assert!((1415.0..=1485.0).contains(&r.kiln_temperature));
            assert!((210.0..=230.0).contains(&r.feed_rate));
            assert!((42.0..=45.0).contains(&r.composition.cao));
            assert!((12.5..=14.5).contains(&r.composition.sio2));
            assert!((3.3..=3.7).contains(&r.composition.al2o3));
            assert!((1.8..=2.2).contains(&r.composition.fe2o3));
        }
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let at = Utc::now();
        let a = ReadingSimulator::with_seed(7).next_reading("p", at);
        let b = ReadingSimulator::with_seed(7).next_reading("p", at);
        assert_eq!(a, b);
    }
}
