// ==========================================
// 水泥窑配料优化系统 - 建议输出解析与校验
// ==========================================
// 建议生成方输出不可信: 数值可能以字符串给出（如 "+2%"），字段可能缺失
// 规则:
// - 调整量解析失败 → 0%，记录 warning
// - 喂料量设定解析失败 → 沿用当前喂料量
// - 调整量截断到 ±MAX_ADJUSTMENT_PCT
// ==========================================

use crate::oracle::error::AdjustmentParseError;
use crate::oracle::RawSuggestion;
use serde_json::Value;

/// 单次调整量上限 (±%)，保证氧化物含量不会被调整为负
pub const MAX_ADJUSTMENT_PCT: f64 = 50.0;

/// 解析不可信的数值字段
///
/// # 支持格式
/// - JSON 数字: `2`, `-1.5`
/// - 字符串: `"2"`, `"+2%"`, `" -1.5 % "`
pub fn parse_numeric_value(value: &Value) -> Result<f64, AdjustmentParseError> {
    let parsed = match value {
        Value::Null => return Err(AdjustmentParseError::Missing),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| AdjustmentParseError::Unparseable(n.to_string()))?,
        Value::String(s) => parse_numeric_str(s)?,
        other => return Err(AdjustmentParseError::UnsupportedType(type_name(other).to_string())),
    };

    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(AdjustmentParseError::NonFinite(parsed.to_string()))
    }
}

fn parse_numeric_str(raw: &str) -> Result<f64, AdjustmentParseError> {
    let trimmed = raw.trim();
    let without_pct = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    let without_plus = without_pct.strip_prefix('+').unwrap_or(without_pct);

    if without_plus.is_empty() {
        return Err(AdjustmentParseError::Missing);
    }

    without_plus
        .parse::<f64>()
        .map_err(|_| AdjustmentParseError::Unparseable(raw.to_string()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 校验后的建议
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSuggestion {
    pub limestone_adj_pct: f64,
    pub clay_adj_pct: f64,
    pub feed_rate_setpoint: f64,
    pub explanation: String,
    pub warnings: Vec<String>,
}

/// 校验建议输出
///
/// # 参数
/// - `raw`: 建议生成方原始输出
/// - `current_feed_rate`: 当前喂料量（设定值非法时回退）
pub fn validate_suggestion(raw: &RawSuggestion, current_feed_rate: f64) -> ValidatedSuggestion {
    let mut warnings = Vec::new();

    let limestone_adj_pct =
        parse_adjustment("limestone_adj_pct", &raw.limestone_adj_pct, &mut warnings);
    let clay_adj_pct = parse_adjustment("clay_adj_pct", &raw.clay_adj_pct, &mut warnings);

    let feed_rate_setpoint = match parse_numeric_value(&raw.feed_rate_setpoint) {
        Ok(v) if v > 0.0 => v,
        Ok(v) => {
            warnings.push(format!("feed_rate_setpoint: 非正值 {}，沿用当前喂料量", v));
            current_feed_rate
        }
        Err(e) => {
            tracing::warn!(field = "feed_rate_setpoint", error = %e, "喂料量设定解析失败，沿用当前值");
            warnings.push(format!("feed_rate_setpoint: {}，沿用当前喂料量", e));
            current_feed_rate
        }
    };

    let explanation = raw
        .explanation
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("未提供说明")
        .to_string();

    ValidatedSuggestion {
        limestone_adj_pct,
        clay_adj_pct,
        feed_rate_setpoint,
        explanation,
        warnings,
    }
}

fn parse_adjustment(field: &str, value: &Value, warnings: &mut Vec<String>) -> f64 {
    match parse_numeric_value(value) {
        Ok(v) if v.abs() > MAX_ADJUSTMENT_PCT => {
            let clamped = v.clamp(-MAX_ADJUSTMENT_PCT, MAX_ADJUSTMENT_PCT);
            tracing::warn!(field, value = v, clamped, "调整量超出上限，已截断");
            warnings.push(format!("{}: {} 超出 ±{}%，截断为 {}", field, v, MAX_ADJUSTMENT_PCT, clamped));
            clamped
        }
        Ok(v) => v,
        Err(e) => {
            // MalformedAdjustmentValue: 按 0% 处理
            tracing::warn!(field, raw = %value, error = %e, "调整量解析失败，按 0% 处理");
            warnings.push(format!("{}: {}，按 0% 处理", field, e));
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_numbers_and_percent_strings() {
        assert_eq!(parse_numeric_value(&json!(2)), Ok(2.0));
        assert_eq!(parse_numeric_value(&json!(-1.5)), Ok(-1.5));
        assert_eq!(parse_numeric_value(&json!("+2%")), Ok(2.0));
        assert_eq!(parse_numeric_value(&json!(" -1.5 % ")), Ok(-1.5));
        assert_eq!(parse_numeric_value(&json!("3")), Ok(3.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_numeric_value(&Value::Null), Err(AdjustmentParseError::Missing));
        assert_eq!(parse_numeric_value(&json!("%")), Err(AdjustmentParseError::Missing));
        assert!(matches!(
            parse_numeric_value(&json!("about two")),
            Err(AdjustmentParseError::Unparseable(_))
        ));
        assert!(matches!(
            parse_numeric_value(&json!("NaN")),
            Err(AdjustmentParseError::NonFinite(_))
        ));
        assert!(matches!(
            parse_numeric_value(&json!([1, 2])),
            Err(AdjustmentParseError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_validate_defaults_malformed_adjustments_to_zero() {
        let raw = RawSuggestion {
            limestone_adj_pct: json!("lots"),
            clay_adj_pct: json!("-1%"),
            feed_rate_setpoint: json!("228.5"),
            explanation: Some("  raise CaO ".to_string()),
        };

        let v = validate_suggestion(&raw, 220.0);

        assert_eq!(v.limestone_adj_pct, 0.0);
        assert_eq!(v.clay_adj_pct, -1.0);
        assert_eq!(v.feed_rate_setpoint, 228.5);
        assert_eq!(v.explanation, "raise CaO");
        assert_eq!(v.warnings.len(), 1);
        assert!(v.warnings[0].starts_with("limestone_adj_pct"));
    }

    #[test]
    fn test_validate_falls_back_to_current_feed_rate() {
        let raw = RawSuggestion {
            limestone_adj_pct: json!(1),
            clay_adj_pct: json!(0),
            feed_rate_setpoint: Value::Null,
            explanation: None,
        };

        let v = validate_suggestion(&raw, 221.0);

        assert_eq!(v.feed_rate_setpoint, 221.0);
        assert_eq!(v.explanation, "未提供说明");
        assert_eq!(v.warnings.len(), 1);
    }

    #[test]
    fn test_validate_clamps_extreme_adjustments() {
        let raw = RawSuggestion {
            limestone_adj_pct: json!("+300%"),
            clay_adj_pct: json!(-80),
            feed_rate_setpoint: json!(220),
            explanation: None,
        };

        let v = validate_suggestion(&raw, 220.0);

        assert_eq!(v.limestone_adj_pct, MAX_ADJUSTMENT_PCT);
        assert_eq!(v.clay_adj_pct, -MAX_ADJUSTMENT_PCT);
        assert_eq!(v.warnings.len(), 2);
    }
}
