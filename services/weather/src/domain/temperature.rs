//! 温度换算与响应体

use serde::{Serialize, Serializer};

/// 摄氏度 → 华氏度
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

/// 摄氏度 → 开尔文
pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + 273.15
}

/// 返回给客户端的天气结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherResponse {
    pub city: String,
    #[serde(rename = "temp_C", serialize_with = "compact_float")]
    pub temp_c: f64,
    #[serde(rename = "temp_F", serialize_with = "compact_float")]
    pub temp_f: f64,
    #[serde(rename = "temp_K", serialize_with = "compact_float")]
    pub temp_k: f64,
}

impl WeatherResponse {
    /// 由城市名与摄氏温度构建，另外两个单位由换算得出
    pub fn from_celsius(city: impl Into<String>, celsius: f64) -> Self {
        Self {
            city: city.into(),
            temp_c: celsius,
            temp_f: celsius_to_fahrenheit(celsius),
            temp_k: celsius_to_kelvin(celsius),
        }
    }
}

/// 整数值输出为 `23` 而不是 `23.0`，`-0.0` 保留符号
fn compact_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let negative_zero = *value == 0.0 && value.is_sign_negative();
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 && !negative_zero {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fahrenheit_fixed_points() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn test_kelvin_fixed_points() {
        assert_eq!(celsius_to_kelvin(0.0), 273.15);
        assert_eq!(celsius_to_kelvin(-273.15), 0.0);
    }

    #[test]
    fn test_conversion_identities() {
        let samples = [-89.2, -40.0, -0.5, 0.0, 0.1, 12.34, 23.0, 36.6, 56.7, 1e6];
        for c in samples {
            assert!((celsius_to_kelvin(c) - c - 273.15).abs() < 1e-9, "kelvin offset for {c}");
            assert_eq!(celsius_to_fahrenheit(c), c * 1.8 + 32.0);
        }
    }

    #[test]
    fn test_from_celsius() {
        let response = WeatherResponse::from_celsius("São Paulo", 23.0);
        assert_eq!(response.city, "São Paulo");
        assert_eq!(response.temp_c, 23.0);
        assert_eq!(response.temp_f, 73.4);
        assert_eq!(response.temp_k, 296.15);
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_string(&WeatherResponse::from_celsius("São Paulo", 23.0)).unwrap();
        assert_eq!(
            json,
            r#"{"city":"São Paulo","temp_C":23,"temp_F":73.4,"temp_K":296.15}"#
        );
    }

    #[test]
    fn test_serialization_fractional() {
        let json = serde_json::to_string(&WeatherResponse::from_celsius("Curitiba", 25.5)).unwrap();
        assert_eq!(
            json,
            r#"{"city":"Curitiba","temp_C":25.5,"temp_F":77.9,"temp_K":298.65}"#
        );
    }

    #[test]
    fn test_serialization_zero() {
        let json = serde_json::to_string(&WeatherResponse::from_celsius("Recife", 0.0)).unwrap();
        assert_eq!(
            json,
            r#"{"city":"Recife","temp_C":0,"temp_F":32,"temp_K":273.15}"#
        );
    }

    #[test]
    fn test_serialization_negative_zero_keeps_sign() {
        let json = serde_json::to_string(&WeatherResponse::from_celsius("Urupema", -0.0)).unwrap();
        assert_eq!(
            json,
            r#"{"city":"Urupema","temp_C":-0.0,"temp_F":32,"temp_K":273.15}"#
        );
    }
}
