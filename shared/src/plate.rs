//! 车牌输入规范化与校验

use thiserror::Error;

/// 车牌固定长度
pub const PLATE_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlateError {
    #[error("License plate must be 7 letters/numbers")]
    InvalidFormat,
}

/// 输入框每次变化时调用：转大写并截断到 7 个字符
pub fn normalize_plate_input(raw: &str) -> String {
    raw.to_uppercase().chars().take(PLATE_LEN).collect()
}

/// 已校验的车牌，满足 `[A-Z0-9]{7}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicensePlate(String);

impl LicensePlate {
    pub fn parse(raw: &str) -> Result<Self, PlateError> {
        let value = normalize_plate_input(raw.trim());
        let valid = value.chars().count() == PLATE_LEN
            && value
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if valid {
            Ok(Self(value))
        } else {
            Err(PlateError::InvalidFormat)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
