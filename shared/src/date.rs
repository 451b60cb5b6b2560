//! 时间类型模块
//!
//! 提供两种时间类型：
//! - `Timestamp`: 服务端返回的本地时间（不带时区），用于传输和显示
//! - `Elapsed`: 停车时长，按 `now - start` 在渲染时计算

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =========================================================
// Timestamp - 可传输的时间戳类型
// =========================================================

/// 服务端 `LocalDateTime`，如 `2026-10-17T09:30:00.123`
///
/// 与浏览器一致，不带时区的时间按本地时间理解；
/// 带偏移量的 RFC 3339 字符串取其墙上时间。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    #[inline]
    pub const fn new(dt: NaiveDateTime) -> Self {
        Self(dt)
    }

    /// 解析服务端时间字符串
    ///
    /// 返回 None 如果解析失败
    pub fn parse(s: &str) -> Option<Self> {
        if let Ok(dt) = s.parse::<NaiveDateTime>() {
            return Some(Self(dt));
        }
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Self(dt.naive_local()))
    }

    #[inline]
    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// 用于页面显示的开始时间
    pub fn display(&self) -> String {
        self.0.format(DISPLAY_FORMAT).to_string()
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format(WIRE_FORMAT))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

// =========================================================
// Elapsed - 停车时长
// =========================================================

/// 整小时数加余下的整分钟数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Elapsed {
    pub hours: i64,
    pub minutes: i64,
}

impl Elapsed {
    /// 计算 `now - start`，开始时间晚于当前时间时记为 0
    pub fn between(start: Timestamp, now: NaiveDateTime) -> Self {
        let diff_ms = (now - start.0).num_milliseconds().max(0);
        Self {
            hours: diff_ms / MS_PER_HOUR,
            minutes: (diff_ms % MS_PER_HOUR) / MS_PER_MINUTE,
        }
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn test_parse_local_date_time() {
        assert_eq!(ts("2026-10-17T09:30:00").display(), "2026-10-17 09:30:00");
        assert_eq!(ts("2026-10-17T09:30:00.123456").display(), "2026-10-17 09:30:00");
        assert_eq!(ts("2026-10-17T09:30:00+02:00").display(), "2026-10-17 09:30:00");
        assert!(Timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_ninety_minutes() {
        let start = ts("2026-10-17T09:30:00");
        let now = start.naive() + Duration::minutes(90);
        let elapsed = Elapsed::between(start, now);
        assert_eq!(elapsed, Elapsed { hours: 1, minutes: 30 });
        assert_eq!(elapsed.to_string(), "1h 30m");
    }

    #[test]
    fn test_partial_minutes_are_floored() {
        let start = ts("2026-10-17T09:30:00");
        let now = start.naive() + Duration::seconds(59 * 60 + 59);
        assert_eq!(Elapsed::between(start, now).to_string(), "0h 59m");
    }

    #[test]
    fn test_future_start_clamps_to_zero() {
        let start = ts("2026-10-17T09:30:00");
        let now = start.naive() - Duration::minutes(5);
        assert_eq!(Elapsed::between(start, now), Elapsed::default());
    }

    #[test]
    fn test_serde_uses_wire_format() {
        let start: Timestamp = serde_json::from_str(r#""2026-10-17T09:30:00""#).unwrap();
        assert_eq!(
            serde_json::to_string(&start).unwrap(),
            r#""2026-10-17T09:30:00""#
        );
        assert!(serde_json::from_str::<Timestamp>(r#""not a date""#).is_err());
    }
}
