pub mod date;
pub mod plate;
pub mod protocol;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use date::{Elapsed, Timestamp};
pub use plate::{LicensePlate, PlateError, normalize_plate_input};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 所有接口路径的公共前缀
pub const API_PREFIX: &str = "/api";
/// LocalStorage 中保存 Bearer Token 的键
pub const TOKEN_STORAGE_KEY: &str = "token";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

pub type UserId = i64;
pub type CarId = i64;
pub type SpotId = i64;
pub type SessionId = i64;
pub type Floor = i32;

// =========================================================
// 认证模型 (Auth Models)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// 登录 / 注册成功后的响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// =========================================================
// 车辆与车位 (Cars & Spots)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Car {
    /// 颜色为空字符串时视为未填写
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref().filter(|c| !c.is_empty())
    }

    /// 下拉框中使用的标签，如 `Honda Civic (AB12CDE)`
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.make, self.model, self.license_plate)
    }
}

/// 新增车辆的请求体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub color: String,
}

/// 车位编号
///
/// 服务端可能以数字或字符串返回编号，这里保留原始形态，
/// 以便手动停车时原样回传。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpotNumber {
    Number(u32),
    Label(String),
}

impl fmt::Display for SpotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotNumber::Number(n) => write!(f, "{}", n),
            SpotNumber::Label(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSpot {
    pub id: SpotId,
    pub floor: Floor,
    pub spot_number: SpotNumber,
    #[serde(default)]
    pub occupied: Option<bool>,
}

impl ParkingSpot {
    pub fn is_available(&self) -> bool {
        !self.occupied.unwrap_or(false)
    }
}

// =========================================================
// 停车会话 (Parking Sessions)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSession {
    pub parking_session_id: SessionId,
    pub car: Car,
    pub spot: ParkingSpot,
    pub start_time: Timestamp,
}

impl ParkingSession {
    /// 形如 `Floor 2, Spot 14`
    pub fn location(&self) -> String {
        format!("Floor {}, Spot {}", self.spot.floor, self.spot.spot_number)
    }
}

/// 服务端错误响应体
///
/// 不同接口分别把可读信息放在 `error` 或 `message` 字段中。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
