//! 应用配置
//!
//! 后端地址在构建时通过 `GARAGE_API_BASE` 环境变量注入（Trunk 构建时读取），
//! 其余为固定常量。

use garage_shared::{API_PREFIX, Floor};
use leptos::prelude::*;
use std::time::Duration;

/// 停车成功后跳转到会话列表前的等待时间
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);
/// 成功提示的显示时长
pub const BANNER_LIFETIME: Duration = Duration::from_secs(3);
/// 车库楼层，用于楼层筛选
pub const FLOORS: [Floor; 3] = [1, 2, 3];
/// 覆盖日志级别的 LocalStorage 键
pub const LOG_LEVEL_KEY: &str = "garage_log_level";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub redirect_delay: Duration,
    pub banner_lifetime: Duration,
    pub floors: Vec<Floor>,
}

impl AppConfig {
    pub fn from_build_env() -> Self {
        Self::with_api_base(option_env!("GARAGE_API_BASE"))
    }

    fn with_api_base(api_base: Option<&str>) -> Self {
        let api_base = api_base
            .map(|s| s.trim().trim_end_matches('/'))
            .filter(|s| !s.is_empty())
            .unwrap_or(API_PREFIX)
            .to_string();

        Self {
            api_base,
            redirect_delay: REDIRECT_DELAY,
            banner_lifetime: BANNER_LIFETIME,
            floors: FLOORS.to_vec(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::with_api_base(None)
    }
}

/// 从 Context 获取配置
pub fn use_config() -> AppConfig {
    use_context::<AppConfig>().unwrap_or_default()
}
