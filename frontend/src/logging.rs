//! 日志初始化
//!
//! 把 `tracing` 事件输出到浏览器控制台。默认级别为 WARN，
//! 可以通过 LocalStorage 中的 `garage_log_level` 覆盖。

use crate::config::LOG_LEVEL_KEY;
use crate::web::LocalStorage;
use std::sync::Once;
use tracing::level_filters::LevelFilter;

static INIT: Once = Once::new();

/// 初始化日志，可重复调用
pub fn init() {
    INIT.call_once(|| {
        use tracing_subscriber::prelude::*;
        use tracing_web::MakeWebConsoleWriter;

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(MakeWebConsoleWriter::new())
            // WASM 中没有 std::time
            .without_time();

        let level = LocalStorage::get(LOG_LEVEL_KEY)
            .and_then(|s| parse_level(&s))
            .unwrap_or(LevelFilter::WARN);

        tracing_subscriber::registry()
            .with(level)
            .with(fmt_layer)
            .init();
    });
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    let s = s.trim();
    // 空字符串会被 tracing 解析为 ERROR，这里视为未设置
    if s.is_empty() {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("info"), Some(LevelFilter::INFO));
        assert_eq!(parse_level(" DEBUG "), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level("verbose"), None);
        assert_eq!(parse_level("   "), None);
    }
}
