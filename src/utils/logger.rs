//! 日志
//!
//! 统一从这里引入日志宏，初始化只在二进制入口执行一次

pub use rat_logger::{debug, error, info, warn};

use rat_logger::handler::term::TermConfig;
use rat_logger::{LevelFilter, LoggerBuilder};

use crate::error::{QuarcError, QuarcResult};

/// 解析日志级别名称
pub fn parse_level(level: &str) -> QuarcResult<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(QuarcError::Config(format!("未知的日志级别: {}", other))),
    }
}

/// 初始化终端日志
pub fn init(level: &str) -> QuarcResult<()> {
    let filter = parse_level(level)?;

    LoggerBuilder::new()
        .with_level(filter)
        .add_terminal_with_config(TermConfig::default())
        .init()
        .map_err(|e| QuarcError::Config(format!("初始化日志失败: {:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert!(matches!(parse_level("INFO"), Ok(LevelFilter::Info)));
        assert!(matches!(parse_level(" warning "), Ok(LevelFilter::Warn)));
        assert!(matches!(parse_level("trace"), Ok(LevelFilter::Trace)));
        assert!(parse_level("verbose").is_err());
    }
}
