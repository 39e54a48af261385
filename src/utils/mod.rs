//! 工具模块

pub mod browser;
pub mod crypto_provider;
pub mod logger;
pub mod net;
