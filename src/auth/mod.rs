//! 认证模块
//!
//! 只负责密码凭据的派生与校验，不做任何交互式输入

pub mod passwd;

pub use passwd::{credential_from_input, passwd, passwd_check};
