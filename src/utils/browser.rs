//! 打开浏览器

use std::process::{Command, Stdio};

use crate::error::QuarcResult;

/// 使用系统默认浏览器打开 URL
///
/// 只负责启动系统打开程序，不等待其退出
pub fn open_url(url: &str) -> QuarcResult<()> {
    opener_command(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

fn opener_command(url: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}
